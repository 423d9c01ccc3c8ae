use criterion::{criterion_group, criterion_main, Criterion};
use crawldex_core::builder::PartialIndexBuilder;
use crawldex_core::idf::IdfTable;
use crawldex_core::merge::merge_partials;
use crawldex_core::persist::IndexPaths;
use crawldex_core::search::SearchEngine;
use crawldex_core::spill::SpillStore;
use crawldex_core::tokenizer::tokenize;

const TEXT: &str = "The quick brown fox jumps over the lazy dog. Inverted indexes map terms \
to postings; a posting records how often a term occurs in a document. Ranking uses \
log-dampened term frequency weighted by inverse document frequency.";

fn bench_tokenize(c: &mut Criterion) {
    c.bench_function("tokenize_paragraph", |b| b.iter(|| tokenize(TEXT)));
}

fn bench_search(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let mut builder = PartialIndexBuilder::new(SpillStore::new(IndexPaths::new(dir.path())), 500);
    for i in 0..2_000 {
        let text = format!("{TEXT} doc{} group{}", i, i % 50);
        builder.add_document::<&str>(&format!("https://bench.test/{i}"), &text, &[]).unwrap();
    }
    let out = builder.finish().unwrap();
    let index = merge_partials(out.store.handles(), None).unwrap();
    let idf = IdfTable::compute(&index, out.num_docs);
    let engine = SearchEngine::new(index, idf, out.doc_map);
    c.bench_function("search_two_terms", |b| b.iter(|| engine.search("ranking group7")));
}

criterion_group!(benches, bench_tokenize, bench_search);
criterion_main!(benches);
