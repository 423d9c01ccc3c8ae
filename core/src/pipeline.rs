use crate::builder::{BuiltPartials, PartialIndexBuilder};
use crate::config::{BuildOptions, INDEX_VERSION};
use crate::extract::extract;
use crate::idf::IdfTable;
use crate::merge::merge_partials;
use crate::persist::{publish, save_doc_map, save_final_index, save_idf, save_meta, save_report, IndexPaths, MetaFile, Report};
use crate::spill::SpillStore;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;

/// One crawled page as handed over by the corpus reader.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceDoc {
    #[serde(default)]
    pub url: String,
    /// Raw markup.
    #[serde(default)]
    pub content: String,
}

/// Run the full pipeline over `docs` and publish the result at `output`.
///
/// Everything is written to a staging directory first; `output` is only
/// replaced once every artifact exists. On any error the staging directory is
/// removed and a previous index at `output` is left as it was.
pub fn build_index<I>(docs: I, output: &IndexPaths, opts: &BuildOptions) -> Result<Report>
where
    I: IntoIterator<Item = Result<SourceDoc>>,
{
    opts.validate()?;
    let staging = output.staging()?;
    if staging.root.exists() {
        fs::remove_dir_all(&staging.root).with_context(|| format!("clearing {}", staging.root.display()))?;
    }
    fs::create_dir_all(&staging.root).with_context(|| format!("creating {}", staging.root.display()))?;

    match build_into(docs, &staging, opts) {
        Ok(report) => {
            publish(&staging, output)?;
            tracing::info!(output = %output.root.display(), "index build complete");
            Ok(report)
        }
        Err(e) => {
            if let Err(cleanup) = fs::remove_dir_all(&staging.root) {
                tracing::warn!(error = %cleanup, "could not remove staging directory");
            }
            Err(e)
        }
    }
}

fn build_into<I>(docs: I, staging: &IndexPaths, opts: &BuildOptions) -> Result<Report>
where
    I: IntoIterator<Item = Result<SourceDoc>>,
{
    let mut builder = PartialIndexBuilder::new(SpillStore::new(staging.clone()), opts.temp_mem);
    let mut skipped = 0usize;
    for doc in docs {
        let doc = doc?;
        if doc.content.trim().is_empty() {
            skipped += 1;
            continue;
        }
        let extracted = extract(&doc.content);
        builder.add_document(&doc.url, &extracted.text, extracted.important.as_slice())?;
    }

    let BuiltPartials { store, doc_map, num_docs } = builder.finish()?;
    tracing::info!(num_docs, skipped, parts = store.len(), "ingested documents");

    let index = merge_partials(store.handles(), None)?;
    let idf = IdfTable::compute(&index, num_docs);

    save_final_index(staging, &index)?;
    save_idf(staging, &idf)?;
    save_doc_map(staging, &doc_map)?;

    let index_bytes = fs::metadata(staging.final_index())?.len();
    let report = Report::new(num_docs, index.num_terms(), index_bytes);
    save_report(staging, &report)?;

    let meta = MetaFile {
        num_docs,
        created_at: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| "".into()),
        version: INDEX_VERSION,
        temp_mem: opts.temp_mem,
    };
    save_meta(staging, &meta)?;

    if !opts.keep_parts {
        store.remove_all()?;
    }
    Ok(report)
}
