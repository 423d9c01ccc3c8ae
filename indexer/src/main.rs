mod corpus;

use anyhow::Result;
use clap::{Parser, Subcommand};
use crawldex_core::config::{BuildOptions, DEFAULT_TEMP_MEM};
use crawldex_core::persist::IndexPaths;
use crawldex_core::pipeline::build_index;
use crawldex_core::search::SearchEngine;
use tracing_subscriber::{fmt, EnvFilter};

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build and query a TF-IDF inverted index over crawled pages", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from a directory of JSON/JSONL page records
    Build {
        /// Input path (file or directory)
        #[arg(long)]
        input: String,
        /// Output index directory, replaced on success
        #[arg(long, default_value = "./index")]
        output: String,
        /// Documents held in memory before a partial index is written to disk
        #[arg(long, default_value_t = DEFAULT_TEMP_MEM)]
        temp_mem: usize,
        /// Keep the partial index files next to the final index
        #[arg(long, default_value_t = false)]
        keep_parts: bool,
    },
    /// Interactive search against a built index
    Query {
        /// Index directory
        #[arg(long, default_value = "./index")]
        index: String,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(io::stderr).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output, temp_mem, keep_parts } => {
            let opts = BuildOptions { temp_mem, keep_parts };
            let docs = corpus::records(Path::new(&input))?;
            let report = build_index(docs, &IndexPaths::new(&output), &opts)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Commands::Query { index } => {
            let engine = SearchEngine::open(&IndexPaths::new(&index))?;
            let stdin = io::stdin();
            run_session(&engine, stdin.lock(), io::stdout())
        }
    }
}

/// Prompt, search, print until `exit` or end of input.
fn run_session<R: BufRead, W: Write>(engine: &SearchEngine, mut input: R, mut out: W) -> Result<()> {
    writeln!(out, "\n  << Simple Search Engine >>  ")?;
    loop {
        write!(out, "Enter search query (or type 'exit' to quit): ")?;
        out.flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let query = line.trim();
        if query.eq_ignore_ascii_case("exit") {
            break;
        }
        if query.is_empty() {
            writeln!(out, "ERROR: Query cannot be empty. Please enter a valid search term.")?;
            continue;
        }

        let start = Instant::now();
        let results = engine.search(query);
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        writeln!(out, "Search completed in {elapsed_ms:.2}ms")?;
        if results.hits.is_empty() {
            writeln!(out, "No results found.")?;
        } else {
            writeln!(out, "\nTop {} Search Results:", results.hits.len())?;
            for hit in &results.hits {
                writeln!(out, "{}. {}", hit.rank, hit.url)?;
            }
        }
    }
    Ok(())
}
