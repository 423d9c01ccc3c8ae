use anyhow::{Context, Result};
use crawldex_core::pipeline::SourceDoc;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Every `.json` / `.jsonl` file under `input`, sorted by path so doc_ids are
/// assigned in the same order on every run.
pub fn source_files(input: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_file() {
        files.push(input.to_path_buf());
        return Ok(files);
    }
    for entry in WalkDir::new(input).sort_by_file_name() {
        let entry = entry.with_context(|| format!("walking {}", input.display()))?;
        let p = entry.path();
        if !p.is_file() {
            continue;
        }
        if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
            if matches!(ext, "json" | "jsonl") {
                files.push(p.to_path_buf());
            }
        }
    }
    Ok(files)
}

/// Read the records of one file. Records that do not parse are skipped with a
/// warning; failing to read the file at all is an error.
pub fn read_records(file: &Path) -> Result<Vec<SourceDoc>> {
    let f = File::open(file).with_context(|| format!("opening {}", file.display()))?;
    let mut reader = BufReader::new(f);
    let mut docs = Vec::new();

    if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
        for (lineno, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("reading {}", file.display()))?;
            if line.trim().is_empty() { continue; }
            match serde_json::from_str::<SourceDoc>(&line) {
                Ok(doc) => docs.push(doc),
                Err(e) => tracing::warn!(file = %file.display(), line = lineno + 1, error = %e, "skipping unparseable record"),
            }
        }
        return Ok(docs);
    }

    let mut buf = String::new();
    reader.read_to_string(&mut buf).with_context(|| format!("reading {}", file.display()))?;
    match serde_json::from_str::<SourceDoc>(&buf) {
        Ok(doc) => docs.push(doc),
        Err(e) => tracing::warn!(file = %file.display(), error = %e, "skipping unparseable document"),
    }
    Ok(docs)
}

/// Lazily yield every record under `input`, file by file.
pub fn records(input: &Path) -> Result<impl Iterator<Item = Result<SourceDoc>>> {
    let files = source_files(input)?;
    tracing::info!(files = files.len(), input = %input.display(), "enumerated corpus");
    Ok(files.into_iter().flat_map(|file| match read_records(&file) {
        Ok(docs) => docs.into_iter().map(Ok).collect::<Vec<_>>(),
        Err(e) => vec![Err(e)],
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn walks_sorted_and_reads_both_formats() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("b")).unwrap();
        fs::write(dir.path().join("b/2.json"), r#"{"url":"https://two","content":"<p>two</p>"}"#).unwrap();
        fs::write(dir.path().join("a.jsonl"), "{\"url\":\"https://one\",\"content\":\"x\"}\n\nnot json\n{\"url\":\"https://three\"}\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        fs::write(dir.path().join("c.json"), "{broken").unwrap();

        let files = source_files(dir.path()).unwrap();
        assert_eq!(files.len(), 3);
        assert!(files[0].ends_with("a.jsonl"));
        assert!(files[1].ends_with("b/2.json"));

        let docs: Vec<SourceDoc> = records(dir.path()).unwrap().collect::<Result<_>>().unwrap();
        let urls: Vec<&str> = docs.iter().map(|d| d.url.as_str()).collect();
        assert_eq!(urls, vec!["https://one", "https://three", "https://two"]);
        assert!(docs[1].content.is_empty());
    }

    #[test]
    fn missing_input_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(source_files(&dir.path().join("nope")).is_err());
    }
}
