use crate::config::INDEX_VERSION;
use crate::idf::IdfTable;
use crate::{DocMap, InvertedIndex};
use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, create_dir_all, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u32,
    pub created_at: String,
    pub version: u32,
    pub temp_mem: usize,
}

/// Summary printed at the end of a build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    #[serde(rename = "Number of Documents")]
    pub num_docs: u32,
    #[serde(rename = "Number of Unique Tokens")]
    pub unique_terms: usize,
    #[serde(rename = "Total Index Size (KB)")]
    pub index_size_kb: f64,
}

impl Report {
    pub fn new(num_docs: u32, unique_terms: usize, index_bytes: u64) -> Self {
        let kb = index_bytes as f64 / 1024.0;
        Self { num_docs, unique_terms, index_size_kb: (kb * 100.0).round() / 100.0 }
    }
}

#[derive(Debug, Clone)]
pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn final_index(&self) -> PathBuf { self.root.join("final_index.json") }
    pub fn idf(&self) -> PathBuf { self.root.join("idf.json") }
    pub fn doc_map(&self) -> PathBuf { self.root.join("doc_map.json") }
    pub fn report(&self) -> PathBuf { self.root.join("report.json") }
    pub fn meta(&self) -> PathBuf { self.root.join("meta.json") }
    pub fn parts_dir(&self) -> PathBuf { self.root.join("parts") }
    pub fn part(&self, part_num: u32) -> PathBuf {
        self.parts_dir().join(format!("index_part_{part_num}.bin"))
    }

    /// Sibling directory a build writes into before it is published over `root`.
    pub fn staging(&self) -> Result<IndexPaths> {
        let name = match self.root.file_name() {
            Some(n) => n.to_string_lossy().into_owned(),
            None => bail!("index directory {} has no final path component", self.root.display()),
        };
        Ok(IndexPaths::new(self.root.with_file_name(format!("{name}.staging"))))
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let f = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer_pretty(&mut w, value).with_context(|| format!("writing {}", path.display()))?;
    w.flush()?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let f = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let value = serde_json::from_reader(BufReader::new(f)).with_context(|| format!("parsing {}", path.display()))?;
    Ok(value)
}

pub fn save_partial(path: &Path, index: &InvertedIndex) -> Result<()> {
    if let Some(dir) = path.parent() {
        create_dir_all(dir)?;
    }
    let f = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut w = BufWriter::new(f);
    bincode::serialize_into(&mut w, index).with_context(|| format!("writing {}", path.display()))?;
    w.flush()?;
    Ok(())
}

pub fn load_partial(path: &Path) -> Result<InvertedIndex> {
    let f = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let index = bincode::deserialize_from(BufReader::new(f)).with_context(|| format!("decoding {}", path.display()))?;
    Ok(index)
}

pub fn save_final_index(paths: &IndexPaths, index: &InvertedIndex) -> Result<()> {
    create_dir_all(&paths.root)?;
    write_json(&paths.final_index(), index)
}

pub fn load_final_index(paths: &IndexPaths) -> Result<InvertedIndex> { read_json(&paths.final_index()) }

pub fn save_idf(paths: &IndexPaths, idf: &IdfTable) -> Result<()> {
    create_dir_all(&paths.root)?;
    write_json(&paths.idf(), idf)
}

pub fn load_idf(paths: &IndexPaths) -> Result<IdfTable> { read_json(&paths.idf()) }

pub fn save_doc_map(paths: &IndexPaths, map: &DocMap) -> Result<()> {
    create_dir_all(&paths.root)?;
    let sorted: BTreeMap<_, _> = map.iter().collect();
    write_json(&paths.doc_map(), &sorted)
}

pub fn load_doc_map(paths: &IndexPaths) -> Result<DocMap> { read_json(&paths.doc_map()) }

pub fn save_report(paths: &IndexPaths, report: &Report) -> Result<()> {
    create_dir_all(&paths.root)?;
    write_json(&paths.report(), report)
}

pub fn load_report(paths: &IndexPaths) -> Result<Report> { read_json(&paths.report()) }

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    write_json(&paths.meta(), meta)
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let meta: MetaFile = read_json(&paths.meta())?;
    if meta.version != INDEX_VERSION {
        bail!("index at {} has version {}, expected {}", paths.root.display(), meta.version, INDEX_VERSION);
    }
    Ok(meta)
}

/// Everything the query side needs, fully loaded.
pub struct LoadedIndex {
    pub index: InvertedIndex,
    pub idf: IdfTable,
    pub doc_map: DocMap,
    pub meta: MetaFile,
}

pub fn load_index(paths: &IndexPaths) -> Result<LoadedIndex> {
    let meta = load_meta(paths)?;
    let index = load_final_index(paths)?;
    let idf = load_idf(paths)?;
    let doc_map = load_doc_map(paths)?;
    tracing::info!(num_docs = meta.num_docs, num_terms = index.num_terms(), root = %paths.root.display(), "index loaded");
    Ok(LoadedIndex { index, idf, doc_map, meta })
}

/// Replace `target` with the fully written `staging` directory. The previous
/// index is moved aside first and only deleted once `staging` is in place; if
/// the swap fails it is moved back.
pub fn publish(staging: &IndexPaths, target: &IndexPaths) -> Result<()> {
    let previous = match target.root.file_name() {
        Some(n) => target.root.with_file_name(format!("{}.previous", n.to_string_lossy())),
        None => bail!("index directory {} has no final path component", target.root.display()),
    };
    if previous.exists() {
        fs::remove_dir_all(&previous).with_context(|| format!("clearing {}", previous.display()))?;
    }
    let had_previous = target.root.exists();
    if had_previous {
        fs::rename(&target.root, &previous)
            .with_context(|| format!("moving previous index {} aside", target.root.display()))?;
    }

    if let Err(e) = fs::rename(&staging.root, &target.root) {
        if had_previous {
            if let Err(restore) = fs::rename(&previous, &target.root) {
                tracing::error!(error = %restore, previous = %previous.display(), "could not restore previous index");
            }
        }
        return Err(e).with_context(|| format!("moving {} to {}", staging.root.display(), target.root.display()));
    }

    if had_previous {
        if let Err(e) = fs::remove_dir_all(&previous) {
            tracing::warn!(error = %e, previous = %previous.display(), "could not remove previous index");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_rounds_kilobytes() {
        let r = Report::new(3, 10, 2048 + 512 + 5);
        assert_eq!(r.index_size_kb, 2.5);
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["Number of Documents"], 3);
        assert_eq!(json["Number of Unique Tokens"], 10);
    }

    #[test]
    fn staging_is_a_sibling() {
        let paths = IndexPaths::new("/tmp/out/index");
        assert_eq!(paths.staging().unwrap().root, PathBuf::from("/tmp/out/index.staging"));
    }

    #[test]
    fn partial_round_trip_through_bincode() {
        let dir = tempfile::tempdir().unwrap();
        let mut idx = InvertedIndex::new();
        idx.add("alpha", 1, 2);
        let path = dir.path().join("parts/index_part_0.bin");
        save_partial(&path, &idx).unwrap();
        assert_eq!(load_partial(&path).unwrap(), idx);
    }

    #[test]
    fn publish_replaces_previous_index() {
        let dir = tempfile::tempdir().unwrap();
        let target = IndexPaths::new(dir.path().join("index"));
        let staging = target.staging().unwrap();
        fs::create_dir_all(&target.root).unwrap();
        fs::write(target.root.join("old.txt"), "old").unwrap();
        fs::create_dir_all(&staging.root).unwrap();
        fs::write(staging.root.join("new.txt"), "new").unwrap();

        publish(&staging, &target).unwrap();
        assert!(target.root.join("new.txt").exists());
        assert!(!target.root.join("old.txt").exists());
        assert!(!staging.root.exists());
        assert!(!dir.path().join("index.previous").exists());
    }

    #[test]
    fn failed_publish_restores_previous_index() {
        let dir = tempfile::tempdir().unwrap();
        let target = IndexPaths::new(dir.path().join("index"));
        fs::create_dir_all(&target.root).unwrap();
        fs::write(target.root.join("old.txt"), "old").unwrap();
        // staging was never written, so the swap cannot happen
        let staging = target.staging().unwrap();

        assert!(publish(&staging, &target).is_err());
        assert_eq!(fs::read_to_string(target.root.join("old.txt")).unwrap(), "old");
        assert!(!dir.path().join("index.previous").exists());
    }

    #[test]
    fn rejects_unknown_version() {
        let dir = tempfile::tempdir().unwrap();
        let paths = IndexPaths::new(dir.path());
        let meta = MetaFile { num_docs: 0, created_at: String::new(), version: INDEX_VERSION + 1, temp_mem: 1 };
        save_meta(&paths, &meta).unwrap();
        assert!(load_meta(&paths).is_err());
    }
}
