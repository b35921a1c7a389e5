use crate::title_search::Catalogue;
use crate::SimilarityReport;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_reference_docs: usize,
    pub num_queries: usize,
    pub vocabulary_size: usize,
    pub created_at: String,
    pub version: u32,
}

pub struct OutputPaths {
    pub root: PathBuf,
}

impl OutputPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn similarities(&self) -> PathBuf { self.root.join("similarities.json") }
    pub fn catalogue(&self) -> PathBuf { self.root.join("catalogue.json") }
    pub fn meta(&self) -> PathBuf { self.root.join("meta.json") }
}

fn write_json<T: Serialize>(path: &Path, value: &T, pretty: bool) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    let f = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut w = BufWriter::new(f);
    if pretty {
        serde_json::to_writer_pretty(&mut w, value)?;
    } else {
        serde_json::to_writer(&mut w, value)?;
    }
    w.flush()?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let f = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let value = serde_json::from_reader(BufReader::new(f)).with_context(|| format!("parsing {}", path.display()))?;
    Ok(value)
}

pub fn save_report(paths: &OutputPaths, report: &SimilarityReport) -> Result<()> {
    write_json(&paths.similarities(), report, false)
}

pub fn load_report(paths: &OutputPaths) -> Result<SimilarityReport> {
    read_json(&paths.similarities())
}

pub fn save_catalogue(paths: &OutputPaths, catalogue: &Catalogue) -> Result<()> {
    write_json(&paths.catalogue(), catalogue, false)
}

pub fn load_catalogue(paths: &OutputPaths) -> Result<Catalogue> {
    read_json(&paths.catalogue())
}

pub fn save_meta(paths: &OutputPaths, meta: &MetaFile) -> Result<()> {
    write_json(&paths.meta(), meta, true)
}

pub fn load_meta(paths: &OutputPaths) -> Result<MetaFile> {
    read_json(&paths.meta())
}

/// Everything the serving layer needs: report, catalogue, meta.
pub fn load_output_header(paths: &OutputPaths) -> Result<(SimilarityReport, Catalogue, MetaFile)> {
    let report = load_report(paths)?;
    let catalogue = load_catalogue(paths)?;
    let meta = load_meta(paths)?;
    Ok((report, catalogue, meta))
}
