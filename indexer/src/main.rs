use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ficrec_core::corpus::{ingest_queries, ingest_references, QueryRecord, ReferenceRecord};
use ficrec_core::edit_distance::CostPolicy;
use ficrec_core::persist::{load_catalogue, save_catalogue, save_meta, save_report, MetaFile, OutputPaths};
use ficrec_core::title_search::Catalogue;
use ficrec_core::{EditConfig, QueryWeighting, ScoringConfig, SimilarityEngine};
use serde::de::DeserializeOwned;
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build fan-fiction recommendations for web novels", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score every web novel against the fan-fiction corpus and write the results
    Build {
        /// Fan-fiction input files or directories (JSON/JSONL)
        #[arg(long, required = true, num_args = 1..)]
        references: Vec<PathBuf>,
        /// Web-novel input files or directories (JSON/JSONL)
        #[arg(long, required = true, num_args = 1..)]
        queries: Vec<PathBuf>,
        /// Output directory
        #[arg(long)]
        output: PathBuf,
        #[arg(long, default_value_t = 10)]
        min_df: usize,
        #[arg(long, default_value_t = 0.95)]
        max_df_ratio: f64,
        #[arg(long, default_value_t = 10)]
        top_k: usize,
        /// Count each query term once regardless of repetition
        #[arg(long, default_value_t = false)]
        presence_query_counts: bool,
    },
    /// Fuzzy title lookup against a built output directory
    Titles {
        #[arg(long)]
        index: PathBuf,
        #[arg(long)]
        query: String,
        #[arg(long, default_value_t = 10)]
        k: usize,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { references, queries, output, min_df, max_df_ratio, top_k, presence_query_counts } => {
            let config = ScoringConfig {
                min_df,
                max_df_ratio,
                top_k,
                query_weighting: if presence_query_counts { QueryWeighting::Presence } else { QueryWeighting::RawCounts },
            };
            build(&references, &queries, &output, &config)
        }
        Commands::Titles { index, query, k } => {
            let catalogue = load_catalogue(&OutputPaths::new(&index))?;
            let cfg = EditConfig { policy: CostPolicy::Levenshtein, top_k: k };
            for m in catalogue.fuzzy_search(&query, &cfg) {
                println!("{}", serde_json::to_string(&m)?);
            }
            Ok(())
        }
    }
}

fn build(references: &[PathBuf], queries: &[PathBuf], output: &Path, config: &ScoringConfig) -> Result<()> {
    config.validate()?;
    let reference_records: Vec<ReferenceRecord> = load_records(references)?;
    let query_records: Vec<QueryRecord> = load_records(queries)?;
    tracing::info!(references = reference_records.len(), queries = query_records.len(), "loaded corpora");

    let reference_corpus = ingest_references(&reference_records)?;
    let query_corpus = ingest_queries(&query_records)?;
    let engine = SimilarityEngine::build(reference_corpus, config.clone())?;
    let report = engine.report(&query_corpus);
    let catalogue = Catalogue::from_records(&query_records);

    let paths = OutputPaths::new(output);
    save_report(&paths, &report)?;
    save_catalogue(&paths, &catalogue)?;
    let meta = MetaFile {
        num_reference_docs: reference_records.len(),
        num_queries: query_records.len(),
        vocabulary_size: engine.idf().len(),
        created_at: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_default(),
        version: 1,
    };
    save_meta(&paths, &meta)?;

    tracing::info!(output = %output.display(), "build complete");
    Ok(())
}

/// Collect `.json`/`.jsonl` files from the given paths, directories walked in file-name order.
fn collect_files(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            for entry in WalkDir::new(input).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
                let p = entry.path();
                if p.is_file() && matches!(p.extension().and_then(|s| s.to_str()), Some("json" | "jsonl")) {
                    files.push(p.to_path_buf());
                }
            }
        } else if input.is_file() {
            files.push(input.clone());
        } else {
            tracing::warn!(path = %input.display(), "input path does not exist, skipping");
        }
    }
    files
}

fn load_records<T: DeserializeOwned>(inputs: &[PathBuf]) -> Result<Vec<T>> {
    let mut records = Vec::new();
    for file in collect_files(inputs) {
        let before = records.len();
        if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            read_jsonl(&file, &mut records)?;
        } else {
            read_json(&file, &mut records)?;
        }
        tracing::debug!(file = %file.display(), records = records.len() - before, "read input file");
    }
    Ok(records)
}

fn read_jsonl<T: DeserializeOwned>(file: &Path, out: &mut Vec<T>) -> Result<()> {
    let reader = BufReader::new(File::open(file).with_context(|| format!("opening {}", file.display()))?);
    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let record = serde_json::from_str(&line).with_context(|| format!("{}:{}", file.display(), n + 1))?;
        out.push(record);
    }
    Ok(())
}

fn read_json<T: DeserializeOwned>(file: &Path, out: &mut Vec<T>) -> Result<()> {
    let reader = BufReader::new(File::open(file).with_context(|| format!("opening {}", file.display()))?);
    let json: serde_json::Value = serde_json::from_reader(reader).with_context(|| format!("parsing {}", file.display()))?;
    match json {
        serde_json::Value::Array(arr) => {
            for v in arr {
                out.push(serde_json::from_value(v)?);
            }
        }
        serde_json::Value::Object(_) => out.push(serde_json::from_value(json)?),
        _ => tracing::warn!(file = %file.display(), "ignoring non-record JSON document"),
    }
    Ok(())
}
