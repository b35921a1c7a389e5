//! Content-based recommendation engine: matches query documents (web-novel
//! descriptions) against a reference corpus (fan fiction) by TF-IDF cosine
//! similarity, plus fuzzy and substring title lookup.

pub mod batch;
pub mod config;
pub mod corpus;
pub mod edit_distance;
pub mod error;
pub mod idf;
pub mod index;
pub mod norms;
pub mod persist;
pub mod scoring;
pub mod title_search;
pub mod tokenizer;

use serde::{Deserialize, Serialize};

pub use batch::{run_batch, Recommendation, SimilarityEngine, SimilarityReport};
pub use config::{EditConfig, QueryWeighting, ScoringConfig};
pub use error::Error;
pub use index::{CorpusIndex, InvertedIndex};

/// Internal, zero-based position of a document within its corpus.
pub type DocIndex = u32;
/// External fan-fiction identifier carried by reference records.
pub type ReferenceId = u64;

/// A tokenized document. `index` is assigned at ingestion and never changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub index: DocIndex,
    pub tokens: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_index: DocIndex,
    pub term_frequency: u32,
}

/// One ranked reference document for a query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredDocument {
    pub score: f64,
    pub document_index: DocIndex,
}
