//! Ingestion of the two input corpora.
//!
//! Each record receives the next sequential internal index in input order.
//! The index <-> external key mappings are returned as plain values so the
//! rest of the pipeline threads them explicitly.

use crate::tokenizer::tokenize;
use crate::{DocIndex, Document, Error, ReferenceId};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A fan-fiction record. Only `id` and `description` are read; everything
/// else (rating, tags, kudos, ...) is carried through in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceRecord {
    pub id: ReferenceId,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A web-novel record. The first title is its canonical key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRecord {
    #[serde(default)]
    pub titles: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl QueryRecord {
    pub fn canonical_title(&self) -> Option<&str> {
        self.titles.first().map(String::as_str)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReferenceCorpus {
    pub documents: Vec<Document>,
    pub index_to_reference_id: BTreeMap<DocIndex, ReferenceId>,
    pub reference_id_to_index: HashMap<ReferenceId, DocIndex>,
}

#[derive(Debug, Clone, Default)]
pub struct QueryCorpus {
    pub documents: Vec<Document>,
    pub query_title_to_index: BTreeMap<String, DocIndex>,
    pub index_to_query_title: BTreeMap<DocIndex, String>,
}

pub fn ingest_references(records: &[ReferenceRecord]) -> Result<ReferenceCorpus, Error> {
    let mut corpus = ReferenceCorpus::default();
    let mut descriptions = Vec::with_capacity(records.len());
    for (position, record) in records.iter().enumerate() {
        let description = record.description.as_deref().ok_or(Error::MalformedRecord {
            corpus: "reference",
            position,
            field: "description",
        })?;
        let index = position as DocIndex;
        corpus.index_to_reference_id.insert(index, record.id);
        if corpus.reference_id_to_index.insert(record.id, index).is_some() {
            tracing::warn!(reference_id = record.id, index, "duplicate reference id, keeping the later record");
        }
        descriptions.push(description);
    }
    corpus.documents = tokenize_all(&descriptions);
    tracing::debug!(documents = corpus.documents.len(), "ingested reference corpus");
    Ok(corpus)
}

pub fn ingest_queries(records: &[QueryRecord]) -> Result<QueryCorpus, Error> {
    let mut corpus = QueryCorpus::default();
    let mut descriptions = Vec::with_capacity(records.len());
    for (position, record) in records.iter().enumerate() {
        let title = record.canonical_title().ok_or(Error::MalformedRecord {
            corpus: "query",
            position,
            field: "titles",
        })?;
        let description = record.description.as_deref().ok_or(Error::MalformedRecord {
            corpus: "query",
            position,
            field: "description",
        })?;
        let index = position as DocIndex;
        if corpus.query_title_to_index.insert(title.to_string(), index).is_some() {
            tracing::warn!(title, index, "duplicate canonical title, keeping the later record");
        }
        corpus.index_to_query_title.insert(index, title.to_string());
        descriptions.push(description);
    }
    corpus.documents = tokenize_all(&descriptions);
    tracing::debug!(documents = corpus.documents.len(), "ingested query corpus");
    Ok(corpus)
}

fn tokenize_all(descriptions: &[&str]) -> Vec<Document> {
    descriptions
        .par_iter()
        .enumerate()
        .map(|(position, text)| Document { index: position as DocIndex, tokens: tokenize(text) })
        .collect()
}
