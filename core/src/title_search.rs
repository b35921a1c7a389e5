//! Title lookup over the query catalogue: plain substring search on the
//! canonical title, and edit-distance search across every alias.

use crate::corpus::QueryRecord;
use crate::edit_distance::{edit_distance_search, keep_closest};
use crate::{DocIndex, EditConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogueEntry {
    pub titles: Vec<String>,
    pub description: String,
}

/// Query records in internal-index order, minus pass-through fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalogue {
    entries: Vec<CatalogueEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogueHit {
    pub index: DocIndex,
    pub titles: Vec<String>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleMatch {
    pub distance: u32,
    pub index: DocIndex,
    /// The alias that produced `distance`.
    pub title: String,
}

impl Catalogue {
    pub fn new(entries: Vec<CatalogueEntry>) -> Self { Self { entries } }

    pub fn from_records(records: &[QueryRecord]) -> Self {
        let entries = records
            .iter()
            .map(|r| CatalogueEntry {
                titles: r.titles.clone(),
                description: r.description.clone().unwrap_or_default(),
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn get(&self, index: DocIndex) -> Option<&CatalogueEntry> {
        self.entries.get(index as usize)
    }

    /// Case-insensitive containment in the canonical title. An empty query matches nothing.
    pub fn substring_search(&self, query: &str) -> Vec<CatalogueHit> {
        if query.is_empty() {
            return Vec::new();
        }
        let needle = query.to_lowercase();
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.titles.first().is_some_and(|t| t.to_lowercase().contains(&needle)))
            .map(|(i, e)| CatalogueHit {
                index: i as DocIndex,
                titles: e.titles.clone(),
                description: e.description.clone(),
            })
            .collect()
    }

    /// Each entry scores its closest alias; ascending distance, catalogue
    /// order on ties, at most `config.top_k` results.
    pub fn fuzzy_search(&self, query: &str, config: &EditConfig) -> Vec<TitleMatch> {
        let mut matches: Vec<TitleMatch> = self
            .entries
            .iter()
            .enumerate()
            .filter_map(|(i, e)| {
                edit_distance_search(query, &e.titles, config.policy, 1)
                    .into_iter()
                    .next()
                    .map(|best| TitleMatch { distance: best.distance, index: i as DocIndex, title: best.candidate })
            })
            .collect();
        keep_closest(&mut matches, config.top_k, |m| m.distance);
        matches
    }
}
