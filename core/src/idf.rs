use crate::index::InvertedIndex;
use crate::ScoringConfig;
use std::collections::HashMap;

/// Per-term inverse document frequency, pruned by document-frequency bounds.
/// Pruned terms are absent and count as out of vocabulary everywhere.
#[derive(Debug, Clone, Default)]
pub struct IdfTable {
    weights: HashMap<String, f64>,
}

impl IdfTable {
    /// `idf = log2(n_docs / (1 + df))` for terms with `min_df <= df` and
    /// `df / n_docs <= max_df_ratio`.
    pub fn compute(index: &InvertedIndex, n_docs: usize, min_df: usize, max_df_ratio: f64) -> Self {
        if n_docs == 0 {
            return Self::default();
        }
        let n = n_docs as f64;
        let weights: HashMap<String, f64> = index
            .iter()
            .filter_map(|(term, postings)| {
                let df = postings.len();
                if df >= min_df && (df as f64) / n <= max_df_ratio {
                    Some((term.to_string(), (n / (1.0 + df as f64)).log2()))
                } else {
                    None
                }
            })
            .collect();
        tracing::debug!(kept = weights.len(), total = index.num_terms(), "computed idf table");
        Self { weights }
    }

    pub fn from_config(index: &InvertedIndex, config: &ScoringConfig) -> Self {
        Self::compute(index, index.num_docs(), config.min_df, config.max_df_ratio)
    }

    pub fn get(&self, term: &str) -> Option<f64> {
        self.weights.get(term).copied()
    }

    pub fn contains(&self, term: &str) -> bool { self.weights.contains_key(term) }

    pub fn len(&self) -> usize { self.weights.len() }

    pub fn is_empty(&self) -> bool { self.weights.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.weights.iter().map(|(t, w)| (t.as_str(), *w))
    }

    /// Vocabulary in lexical order, for order-stable float accumulation.
    pub fn sorted_terms(&self) -> Vec<&str> {
        let mut terms: Vec<&str> = self.weights.keys().map(String::as_str).collect();
        terms.sort_unstable();
        terms
    }
}
