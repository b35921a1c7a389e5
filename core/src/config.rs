use crate::edit_distance::CostPolicy;
use crate::Error;
use serde::{Deserialize, Serialize};

/// How repeated terms in a query document are counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryWeighting {
    /// Raw occurrence counts, the same as the reference side.
    #[default]
    RawCounts,
    /// Each distinct term counts once regardless of repetition.
    Presence,
}

/// Thresholds and limits for the TF-IDF scoring pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Minimum number of reference documents a term must occur in.
    pub min_df: usize,
    /// Maximum fraction of reference documents a term may occur in.
    pub max_df_ratio: f64,
    /// Number of ranked documents kept per query.
    pub top_k: usize,
    pub query_weighting: QueryWeighting,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            min_df: 10,
            max_df_ratio: 0.95,
            top_k: 10,
            query_weighting: QueryWeighting::RawCounts,
        }
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if self.min_df == 0 {
            return Err(Error::InvalidConfig("min_df must be at least 1".into()));
        }
        if !self.max_df_ratio.is_finite() || self.max_df_ratio <= 0.0 || self.max_df_ratio > 1.0 {
            return Err(Error::InvalidConfig(format!(
                "max_df_ratio must lie in (0, 1], got {}",
                self.max_df_ratio
            )));
        }
        Ok(())
    }
}

/// Settings for edit-distance title search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditConfig {
    pub policy: CostPolicy,
    pub top_k: usize,
}

impl Default for EditConfig {
    fn default() -> Self {
        Self { policy: CostPolicy::Levenshtein, top_k: 10 }
    }
}
