//! Weighted Levenshtein distance by dynamic programming, plus a top-k search
//! over candidate strings.

use serde::{Deserialize, Serialize};

/// Per-operation edit costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CostPolicy {
    /// Unit insertion and deletion; substitution is free for equal characters.
    #[default]
    Levenshtein,
    /// Fixed costs per operation. Matching characters still substitute for free.
    Weighted { insertion: u32, deletion: u32, substitution: u32 },
}

impl CostPolicy {
    pub fn insertion(&self, _c: char) -> u32 {
        match self {
            Self::Levenshtein => 1,
            Self::Weighted { insertion, .. } => *insertion,
        }
    }

    pub fn deletion(&self, _c: char) -> u32 {
        match self {
            Self::Levenshtein => 1,
            Self::Weighted { deletion, .. } => *deletion,
        }
    }

    pub fn substitution(&self, from: char, to: char) -> u32 {
        if from == to {
            return 0;
        }
        match self {
            Self::Levenshtein => 1,
            Self::Weighted { substitution, .. } => *substitution,
        }
    }
}

/// `(query.len() + 1) x (message.len() + 1)` cost table. Cell `[i][j]` is the
/// cheapest way to turn the first `i` query chars into the first `j` message chars.
/// Costs saturate at `u32::MAX`.
pub fn edit_matrix(query: &[char], message: &[char], policy: CostPolicy) -> Vec<Vec<u32>> {
    let rows = query.len() + 1;
    let cols = message.len() + 1;
    let mut chart = vec![vec![0u32; cols]; rows];
    for i in 1..rows {
        chart[i][0] = chart[i - 1][0].saturating_add(policy.deletion(query[i - 1]));
    }
    for j in 1..cols {
        chart[0][j] = chart[0][j - 1].saturating_add(policy.insertion(message[j - 1]));
    }
    for i in 1..rows {
        for j in 1..cols {
            let delete = chart[i - 1][j].saturating_add(policy.deletion(query[i - 1]));
            let insert = chart[i][j - 1].saturating_add(policy.insertion(message[j - 1]));
            let substitute = chart[i - 1][j - 1].saturating_add(policy.substitution(query[i - 1], message[j - 1]));
            chart[i][j] = delete.min(insert).min(substitute);
        }
    }
    chart
}

/// Case-insensitive edit distance between two strings.
pub fn edit_distance(query: &str, message: &str, policy: CostPolicy) -> u32 {
    let q: Vec<char> = query.to_lowercase().chars().collect();
    let m: Vec<char> = message.to_lowercase().chars().collect();
    let chart = edit_matrix(&q, &m, policy);
    chart[q.len()][m.len()]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditMatch {
    pub distance: u32,
    /// Position of the candidate in the input slice.
    pub position: usize,
    pub candidate: String,
}

/// The `k` candidates closest to `query`, ascending by distance. Equal
/// distances keep input order.
pub fn edit_distance_search<S: AsRef<str>>(query: &str, candidates: &[S], policy: CostPolicy, k: usize) -> Vec<EditMatch> {
    let mut matches: Vec<EditMatch> = candidates
        .iter()
        .enumerate()
        .map(|(position, c)| EditMatch {
            distance: edit_distance(query, c.as_ref(), policy),
            position,
            candidate: c.as_ref().to_string(),
        })
        .collect();
    keep_closest(&mut matches, k, |m| m.distance);
    matches
}

/// Stable sort ascending by `distance`, then keep the first `k`.
pub fn keep_closest<T>(matches: &mut Vec<T>, k: usize, distance: impl Fn(&T) -> u32) {
    matches.sort_by_key(|m| distance(m));
    matches.truncate(k);
}
