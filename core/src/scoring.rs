//! Term-at-a-time cosine scoring against the shared reference index.

use crate::idf::IdfTable;
use crate::index::InvertedIndex;
use crate::norms::DocNorms;
use crate::{DocIndex, QueryWeighting, ScoredDocument};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

/// Sparse term counts of one query, restricted to the IDF vocabulary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryVector {
    counts: BTreeMap<String, u32>,
    norm: f64,
}

impl QueryVector {
    pub fn from_tokens(tokens: &[String], idf: &IdfTable, weighting: QueryWeighting) -> Self {
        let mut counts: BTreeMap<String, u32> = BTreeMap::new();
        for token in tokens.iter().filter(|t| idf.contains(t)) {
            match weighting {
                QueryWeighting::RawCounts => *counts.entry(token.clone()).or_insert(0) += 1,
                QueryWeighting::Presence => {
                    counts.entry(token.clone()).or_insert(1);
                }
            }
        }
        let norm = counts
            .iter()
            .filter_map(|(term, count)| idf.get(term).map(|w| (*count as f64 * w).powi(2)))
            .sum::<f64>()
            .sqrt();
        Self { counts, norm }
    }

    pub fn norm(&self) -> f64 { self.norm }

    pub fn is_empty(&self) -> bool { self.counts.is_empty() }

    pub fn len(&self) -> usize { self.counts.len() }

    pub fn count(&self, term: &str) -> u32 {
        self.counts.get(term).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.counts.iter().map(|(t, c)| (t.as_str(), *c))
    }
}

/// Dot-product numerators for every document sharing a vocabulary term with
/// the query. Documents with no overlap are absent.
pub fn accumulate_dot_scores(query: &QueryVector, index: &InvertedIndex, idf: &IdfTable) -> HashMap<DocIndex, f64> {
    let mut scores: HashMap<DocIndex, f64> = HashMap::new();
    for (term, query_count) in query.iter() {
        let (Some(weight), Some(postings)) = (idf.get(term), index.postings(term)) else {
            continue;
        };
        let query_weight = query_count as f64 * weight;
        for p in postings {
            *scores.entry(p.doc_index).or_insert(0.0) += p.term_frequency as f64 * weight * query_weight;
        }
    }
    scores
}

/// Normalize by `query_norm * doc_norm`, keep the `k` best.
/// Ordering: score descending, then document index ascending.
pub fn rank_top_k(scores: &HashMap<DocIndex, f64>, query_norm: f64, norms: &DocNorms, k: usize) -> Vec<ScoredDocument> {
    if k == 0 || query_norm == 0.0 || !query_norm.is_finite() {
        return Vec::new();
    }
    let mut ranked: Vec<ScoredDocument> = scores
        .iter()
        .filter(|(_, raw)| **raw != 0.0)
        .filter_map(|(&doc, &raw)| {
            let doc_norm = norms.get(doc);
            if doc_norm == 0.0 {
                return None;
            }
            let score = raw / (query_norm * doc_norm);
            score.is_finite().then_some(ScoredDocument { score, document_index: doc })
        })
        .collect();

    if ranked.len() > k {
        ranked.select_nth_unstable_by(k - 1, compare_ranked);
        ranked.truncate(k);
    }
    ranked.sort_unstable_by(compare_ranked);
    ranked
}

fn compare_ranked(a: &ScoredDocument, b: &ScoredDocument) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.document_index.cmp(&b.document_index))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn fixture() -> (InvertedIndex, IdfTable, DocNorms) {
        let d = vec![
            strings(&["dragon", "magic", "magic"]),
            strings(&["dragon", "school"]),
            strings(&["school", "romance"]),
            strings(&["romance", "magic"]),
            strings(&["filler"]),
        ];
        let idx = InvertedIndex::build(d.iter().map(Vec::as_slice));
        let idf = IdfTable::compute(&idx, 5, 1, 1.0);
        let norms = DocNorms::compute(&idx, &idf, 5);
        (idx, idf, norms)
    }

    #[test]
    fn query_vector_drops_out_of_vocabulary_terms() {
        let (_, idf, _) = fixture();
        let q = QueryVector::from_tokens(&strings(&["dragon", "dragon", "unknown"]), &idf, QueryWeighting::RawCounts);
        assert_eq!(q.len(), 1);
        assert_eq!(q.count("dragon"), 2);
        assert_eq!(q.count("unknown"), 0);
        let w = idf.get("dragon").unwrap();
        assert!((q.norm() - 2.0 * w).abs() < 1e-12);
    }

    #[test]
    fn presence_weighting_collapses_repeats() {
        let (_, idf, _) = fixture();
        let q = QueryVector::from_tokens(&strings(&["dragon", "dragon", "magic"]), &idf, QueryWeighting::Presence);
        assert_eq!(q.count("dragon"), 1);
        assert_eq!(q.count("magic"), 1);
    }

    #[test]
    fn accumulator_only_touches_overlapping_documents() {
        let (idx, idf, _) = fixture();
        let q = QueryVector::from_tokens(&strings(&["dragon"]), &idf, QueryWeighting::RawCounts);
        let scores = accumulate_dot_scores(&q, &idx, &idf);
        let mut docs: Vec<_> = scores.keys().copied().collect();
        docs.sort();
        assert_eq!(docs, vec![0, 1]);
        let w = idf.get("dragon").unwrap();
        assert!((scores[&0] - w * w).abs() < 1e-12);
    }

    #[test]
    fn ranks_by_cosine_and_truncates() {
        let (idx, idf, norms) = fixture();
        let q = QueryVector::from_tokens(&strings(&["school", "romance"]), &idf, QueryWeighting::RawCounts);
        let scores = accumulate_dot_scores(&q, &idx, &idf);
        let ranked = rank_top_k(&scores, q.norm(), &norms, 10);
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].document_index, 2);
        assert!((ranked[0].score - 1.0).abs() < 1e-9);
        assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));

        let top1 = rank_top_k(&scores, q.norm(), &norms, 1);
        assert_eq!(top1, vec![ranked[0]]);
        assert!(rank_top_k(&scores, q.norm(), &norms, 0).is_empty());
    }

    #[test]
    fn ties_break_by_document_index() {
        let d: Vec<Vec<String>> = ["a", "b", "c", "d", "e"].iter().map(|t| strings(&[*t])).collect();
        let idx = InvertedIndex::build(d.iter().map(Vec::as_slice));
        let idf = IdfTable::compute(&idx, 5, 1, 1.0);
        let norms = DocNorms::compute(&idx, &idf, 5);
        let mut scores = HashMap::new();
        for doc in [4u32, 1, 3, 0] {
            scores.insert(doc, 1.0);
        }
        let ranked = rank_top_k(&scores, 1.0, &norms, 3);
        let order: Vec<_> = ranked.iter().map(|r| r.document_index).collect();
        assert_eq!(order, vec![0, 1, 3]);
    }

    #[test]
    fn zero_norm_documents_are_excluded() {
        let mut scores = HashMap::new();
        scores.insert(0u32, 2.0);
        let norms = DocNorms::default();
        assert!(rank_top_k(&scores, 1.0, &norms, 10).is_empty());
        assert!(rank_top_k(&scores, 0.0, &norms, 10).is_empty());
    }

    #[test]
    fn overlap_through_zero_idf_terms_only_is_not_ranked() {
        // "shared" is in 3 of 4 documents, so its idf is log2(4 / 4) = 0.
        let d = vec![
            strings(&["shared", "x"]),
            strings(&["shared", "y"]),
            strings(&["shared", "z"]),
            strings(&["w"]),
        ];
        let idx = InvertedIndex::build(d.iter().map(Vec::as_slice));
        let idf = IdfTable::compute(&idx, 4, 1, 1.0);
        assert_eq!(idf.get("shared"), Some(0.0));
        let norms = DocNorms::compute(&idx, &idf, 4);

        let q = QueryVector::from_tokens(&strings(&["shared", "w"]), &idf, QueryWeighting::RawCounts);
        let scores = accumulate_dot_scores(&q, &idx, &idf);
        assert_eq!(scores.len(), 4);
        let ranked = rank_top_k(&scores, q.norm(), &norms, 10);
        let order: Vec<_> = ranked.iter().map(|r| r.document_index).collect();
        assert_eq!(order, vec![3]);
    }
}
