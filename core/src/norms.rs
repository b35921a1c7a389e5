use crate::idf::IdfTable;
use crate::index::InvertedIndex;
use crate::DocIndex;

/// Dense per-document Euclidean norm of the TF-IDF vector over in-vocabulary terms.
#[derive(Debug, Clone, Default)]
pub struct DocNorms(Vec<f64>);

impl DocNorms {
    pub fn compute(index: &InvertedIndex, idf: &IdfTable, n_docs: usize) -> Self {
        let mut norms = vec![0.0f64; n_docs];
        for term in idf.sorted_terms() {
            let (Some(weight), Some(postings)) = (idf.get(term), index.postings(term)) else {
                continue;
            };
            for p in postings {
                if let Some(slot) = norms.get_mut(p.doc_index as usize) {
                    let w = p.term_frequency as f64 * weight;
                    *slot += w * w;
                }
            }
        }
        for n in norms.iter_mut() {
            *n = n.sqrt();
        }
        let zero = norms.iter().filter(|n| **n == 0.0).count();
        tracing::debug!(n_docs, zero_norm_docs = zero, "computed document norms");
        Self(norms)
    }

    /// Zero for unknown documents.
    pub fn get(&self, doc_index: DocIndex) -> f64 {
        self.0.get(doc_index as usize).copied().unwrap_or(0.0)
    }

    pub fn as_slice(&self) -> &[f64] { &self.0 }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}
