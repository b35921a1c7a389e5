use crate::corpus::ReferenceCorpus;
use crate::{DocIndex, Posting, ReferenceId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Term -> postings list. Each list is strictly ascending by `doc_index`
/// with one entry per document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvertedIndex {
    postings: HashMap<String, Vec<Posting>>,
    num_docs: usize,
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    /// Build from token sequences; the n-th sequence becomes document `n`.
    pub fn build<'a, I>(documents: I) -> Self
    where
        I: IntoIterator<Item = &'a [String]>,
    {
        let mut index = Self::new();
        for tokens in documents {
            index.push_document(tokens);
        }
        index
    }

    fn push_document(&mut self, tokens: &[String]) {
        let doc_index = self.num_docs as DocIndex;
        self.num_docs += 1;
        for token in tokens {
            match self.postings.get_mut(token.as_str()) {
                Some(list) => match list.last_mut() {
                    Some(last) if last.doc_index == doc_index => last.term_frequency += 1,
                    _ => list.push(Posting { doc_index, term_frequency: 1 }),
                },
                None => {
                    self.postings.insert(token.clone(), vec![Posting { doc_index, term_frequency: 1 }]);
                }
            }
        }
    }

    pub fn postings(&self, term: &str) -> Option<&[Posting]> {
        self.postings.get(term).map(Vec::as_slice)
    }

    pub fn doc_frequency(&self, term: &str) -> usize {
        self.postings.get(term).map_or(0, Vec::len)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Posting])> {
        self.postings.iter().map(|(t, p)| (t.as_str(), p.as_slice()))
    }

    /// Documents seen, including those with no tokens.
    pub fn num_docs(&self) -> usize { self.num_docs }

    pub fn num_terms(&self) -> usize { self.postings.len() }
}

/// The reference-side index together with its id mappings.
#[derive(Debug, Clone, Default)]
pub struct CorpusIndex {
    pub index: InvertedIndex,
    pub index_to_reference_id: BTreeMap<DocIndex, ReferenceId>,
    pub reference_id_to_index: HashMap<ReferenceId, DocIndex>,
}

impl CorpusIndex {
    pub fn build(corpus: ReferenceCorpus) -> Self {
        let index = InvertedIndex::build(corpus.documents.iter().map(|d| d.tokens.as_slice()));
        tracing::info!(num_docs = index.num_docs(), num_terms = index.num_terms(), "built inverted index");
        Self {
            index,
            index_to_reference_id: corpus.index_to_reference_id,
            reference_id_to_index: corpus.reference_id_to_index,
        }
    }

    pub fn num_docs(&self) -> usize { self.index.num_docs() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(raw: &[&[&str]]) -> Vec<Vec<String>> {
        raw.iter().map(|d| d.iter().map(|s| s.to_string()).collect()).collect()
    }

    #[test]
    fn counts_term_frequencies_per_document() {
        let d = docs(&[&["to", "be", "or", "not", "to", "be"], &["do", "be", "do", "be", "do"]]);
        let idx = InvertedIndex::build(d.iter().map(Vec::as_slice));
        assert_eq!(
            idx.postings("be").unwrap(),
            &[Posting { doc_index: 0, term_frequency: 2 }, Posting { doc_index: 1, term_frequency: 2 }]
        );
        assert_eq!(idx.postings("not").unwrap(), &[Posting { doc_index: 0, term_frequency: 1 }]);
        assert_eq!(idx.postings("do").unwrap(), &[Posting { doc_index: 1, term_frequency: 3 }]);
        assert_eq!(idx.num_docs(), 2);
        assert!(idx.postings("absent").is_none());
    }

    #[test]
    fn postings_strictly_ascending() {
        let d = docs(&[&["a", "b", "a"], &[], &["b", "c", "b"], &["a", "c", "a", "c"]]);
        let idx = InvertedIndex::build(d.iter().map(Vec::as_slice));
        assert_eq!(idx.num_docs(), 4);
        for (_, list) in idx.iter() {
            assert!(list.windows(2).all(|w| w[0].doc_index < w[1].doc_index));
        }
        assert_eq!(idx.doc_frequency("a"), 2);
    }
}
