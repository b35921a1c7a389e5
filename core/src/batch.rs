use crate::corpus::{ingest_queries, ingest_references, QueryCorpus, QueryRecord, ReferenceCorpus, ReferenceRecord};
use crate::idf::IdfTable;
use crate::index::CorpusIndex;
use crate::norms::DocNorms;
use crate::scoring::{accumulate_dot_scores, rank_top_k, QueryVector};
use crate::{DocIndex, Document, Error, ReferenceId, ScoredDocument, ScoringConfig};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Index, IDF table and norms over the reference corpus. Immutable once built
/// and shared read-only by every query evaluation.
#[derive(Debug)]
pub struct SimilarityEngine {
    corpus: CorpusIndex,
    idf: IdfTable,
    norms: DocNorms,
    config: ScoringConfig,
}

impl SimilarityEngine {
    pub fn build(references: ReferenceCorpus, config: ScoringConfig) -> Result<Self, Error> {
        config.validate()?;
        let corpus = CorpusIndex::build(references);
        let n_docs = corpus.num_docs();
        let idf = IdfTable::from_config(&corpus.index, &config);
        let norms = DocNorms::compute(&corpus.index, &idf, n_docs);
        tracing::info!(n_docs, vocabulary = idf.len(), "similarity engine ready");
        Ok(Self { corpus, idf, norms, config })
    }

    /// Rank reference documents against one tokenized query.
    pub fn score(&self, tokens: &[String]) -> Vec<ScoredDocument> {
        let query = QueryVector::from_tokens(tokens, &self.idf, self.config.query_weighting);
        if query.is_empty() {
            return Vec::new();
        }
        let scores = accumulate_dot_scores(&query, &self.corpus.index, &self.idf);
        rank_top_k(&scores, query.norm(), &self.norms, self.config.top_k)
    }

    /// Score every query independently, keyed by the query's internal index.
    pub fn score_batch(&self, queries: &[Document]) -> BTreeMap<DocIndex, Vec<ScoredDocument>> {
        queries
            .par_iter()
            .map(|doc| (doc.index, self.score(&doc.tokens)))
            .collect()
    }

    /// Score a whole query corpus and assemble the boundary output.
    pub fn report(&self, queries: &QueryCorpus) -> SimilarityReport {
        let cossims = self.score_batch(&queries.documents);
        let matched = cossims.values().filter(|r| !r.is_empty()).count();
        tracing::info!(queries = cossims.len(), matched, "scored query corpus");
        SimilarityReport {
            cossims,
            index_to_reference_id: self.corpus.index_to_reference_id.clone(),
            query_title_to_index: queries.query_title_to_index.clone(),
        }
    }

    pub fn corpus(&self) -> &CorpusIndex { &self.corpus }

    pub fn idf(&self) -> &IdfTable { &self.idf }

    pub fn norms(&self) -> &DocNorms { &self.norms }

    pub fn config(&self) -> &ScoringConfig { &self.config }
}

/// Output handed to the serving layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimilarityReport {
    pub cossims: BTreeMap<DocIndex, Vec<ScoredDocument>>,
    pub index_to_reference_id: BTreeMap<DocIndex, ReferenceId>,
    pub query_title_to_index: BTreeMap<String, DocIndex>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub reference_id: ReferenceId,
    pub score: f64,
}

impl SimilarityReport {
    /// Ranked reference ids for a canonical query title, at most `k` of them.
    /// `None` when the title is unknown.
    pub fn recommendations_for(&self, title: &str, k: usize) -> Option<Vec<Recommendation>> {
        let index = self.query_title_to_index.get(title)?;
        let ranked = self.cossims.get(index).map(Vec::as_slice).unwrap_or(&[]);
        Some(
            ranked
                .iter()
                .take(k)
                .filter_map(|r| {
                    self.index_to_reference_id
                        .get(&r.document_index)
                        .map(|&reference_id| Recommendation { reference_id, score: r.score })
                })
                .collect(),
        )
    }
}

/// Full batch run: validate, ingest both corpora, build the engine, score
/// every query.
pub fn run_batch(
    references: &[ReferenceRecord],
    queries: &[QueryRecord],
    config: &ScoringConfig,
) -> Result<SimilarityReport, Error> {
    config.validate()?;
    let reference_corpus = ingest_references(references)?;
    let query_corpus = ingest_queries(queries)?;
    let engine = SimilarityEngine::build(reference_corpus, config.clone())?;
    Ok(engine.report(&query_corpus))
}
