/// Errors raised while building the corpus index or validating configuration.
///
/// Per-query conditions (no shared vocabulary, zero-norm documents) are not
/// errors; they produce empty rankings instead.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// An input record lacks a field the engine needs.
    #[error("malformed {corpus} record at position {position}: missing `{field}`")]
    MalformedRecord {
        corpus: &'static str,
        position: usize,
        field: &'static str,
    },
    /// Scoring or matching thresholds are out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
