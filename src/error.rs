use thiserror::Error;

/// Error type for the identifier → artifact pipeline.
///
/// Per-record detail-page failures are deliberately absent: they degrade to a
/// placeholder design string and the run continues. Everything here is fatal
/// to the run and surfaced to the caller. No network call is ever retried.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Zero identifiers supplied, or zero usable dataset records left after
    /// per-record filtering. Raised before vectorization is attempted.
    #[error("nothing to cluster: {0}")]
    EmptyInput(String),

    /// The upstream link or summary lookup was unusable: HTTP failure,
    /// malformed response shape, or no associated dataset ids at all.
    #[error("metadata resolution failed: {0}")]
    Resolution(String),

    /// The TF-IDF vocabulary collapsed to zero retained features, so there is
    /// no feature space to cluster in.
    #[error("degenerate corpus: {0}")]
    DegenerateCorpus(String),
}
