//! Error types shared by every stage of the pipeline.
//!
//! The two domain kinds, [`WarningError::DateOutRange`] and
//! [`WarningError::CountryUndefined`], are raised synchronously at validation
//! time and are fatal to the requested operation. Numeric degeneracies
//! (zero-variance correlation, empty graphs, disconnected paths) are never
//! errors; they resolve to 0 or NaN in the marker that meets them.

use thiserror::Error;

/// Result alias used across the crate.
pub type WarningResult<T> = Result<T, WarningError>;

/// Unified error type for study validation, ingestion and marker queries.
#[derive(Debug, Error)]
pub enum WarningError {
    /// Start after end, dates outside the dataset, or too little history
    /// for the requested window size.
    #[error("date out of range: {0}")]
    DateOutRange(String),

    /// Fewer than two countries, unknown countries, a cohort mismatch for
    /// dynamic adjacency, or a path endpoint outside the configured set.
    #[error("country undefined: {0}")]
    CountryUndefined(String),

    /// A flight-frequency matrix needed by the dynamic adjacency is absent.
    #[error("missing flight data: {0}")]
    MissingFlightData(String),

    /// Population needed by the risk score is absent.
    #[error("missing population: {0}")]
    MissingPopulation(String),

    /// Malformed case or population table.
    #[error("invalid dataset: {0}")]
    InvalidDataset(String),

    /// Out-of-domain numeric parameter.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("worker pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl WarningError {
    pub(crate) fn date_out_range(msg: impl Into<String>) -> Self {
        Self::DateOutRange(msg.into())
    }

    pub(crate) fn country_undefined(msg: impl Into<String>) -> Self {
        Self::CountryUndefined(msg.into())
    }

    pub(crate) fn invalid_dataset(msg: impl Into<String>) -> Self {
        Self::InvalidDataset(msg.into())
    }

    pub(crate) fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// True for the two domain kinds callers are expected to treat as fatal.
    pub fn is_domain_error(&self) -> bool {
        matches!(self, Self::DateOutRange(_) | Self::CountryUndefined(_))
    }
}
