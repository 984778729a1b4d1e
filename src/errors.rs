use thiserror::Error;

#[derive(Debug, Error)]
pub enum BersError {
    #[error("Request was considered invalid due to error: {0}")]
    InvalidRequest(#[from] anyhow::Error),
    #[error("Error identified during BERS estimation: {0}")]
    FailureInEstimation(#[from] EstimationError),
    #[error("Error during result postprocessing: {0}")]
    ErrorInPostprocessing(PostprocessingError),
}

/// Failures raised by the estimation engine.
///
/// Every failure aborts the whole estimation; no partial result is ever produced.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum EstimationError {
    /// Missing or invalid building configuration, detected before any computation.
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// A coefficient or benchmark lookup produced no row, or an empty/NaN cell.
    #[error("Data error: {0}")]
    Data(String),
    /// An operation was requested in a way the building model does not allow.
    #[error("Usage error: {0}")]
    Usage(String),
}

impl EstimationError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub(crate) fn data(message: impl Into<String>) -> Self {
        Self::Data(message.into())
    }

    pub(crate) fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    pub fn is_data(&self) -> bool {
        matches!(self, Self::Data(_))
    }

    pub fn is_usage(&self) -> bool {
        matches!(self, Self::Usage(_))
    }
}

#[derive(Debug, Error)]
#[error(transparent)]
pub struct PostprocessingError {
    error: anyhow::Error,
}

impl PostprocessingError {
    pub fn new(error: anyhow::Error) -> Self {
        Self { error }
    }
}
