use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// A required series or record is absent or empty. Fatal for the request.
    #[error("Missing data: {0}")]
    MissingData(String),

    /// An indicator's look-back window is unmet. Soft: the indicator reports unavailable.
    #[error("Insufficient history for {indicator}: need {required} points, have {available}")]
    InsufficientHistory {
        indicator: &'static str,
        required: usize,
        available: usize,
    },

    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Arithmetic edge case inside composite scoring. Soft: yields a degraded result.
    #[error("Computation error: {0}")]
    Computation(String),

    #[error("Provider error: {0}")]
    Provider(String),
}

impl AnalysisError {
    /// Errors the caller must see; everything else is absorbed by the scorer.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            AnalysisError::MissingData(_) | AnalysisError::InvalidData(_) | AnalysisError::Provider(_)
        )
    }
}
