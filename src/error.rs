//! Error handling for the match scorer

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MatchScorerError {
    /// Malformed input record. The only error the engine itself surfaces.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Taxonomy error: {0}")]
    Taxonomy(String),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML decode error: {0}")]
    TomlDecode(#[from] toml::de::Error),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Batch worker failed: {0}")]
    Worker(String),

    #[error("Output formatting error: {0}")]
    OutputFormatting(String),
}

pub type Result<T> = std::result::Result<T, MatchScorerError>;

/// Convert anyhow errors to our custom error type
impl From<anyhow::Error> for MatchScorerError {
    fn from(err: anyhow::Error) -> Self {
        MatchScorerError::InvalidInput(format!("{:#}", err))
    }
}

impl From<tokio::task::JoinError> for MatchScorerError {
    fn from(err: tokio::task::JoinError) -> Self {
        MatchScorerError::Worker(err.to_string())
    }
}

impl MatchScorerError {
    pub fn is_validation(&self) -> bool {
        matches!(self, MatchScorerError::Validation(_))
    }
}
