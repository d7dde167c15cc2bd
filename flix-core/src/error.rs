use thiserror::Error;

/// Errors raised while obtaining recommendations from the generation service
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecommendationError {
    /// Credential missing or the LLM client could not be built
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The outbound generation call failed (network, quota, auth)
    #[error("Generation request failed: {0}")]
    Transport(String),

    /// No JSON object could be parsed out of the response text.
    /// `raw` keeps the untouched response for diagnostics.
    #[error("Failed to parse movie recommendations: {message}")]
    MalformedJson { message: String, raw: String },

    /// Parsed JSON lacks a `movies` list
    #[error("Failed to parse movie recommendations: {0}")]
    UnexpectedShape(String),
}

/// Rejected input or state transitions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("At least one genre must be selected")]
    EmptyGenres,

    #[error("Unknown genre: {0}")]
    UnknownGenre(String),

    #[error("Unknown language: {0}")]
    UnknownLanguage(String),

    #[error("Select at least one genre and a language before submitting")]
    NotReady,

    #[error("A recommendation request is already in progress")]
    Busy,
}

pub type Result<T> = std::result::Result<T, RecommendationError>;
