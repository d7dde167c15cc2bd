pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod models;
pub mod prompt;
pub mod recommender;
pub mod state;

// Re-export commonly used types
pub use catalog::{Genre, Language};
pub use client::{GenerationClient, GenerationProvider, RigProvider};
pub use config::{LlmConfig, LlmProvider};
pub use error::{RecommendationError, Result, StateError};
pub use extract::extract;
pub use models::{FilterSelection, MovieRecord, RequestOutcome};
pub use prompt::build_prompt;
pub use recommender::{MAX_ATTEMPTS, Recommender};
pub use state::{FormEvent, FormState, UiEvent};
