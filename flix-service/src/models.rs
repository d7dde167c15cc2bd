use flix_core::{FormState, Genre, Language, MovieRecord, RequestOutcome};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendationRequest {
    pub genres: Vec<String>,
    pub language: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub status: String,
    pub movies: Vec<MovieRecord>,
    pub error: Option<String>,
}

impl From<RequestOutcome> for RecommendationResponse {
    fn from(outcome: RequestOutcome) -> Self {
        match outcome {
            RequestOutcome::Success { movies } => Self {
                status: "completed".to_string(),
                movies,
                error: None,
            },
            RequestOutcome::Failure { error, fallback } => Self {
                status: "fallback".to_string(),
                movies: vec![fallback],
                error: Some(error),
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CatalogResponse {
    pub genres: Vec<CatalogEntry>,
    pub languages: Vec<CatalogEntry>,
}

impl CatalogResponse {
    pub fn build() -> Self {
        Self {
            genres: Genre::ALL
                .iter()
                .map(|g| CatalogEntry {
                    id: g.id().to_string(),
                    name: g.name().to_string(),
                })
                .collect(),
            languages: Language::ALL
                .iter()
                .map(|l| CatalogEntry {
                    id: l.code().to_string(),
                    name: l.name().to_string(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub can_submit: bool,
    pub state: FormState,
}

impl SessionResponse {
    pub fn new(session_id: impl Into<String>, state: FormState) -> Self {
        Self {
            session_id: session_id.into(),
            can_submit: state.can_submit(),
            state,
        }
    }
}
