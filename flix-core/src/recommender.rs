use chrono::Datelike;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::client::GenerationProvider;
use crate::error::{RecommendationError, Result};
use crate::extract::extract;
use crate::models::{FilterSelection, MovieRecord, RequestOutcome};
use crate::prompt::build_prompt;

/// Total number of generation attempts per request
pub const MAX_ATTEMPTS: u32 = 3;

/// Turns a filter selection into recommendations, retrying failed attempts and
/// degrading to the fallback record when every attempt fails.
#[derive(Clone)]
pub struct Recommender {
    provider: Arc<dyn GenerationProvider>,
    max_attempts: u32,
}

impl Recommender {
    pub fn new(provider: Arc<dyn GenerationProvider>) -> Self {
        Self {
            provider,
            max_attempts: MAX_ATTEMPTS,
        }
    }

    /// Overrides the attempt bound; at least one attempt is always made
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Never fails: every error ends up as a fallback outcome
    pub async fn recommend(&self, selection: &FilterSelection) -> RequestOutcome {
        let prompt = build_prompt(selection);
        let mut last_error = None;

        for attempt in 1..=self.max_attempts {
            info!(
                "Requesting recommendations (attempt {} of {})",
                attempt, self.max_attempts
            );

            match self.attempt(&prompt).await {
                Ok(movies) => {
                    info!(count = movies.len(), attempt, "Recommendations parsed");
                    for (index, movie) in movies.iter().enumerate() {
                        let missing = movie.missing_fields();
                        if !missing.is_empty() {
                            warn!(index, ?missing, "Recommended movie is missing fields");
                        }
                    }
                    return RequestOutcome::Success { movies };
                }
                Err(e) => {
                    error!(attempt, error = %e, "Error generating movie recommendations");
                    // Credentials do not appear between attempts
                    let give_up = matches!(e, RecommendationError::Configuration(_));
                    last_error = Some(e);
                    if give_up {
                        break;
                    }
                }
            }
        }

        let error = last_error
            .map(|e| format!("An error occurred: {}", e))
            .unwrap_or_else(|| "An error occurred: no attempt was made".to_string());

        RequestOutcome::Failure {
            error,
            fallback: MovieRecord::fallback(chrono::Local::now().year()),
        }
    }

    async fn attempt(&self, prompt: &str) -> Result<Vec<MovieRecord>> {
        let client = self.provider.client()?;
        let raw = client.generate(prompt).await?;
        extract(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Genre, Language};
    use crate::client::GenerationClient;
    use crate::models::FALLBACK_TITLE;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Replays scripted responses and records every prompt it receives
    #[derive(Default)]
    struct ScriptedClient {
        responses: Mutex<VecDeque<Result<String>>>,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl GenerationClient for ScriptedClient {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(RecommendationError::Transport("script exhausted".into())))
        }
    }

    struct ScriptedProvider {
        client: Arc<ScriptedClient>,
        configured: bool,
        builds: AtomicUsize,
    }

    impl ScriptedProvider {
        fn new(responses: Vec<Result<String>>) -> Arc<Self> {
            let client = ScriptedClient {
                responses: Mutex::new(responses.into()),
                ..Default::default()
            };
            Arc::new(Self {
                client: Arc::new(client),
                configured: true,
                builds: AtomicUsize::new(0),
            })
        }

        fn unconfigured() -> Arc<Self> {
            Arc::new(Self {
                client: Arc::new(ScriptedClient::default()),
                configured: false,
                builds: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.client.prompts.lock().unwrap().len()
        }
    }

    impl GenerationProvider for ScriptedProvider {
        fn client(&self) -> Result<Arc<dyn GenerationClient>> {
            self.builds.fetch_add(1, Ordering::SeqCst);
            if !self.configured {
                return Err(RecommendationError::Configuration(
                    "API key is not configured".to_string(),
                ));
            }
            Ok(self.client.clone())
        }
    }

    fn five_movies() -> serde_json::Value {
        let movies: Vec<_> = (1..=5)
            .map(|i| {
                json!({
                    "title": format!("Film {i}"),
                    "synopsis": "Synopsis",
                    "director": "Director",
                    "mainCast": ["One", "Two", "Three"],
                    "rating": 8.0,
                    "releaseYear": 2010 + i
                })
            })
            .collect();
        json!({ "movies": movies })
    }

    fn action_comedy() -> FilterSelection {
        FilterSelection::new([Genre::Action, Genre::Comedy], Language::English).unwrap()
    }

    fn assert_fallback(outcome: &RequestOutcome) {
        let movies = outcome.movies();
        assert!(!outcome.is_success());
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].title(), Some(FALLBACK_TITLE));
        assert_eq!(movies[0].director(), Some("-"));
        assert_eq!(movies[0].main_cast(), Some(vec!["-".to_string()]));
        assert_eq!(movies[0].rating(), Some(0.0));
        assert_eq!(movies[0].release_year(), Some(chrono::Local::now().year()));
        assert!(outcome.error().is_some_and(|e| !e.is_empty()));
    }

    #[tokio::test]
    async fn test_successful_response_returns_all_movies() {
        let provider = ScriptedProvider::new(vec![Ok(five_movies().to_string())]);
        let recommender = Recommender::new(provider.clone());

        let outcome = recommender.recommend(&action_comedy()).await;

        assert!(outcome.is_success());
        let titles: Vec<_> = outcome
            .movies()
            .iter()
            .map(|m| m.title().unwrap())
            .collect();
        assert_eq!(titles, vec!["Film 1", "Film 2", "Film 3", "Film 4", "Film 5"]);

        let prompts = provider.client.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("action, comedy"));
        assert!(prompts[0].contains("English"));
    }

    #[tokio::test]
    async fn test_prose_wrapped_empty_list_is_not_a_fallback() {
        let raw = "Sure! Here's your list: ```json\n{\"movies\":[]}\n```";
        let provider = ScriptedProvider::new(vec![Ok(raw.to_string())]);

        let outcome = Recommender::new(provider).recommend(&action_comedy()).await;

        assert_eq!(outcome, RequestOutcome::Success { movies: vec![] });
    }

    #[tokio::test]
    async fn test_transport_errors_exhaust_attempts_then_fall_back() {
        let provider = ScriptedProvider::new(vec![
            Err(RecommendationError::Transport("quota exceeded".into())),
            Err(RecommendationError::Transport("quota exceeded".into())),
            Err(RecommendationError::Transport("quota exceeded".into())),
        ]);

        let outcome = Recommender::new(provider.clone())
            .recommend(&action_comedy())
            .await;

        assert_fallback(&outcome);
        assert_eq!(provider.calls(), MAX_ATTEMPTS as usize);
        assert!(outcome.error().unwrap().contains("quota exceeded"));
    }

    #[tokio::test]
    async fn test_failure_then_success_recovers() {
        let provider = ScriptedProvider::new(vec![
            Ok("I cannot answer that".to_string()),
            Ok(r#"{"films": []}"#.to_string()),
            Ok(five_movies().to_string()),
        ]);

        let outcome = Recommender::new(provider.clone())
            .recommend(&action_comedy())
            .await;

        assert!(outcome.is_success());
        assert_eq!(outcome.movies().len(), 5);
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test]
    async fn test_missing_credentials_never_call_transport() {
        let provider = ScriptedProvider::unconfigured();

        let outcome = Recommender::new(provider.clone())
            .recommend(&action_comedy())
            .await;

        assert_fallback(&outcome);
        assert_eq!(provider.calls(), 0);
        assert_eq!(provider.builds.load(Ordering::SeqCst), 1);
        assert!(outcome.error().unwrap().contains("Configuration error"));
    }

    #[tokio::test]
    async fn test_custom_attempt_bound() {
        let provider = ScriptedProvider::new(vec![]);

        let recommender = Recommender::new(provider.clone()).with_max_attempts(0);
        assert_eq!(recommender.max_attempts(), 1);

        let outcome = recommender.recommend(&action_comedy()).await;
        assert_fallback(&outcome);
        assert_eq!(provider.calls(), 1);
    }
}
