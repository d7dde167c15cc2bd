use axum::{
    Router,
    extract::{Path, State},
    http::{HeaderValue, Request, StatusCode},
    middleware::{Next, from_fn},
    response::Json,
    routing::{get, post},
};
use flix_core::{FilterSelection, FormEvent, GenerationProvider, Recommender, RigProvider, UiEvent};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{Instrument, Span, error, info, warn};
use uuid::Uuid;

use crate::config::ServiceConfig;
use crate::models::{
    CatalogResponse, RecommendationRequest, RecommendationResponse, SessionResponse,
};
use crate::sessions::{SessionError, SessionStore};

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<Value>)>;
type ApiError = (StatusCode, Json<Value>);

fn bad_request_error(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

fn not_found_error(message: &str, id: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": message,
            "session_id": id
        })),
    )
}

fn internal_error(message: &str) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": message })),
    )
}

fn conflict_error(message: &str) -> ApiError {
    (StatusCode::CONFLICT, Json(json!({ "error": message })))
}

fn session_error(session_id: &str, err: SessionError) -> ApiError {
    use flix_core::StateError;

    match err {
        SessionError::NotFound(_) => not_found_error("Session not found", session_id),
        SessionError::State(StateError::Busy) => conflict_error(&StateError::Busy.to_string()),
        SessionError::State(other) => bad_request_error(&other.to_string()),
    }
}

#[derive(Clone)]
pub struct AppState {
    pub recommender: Recommender,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(provider: Arc<dyn GenerationProvider>) -> Self {
        Self {
            recommender: Recommender::new(provider),
            sessions: SessionStore::new(),
        }
    }
}

pub fn create_app(config: &ServiceConfig) -> Router {
    if !config.llm.has_credentials() {
        warn!(
            "{} is not set; every request will return the fallback recommendation",
            config.llm.provider.key_env()
        );
    }
    let provider: Arc<dyn GenerationProvider> = Arc::new(RigProvider::new(config.llm.clone()));
    let state = AppState::new(provider);
    state.sessions.spawn_reaper(config.session_ttl);
    build_router(state)
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/catalog", get(catalog))
        .route("/recommend", post(recommend))
        .route("/sessions", post(create_session))
        .route(
            "/sessions/{session_id}",
            get(get_session).delete(delete_session),
        )
        .route("/sessions/{session_id}/events", post(apply_event))
        .route("/sessions/{session_id}/submit", post(submit_session))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(from_fn(correlation_id_middleware)),
        )
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

/// Tags every request with a correlation ID and runs it inside a span carrying it
async fn correlation_id_middleware(
    mut request: Request<axum::body::Body>,
    next: Next,
) -> axum::response::Response {
    let correlation_id = Uuid::new_v4().to_string();
    if let Ok(value) = HeaderValue::from_str(&correlation_id) {
        request.headers_mut().insert("x-correlation-id", value);
    }

    let span = tracing::info_span!("http_request", correlation_id = %correlation_id);
    next.run(request).instrument(span).await
}

async fn root() -> Json<Value> {
    Json(json!({
        "service": "Flix.AI Movie Recommendation Service",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Movie recommendations by genre and language, generated by an LLM",
        "endpoints": {
            "GET /catalog": "List selectable genres and languages",
            "POST /recommend": "One-shot recommendation for { genres, language }",
            "POST /sessions": "Start a new form session",
            "GET /sessions/{session_id}": "Get the current form state",
            "POST /sessions/{session_id}/events": "Apply a form event",
            "POST /sessions/{session_id}/submit": "Submit the form and wait for results",
            "DELETE /sessions/{session_id}": "Discard a form session",
            "GET /health": "Health check"
        }
    }))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn catalog() -> Json<CatalogResponse> {
    Json(CatalogResponse::build())
}

async fn recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendationRequest>,
) -> ApiResult<RecommendationResponse> {
    info!(
        genres = ?request.genres,
        language = %request.language,
        "Received recommendation request"
    );

    let selection = FilterSelection::parse(request.genres.as_slice(), &request.language)
        .map_err(|e| bad_request_error(&e.to_string()))?;

    let outcome = state.recommender.recommend(&selection).await;
    if let Some(err) = outcome.error() {
        error!(error = %err, "Serving fallback recommendation");
    }

    Ok(Json(outcome.into()))
}

async fn create_session(State(state): State<AppState>) -> ApiResult<SessionResponse> {
    let (session_id, form) = state.sessions.create();
    info!(session_id = %session_id, "Form session created");
    Ok(Json(SessionResponse::new(session_id, form)))
}

async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<SessionResponse> {
    match state.sessions.get(&session_id) {
        Some(form) => Ok(Json(SessionResponse::new(session_id, form))),
        None => Err(not_found_error("Session not found", &session_id)),
    }
}

async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Value> {
    if state.sessions.delete(&session_id) {
        info!(session_id = %session_id, "Form session discarded");
        Ok(Json(json!({ "session_id": session_id, "status": "deleted" })))
    } else {
        Err(not_found_error("Session not found", &session_id))
    }
}

async fn apply_event(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(event): Json<UiEvent>,
) -> ApiResult<SessionResponse> {
    let form = state
        .sessions
        .apply(&session_id, event)
        .map_err(|e| session_error(&session_id, e))?;
    Ok(Json(SessionResponse::new(session_id, form)))
}

async fn submit_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<SessionResponse> {
    let loading = state
        .sessions
        .apply(&session_id, FormEvent::Submit)
        .map_err(|e| session_error(&session_id, e))?;

    let Some(selection) = loading.selection() else {
        return Err(bad_request_error(&flix_core::StateError::NotReady.to_string()));
    };

    info!(session_id = %session_id, "Form submitted");

    // Runs detached so the outcome still lands (and the busy flag clears)
    // when the caller disconnects mid-request
    let task_state = state.clone();
    let task_session = session_id.clone();
    let request = tokio::spawn(
        async move {
            let outcome = task_state.recommender.recommend(&selection).await;
            task_state
                .sessions
                .apply(&task_session, FormEvent::ReceiveOutcome(outcome))
        }
        .instrument(Span::current()),
    );

    let form = request
        .await
        .map_err(|e| {
            error!(session_id = %session_id, error = %e, "Recommendation task failed");
            internal_error("Recommendation task failed")
        })?
        .map_err(|e| session_error(&session_id, e))?;

    Ok(Json(SessionResponse::new(session_id, form)))
}
