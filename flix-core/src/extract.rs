//! Best-effort extraction of the `{"movies": [...]}` payload from free-form
//! model output.
//!
//! The model is asked for bare JSON but routinely wraps it in prose or
//! markdown fences, so the text is narrowed to the outermost `{ ... }` span
//! before parsing. Only the presence of a `movies` array is checked; the
//! records themselves are handed back exactly as the model wrote them.

use serde_json::Value;
use tracing::{debug, error};

use crate::error::{RecommendationError, Result};
use crate::models::MovieRecord;

const FENCE_OPEN: &str = "```json";
const FENCE_CLOSE: &str = "```";

/// Narrows raw output down to the candidate JSON text
fn clean_response(raw: &str) -> &str {
    // Drop everything before the first `{` and after the last `}`
    let text = match raw.find('{') {
        Some(start) => &raw[start..],
        None => "",
    };
    let text = match text.rfind('}') {
        Some(end) => &text[..=end],
        None => "",
    };

    let text = match text.strip_prefix(FENCE_OPEN) {
        Some(rest) => rest.trim_start(),
        None => text,
    };
    let text = match text.trim_end().strip_suffix(FENCE_CLOSE) {
        Some(rest) => rest,
        None => text,
    };

    text.trim()
}

/// Parses the movie list out of a raw generation response
pub fn extract(raw: &str) -> Result<Vec<MovieRecord>> {
    let cleaned = clean_response(raw);
    debug!(cleaned_len = cleaned.len(), "Cleaned generation response");

    let mut parsed: Value = serde_json::from_str(cleaned).map_err(|e| {
        error!(error = %e, raw = %raw, "Could not parse JSON from generation response");
        RecommendationError::MalformedJson {
            message: e.to_string(),
            raw: raw.to_string(),
        }
    })?;

    let movies = match parsed.get_mut("movies").map(Value::take) {
        Some(Value::Array(movies)) => movies,
        _ => {
            error!(raw = %raw, "Generation response has no movies list");
            return Err(RecommendationError::UnexpectedShape(
                "Invalid JSON structure".to_string(),
            ));
        }
    };

    Ok(movies.into_iter().map(MovieRecord::from).collect())
}
