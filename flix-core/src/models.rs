use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;

use crate::catalog::{Genre, Language};
use crate::error::StateError;

pub const FALLBACK_TITLE: &str = "Recommended Movie";
pub const FALLBACK_SYNOPSIS: &str = "Sorry, we could not generate recommendations right now.";

/// A single recommended movie as produced by the model.
///
/// The record keeps the model's JSON exactly as it arrived and serializes back
/// to it unchanged, unknown fields and odd value types included. The typed
/// accessors read fields leniently for rendering and never fail.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovieRecord(Value);

impl MovieRecord {
    /// Placeholder shown when no recommendation could be obtained
    pub fn fallback(release_year: i32) -> Self {
        Self(json!({
            "title": FALLBACK_TITLE,
            "synopsis": FALLBACK_SYNOPSIS,
            "director": "-",
            "mainCast": ["-"],
            "rating": 0.0,
            "releaseYear": release_year,
        }))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    fn field(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    fn text(&self, key: &str) -> Option<&str> {
        self.field(key).and_then(Value::as_str)
    }

    pub fn title(&self) -> Option<&str> {
        self.text("title")
    }

    pub fn synopsis(&self) -> Option<&str> {
        self.text("synopsis")
    }

    pub fn director(&self) -> Option<&str> {
        self.text("director")
    }

    pub fn additional_details(&self) -> Option<&str> {
        self.text("additionalDetails")
    }

    /// Cast names; a single string counts as a one-name cast and non-string
    /// entries are rendered as their JSON text
    pub fn main_cast(&self) -> Option<Vec<String>> {
        match self.field("mainCast")? {
            Value::Array(names) => Some(
                names
                    .iter()
                    .map(|name| match name {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect(),
            ),
            Value::String(name) => Some(vec![name.clone()]),
            _ => None,
        }
    }

    /// Numeric rating; numbers sent as strings are accepted
    pub fn rating(&self) -> Option<f64> {
        match self.field("rating")? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Release year; integral floats and numeric strings are accepted
    pub fn release_year(&self) -> Option<i32> {
        let year = match self.field("releaseYear")? {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|y| y.fract() == 0.0).map(|y| y as i64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }?;
        i32::try_from(year).ok()
    }

    /// Names of the required fields absent from this record
    pub fn missing_fields(&self) -> Vec<&'static str> {
        ["title", "synopsis", "director", "mainCast", "rating", "releaseYear"]
            .into_iter()
            .filter(|key| self.field(key).is_none())
            .collect()
    }
}

impl From<Value> for MovieRecord {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl fmt::Display for MovieRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title().unwrap_or("?"))?;
        writeln!(f, "  {}", self.synopsis().unwrap_or("?"))?;
        writeln!(f, "  Director: {}", self.director().unwrap_or("?"))?;
        let cast = self
            .main_cast()
            .map(|names| names.join(", "))
            .unwrap_or_else(|| "?".to_string());
        writeln!(f, "  Cast: {}", cast)?;
        match self.rating() {
            Some(rating) => writeln!(f, "  Rating: {} / 10", rating)?,
            None => match self.field("rating") {
                Some(raw) => writeln!(f, "  Rating: {}", raw)?,
                None => writeln!(f, "  Rating: ? / 10")?,
            },
        }
        match self.release_year() {
            Some(year) => write!(f, "  Year: {}", year)?,
            None => write!(f, "  Year: ?")?,
        }
        if let Some(details) = self.additional_details() {
            write!(f, "\n  \"{}\"", details)?;
        }
        Ok(())
    }
}

/// Genres and language chosen by the user for one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterSelection {
    genres: Vec<Genre>,
    language: Language,
}

impl FilterSelection {
    /// Builds a selection, dropping duplicate genres while keeping the order
    /// they were picked in. An empty genre list is rejected.
    pub fn new(
        genres: impl IntoIterator<Item = Genre>,
        language: Language,
    ) -> Result<Self, StateError> {
        let mut unique = Vec::new();
        for genre in genres {
            if !unique.contains(&genre) {
                unique.push(genre);
            }
        }
        if unique.is_empty() {
            return Err(StateError::EmptyGenres);
        }
        Ok(Self {
            genres: unique,
            language,
        })
    }

    /// Parses raw identifiers as received from a client
    pub fn parse<S: AsRef<str>>(genre_ids: &[S], language_code: &str) -> Result<Self, StateError> {
        let genres = genre_ids
            .iter()
            .map(|id| id.as_ref().parse::<Genre>())
            .collect::<Result<Vec<_>, _>>()?;
        let language = language_code.parse::<Language>()?;
        Self::new(genres, language)
    }

    pub fn genres(&self) -> &[Genre] {
        &self.genres
    }

    pub fn language(&self) -> Language {
        self.language
    }
}

/// Result of one recommendation request.
/// A failure always carries exactly the single fallback record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RequestOutcome {
    Success { movies: Vec<MovieRecord> },
    Failure { error: String, fallback: MovieRecord },
}

impl RequestOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RequestOutcome::Success { .. })
    }

    pub fn movies(&self) -> &[MovieRecord] {
        match self {
            RequestOutcome::Success { movies } => movies,
            RequestOutcome::Failure { fallback, .. } => std::slice::from_ref(fallback),
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            RequestOutcome::Success { .. } => None,
            RequestOutcome::Failure { error, .. } => Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_accessors_read_all_fields() {
        let record = MovieRecord::from(json!({
            "title": "Heat",
            "synopsis": "A heist goes wrong.",
            "director": "Michael Mann",
            "mainCast": ["Al Pacino", "Robert De Niro", "Val Kilmer"],
            "rating": 8.3,
            "releaseYear": 1995,
            "additionalDetails": "Famous diner scene."
        }));

        assert_eq!(record.title(), Some("Heat"));
        assert_eq!(record.main_cast().map(|cast| cast.len()), Some(3));
        assert_eq!(record.rating(), Some(8.3));
        assert_eq!(record.release_year(), Some(1995));
        assert!(record.missing_fields().is_empty());
    }

    #[test]
    fn test_accessors_are_lenient() {
        let record = MovieRecord::from(json!({
            "title": "Oldboy",
            "rating": "8.4",
            "releaseYear": "2003",
            "mainCast": "Choi Min-sik"
        }));
        assert_eq!(record.rating(), Some(8.4));
        assert_eq!(record.release_year(), Some(2003));
        assert_eq!(record.main_cast(), Some(vec!["Choi Min-sik".to_string()]));
        assert_eq!(record.missing_fields(), vec!["synopsis", "director"]);

        let float_year = MovieRecord::from(json!({ "releaseYear": 2023.0 }));
        assert_eq!(float_year.release_year(), Some(2023));

        let not_an_object = MovieRecord::from(json!(42));
        assert_eq!(not_an_object.title(), None);
        assert_eq!(not_an_object.missing_fields().len(), 6);
    }

    #[test]
    fn test_odd_record_serializes_back_unchanged() {
        let raw = json!({
            "title": "X",
            "releaseYear": 2023.0,
            "rating": "8.5/10",
            "mainCast": ["A", 7],
            "runtime": "120m"
        });
        let record: MovieRecord = serde_json::from_value(raw.clone()).unwrap();

        assert_eq!(serde_json::to_value(&record).unwrap(), raw);
        assert_eq!(record.rating(), None);
        assert!(!record.missing_fields().contains(&"rating"));
        assert_eq!(
            record.main_cast(),
            Some(vec!["A".to_string(), "7".to_string()])
        );
    }

    #[test]
    fn test_fallback_serializes_with_camel_case_names() {
        let value = serde_json::to_value(MovieRecord::fallback(2026)).unwrap();
        assert_eq!(value["mainCast"], json!(["-"]));
        assert_eq!(value["releaseYear"], json!(2026));
        assert!(value.get("additionalDetails").is_none());
    }

    #[test]
    fn test_selection_dedupes_and_keeps_order() {
        let selection = FilterSelection::new(
            [Genre::Drama, Genre::Action, Genre::Drama],
            Language::French,
        )
        .unwrap();
        assert_eq!(selection.genres(), &[Genre::Drama, Genre::Action]);
    }

    #[test]
    fn test_selection_rejects_empty_and_unknown() {
        assert_eq!(
            FilterSelection::new(Vec::new(), Language::English),
            Err(StateError::EmptyGenres)
        );
        assert_eq!(
            FilterSelection::parse(&["action", "nope"], "en"),
            Err(StateError::UnknownGenre("nope".to_string()))
        );
    }

    #[test]
    fn test_failure_outcome_exposes_single_fallback() {
        let outcome = RequestOutcome::Failure {
            error: "boom".to_string(),
            fallback: MovieRecord::fallback(2026),
        };
        assert_eq!(outcome.movies().len(), 1);
        assert_eq!(outcome.error(), Some("boom"));
        assert!(!outcome.is_success());
    }
}
