//! Immutable form state and the events that move it forward.
//!
//! A presentation layer holds the latest [`FormState`], feeds user
//! interaction in as [`FormEvent`]s and re-renders from whatever comes back.
//! `loading` doubles as the busy flag that keeps a second submit out while a
//! request is in flight.

use serde::{Deserialize, Serialize};

use crate::catalog::{Genre, Language};
use crate::error::StateError;
use crate::models::{FilterSelection, MovieRecord, RequestOutcome};

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FormState {
    pub selected_genres: Vec<Genre>,
    pub selected_language: Option<Language>,
    pub genre_dropdown_open: bool,
    pub language_dropdown_open: bool,
    pub loading: bool,
    pub error: Option<String>,
    pub movies: Vec<MovieRecord>,
    /// Set when a request finished with something to show
    pub scroll_to_results: bool,
}

/// Interaction coming from the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum UiEvent {
    ToggleGenreDropdown,
    ToggleLanguageDropdown,
    ToggleGenre(Genre),
    SelectLanguage(Language),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormEvent {
    Ui(UiEvent),
    Submit,
    ReceiveOutcome(RequestOutcome),
}

impl From<UiEvent> for FormEvent {
    fn from(event: UiEvent) -> Self {
        FormEvent::Ui(event)
    }
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Both filters are chosen and nothing is in flight
    pub fn can_submit(&self) -> bool {
        !self.selected_genres.is_empty() && self.selected_language.is_some() && !self.loading
    }

    /// Selection to send for the current filters, if complete
    pub fn selection(&self) -> Option<FilterSelection> {
        let language = self.selected_language?;
        FilterSelection::new(self.selected_genres.iter().copied(), language).ok()
    }

    pub fn apply(self, event: impl Into<FormEvent>) -> Result<FormState, StateError> {
        match event.into() {
            FormEvent::Ui(ui) => Ok(self.apply_ui(ui)),
            FormEvent::Submit => self.submit(),
            FormEvent::ReceiveOutcome(outcome) => Ok(self.receive(outcome)),
        }
    }

    fn apply_ui(self, event: UiEvent) -> FormState {
        match event {
            UiEvent::ToggleGenreDropdown => FormState {
                genre_dropdown_open: !self.genre_dropdown_open,
                ..self
            },
            UiEvent::ToggleLanguageDropdown => FormState {
                language_dropdown_open: !self.language_dropdown_open,
                ..self
            },
            UiEvent::ToggleGenre(genre) => {
                let mut selected_genres = self.selected_genres.clone();
                match selected_genres.iter().position(|g| *g == genre) {
                    Some(index) => {
                        selected_genres.remove(index);
                    }
                    None => selected_genres.push(genre),
                }
                FormState {
                    selected_genres,
                    ..self
                }
            }
            UiEvent::SelectLanguage(language) => FormState {
                selected_language: Some(language),
                language_dropdown_open: false,
                ..self
            },
        }
    }

    fn submit(self) -> Result<FormState, StateError> {
        if self.loading {
            return Err(StateError::Busy);
        }
        if self.selection().is_none() {
            return Err(StateError::NotReady);
        }
        Ok(FormState {
            loading: true,
            error: None,
            movies: Vec::new(),
            scroll_to_results: false,
            ..self
        })
    }

    fn receive(self, outcome: RequestOutcome) -> FormState {
        let (movies, error) = match outcome {
            RequestOutcome::Success { movies } => (movies, None),
            RequestOutcome::Failure { error, fallback } => (vec![fallback], Some(error)),
        };
        FormState {
            loading: false,
            scroll_to_results: !movies.is_empty(),
            movies,
            error,
            ..self
        }
    }
}
