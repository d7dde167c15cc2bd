use dashmap::DashMap;
use flix_core::{FormEvent, FormState, StateError};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    State(#[from] StateError),
}

struct Session {
    form: FormState,
    touched: Instant,
}

impl Session {
    fn new(form: FormState) -> Self {
        Self {
            form,
            touched: Instant::now(),
        }
    }
}

/// In-memory form sessions, one `FormState` per browser form.
/// Nothing outlives the process; idle sessions are dropped by
/// [`SessionStore::prune_idle`].
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<DashMap<String, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self) -> (String, FormState) {
        let session_id = Uuid::new_v4().to_string();
        let form = FormState::new();
        self.sessions
            .insert(session_id.clone(), Session::new(form.clone()));
        (session_id, form)
    }

    pub fn get(&self, session_id: &str) -> Option<FormState> {
        self.sessions.get(session_id).map(|entry| entry.form.clone())
    }

    /// Applies an event while holding the entry lock, so two submits on the
    /// same session cannot both observe an idle form.
    pub fn apply(
        &self,
        session_id: &str,
        event: impl Into<FormEvent>,
    ) -> Result<FormState, SessionError> {
        let mut entry = self
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))?;
        let next = entry.form.clone().apply(event)?;
        *entry = Session::new(next.clone());
        Ok(next)
    }

    pub fn delete(&self, session_id: &str) -> bool {
        self.sessions.remove(session_id).is_some()
    }

    /// Drops sessions untouched for longer than `max_idle`.
    /// A session with a request in flight is kept.
    pub fn prune_idle(&self, max_idle: Duration) -> usize {
        let before = self.len();
        self.sessions
            .retain(|_, session| session.form.loading || session.touched.elapsed() <= max_idle);
        before.saturating_sub(self.len())
    }

    /// Prunes idle sessions in the background for as long as the runtime lives
    pub fn spawn_reaper(&self, max_idle: Duration) -> JoinHandle<()> {
        let store = self.clone();
        let period = (max_idle / 2).max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let pruned = store.prune_idle(max_idle);
                if pruned > 0 {
                    debug!(pruned, remaining = store.len(), "Pruned idle form sessions");
                }
            }
        })
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
