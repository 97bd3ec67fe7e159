use std::collections::BTreeMap;
use std::convert::Infallible;
use thiserror::Error;

use crate::SessionStore;
use crate::session::GameSession;

/// Outcome of a failed lookup by session name.
#[derive(Debug, Error)]
pub enum SessionLookupError<E>
where
    E: std::error::Error + 'static,
{
    #[error("session '{0}' not found")]
    NotFound(String),
    #[error("session store failed: {0}")]
    Store(#[source] E),
}

impl<E> SessionLookupError<E>
where
    E: std::error::Error + 'static,
{
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Look up one session, separating "not found" from store failures.
///
/// # Errors
///
/// Returns [`SessionLookupError::NotFound`] when the store has no session
/// with that name and [`SessionLookupError::Store`] when the store fails.
pub fn fetch_session<S>(store: &S, name: &str) -> Result<GameSession, SessionLookupError<S::Error>>
where
    S: SessionStore + ?Sized,
{
    store
        .find_session(name)
        .map_err(SessionLookupError::Store)?
        .ok_or_else(|| SessionLookupError::NotFound(name.to_string()))
}

/// In-memory store keyed by session name. Later inserts replace earlier ones.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    sessions: BTreeMap<String, GameSession>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, session: GameSession) -> Option<GameSession> {
        self.sessions.insert(session.session_name.clone(), session)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl FromIterator<GameSession> for MemorySessionStore {
    fn from_iter<T: IntoIterator<Item = GameSession>>(iter: T) -> Self {
        let mut store = Self::new();
        for session in iter {
            store.insert(session);
        }
        store
    }
}

impl SessionStore for MemorySessionStore {
    type Error = Infallible;

    fn list_sessions(&self) -> Result<Vec<GameSession>, Self::Error> {
        Ok(self.sessions.values().cloned().collect())
    }

    fn find_session(&self, name: &str) -> Result<Option<GameSession>, Self::Error> {
        Ok(self.sessions.get(name).cloned())
    }
}
