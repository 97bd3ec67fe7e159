use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use deterrence_core::{GameSession, SessionStore};

/// Either payload shape the session API returns.
#[derive(Deserialize)]
#[serde(untagged)]
enum SessionExport {
    List(Vec<serde_json::Value>),
    Single(Box<GameSession>),
}

#[derive(Debug, Error)]
pub enum JsonStoreError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{} is not a session export: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Session store over exported JSON files.
///
/// Each file holds either the session list or a single session. Files are
/// read on every call; when a name appears twice the later file wins.
/// Records in a list that are not sessions are skipped with a warning.
#[derive(Debug, Clone, Default)]
pub struct JsonFileStore {
    paths: Vec<PathBuf>,
}

impl JsonFileStore {
    #[must_use]
    pub const fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }

    fn read_file(path: &Path) -> Result<Vec<GameSession>, JsonStoreError> {
        let raw = fs::read_to_string(path).map_err(|source| JsonStoreError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let export = serde_json::from_str(&raw).map_err(|source| JsonStoreError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let sessions = match export {
            SessionExport::List(records) => records
                .into_iter()
                .enumerate()
                .filter_map(|(index, record)| match GameSession::deserialize(record) {
                    Ok(session) => Some(session),
                    Err(err) => {
                        log::warn!("skipping record {index} in {}: {err}", path.display());
                        None
                    }
                })
                .collect(),
            SessionExport::Single(session) => vec![*session],
        };
        log::debug!("loaded {} session(s) from {}", sessions.len(), path.display());
        Ok(sessions)
    }
}

impl SessionStore for JsonFileStore {
    type Error = JsonStoreError;

    fn list_sessions(&self) -> Result<Vec<GameSession>, Self::Error> {
        let mut sessions: Vec<GameSession> = Vec::new();
        for path in &self.paths {
            for session in Self::read_file(path)? {
                if let Some(existing) = sessions
                    .iter_mut()
                    .find(|known| known.session_name == session.session_name)
                {
                    log::debug!(
                        "session '{}' from {} replaces an earlier copy",
                        session.session_name,
                        path.display()
                    );
                    *existing = session;
                } else {
                    sessions.push(session);
                }
            }
        }
        Ok(sessions)
    }

    fn find_session(&self, name: &str) -> Result<Option<GameSession>, Self::Error> {
        Ok(self
            .list_sessions()?
            .into_iter()
            .find(|session| session.session_name == name))
    }
}
