//! Durable session storage, the stand-in for the browser's local storage.
//! Best-effort by design: a corrupt or unwritable file degrades to a fresh
//! anonymous session, never an error the user sees.

use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::models::User;

/// Env var overriding where the session file lives.
pub const SESSION_FILE_ENV: &str = "OUTLAY_SESSION_FILE";

const DEFAULT_SESSION_FILE: &str = ".outlay-session.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSession {
    pub user: User,
    pub token: String,
}

pub trait SessionStorage {
    fn load(&self) -> Option<PersistedSession>;
    fn save(&self, session: &PersistedSession);
    fn clear(&self);
}

/// JSON file on disk.
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path from `OUTLAY_SESSION_FILE`, defaulting to the working directory.
    pub fn from_env() -> Self {
        let path = env::var(SESSION_FILE_ENV).unwrap_or_else(|_| DEFAULT_SESSION_FILE.to_string());
        Self::new(path)
    }
}

impl SessionStorage for FileStorage {
    fn load(&self) -> Option<PersistedSession> {
        let raw = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(err) => {
                warn!("discarding unreadable session file {:?}: {}", self.path, err);
                None
            }
        }
    }

    fn save(&self, session: &PersistedSession) {
        let json = match serde_json::to_string_pretty(session) {
            Ok(json) => json,
            Err(err) => {
                warn!("failed to serialize session: {}", err);
                return;
            }
        };
        if let Err(err) = fs::write(&self.path, json) {
            warn!("failed to persist session to {:?}: {}", self.path, err);
        }
    }

    fn clear(&self) {
        if let Err(err) = fs::remove_file(&self.path) {
            if err.kind() != std::io::ErrorKind::NotFound {
                warn!("failed to remove session file {:?}: {}", self.path, err);
            }
        }
    }
}

/// In-memory storage, for tests and embedders that manage persistence
/// themselves.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    session: Mutex<Option<PersistedSession>>,
}

impl SessionStorage for MemoryStorage {
    fn load(&self) -> Option<PersistedSession> {
        self.session.lock().unwrap().clone()
    }

    fn save(&self, session: &PersistedSession) {
        *self.session.lock().unwrap() = Some(session.clone());
    }

    fn clear(&self) {
        *self.session.lock().unwrap() = None;
    }
}

impl<S: SessionStorage> SessionStorage for std::sync::Arc<S> {
    fn load(&self) -> Option<PersistedSession> {
        (**self).load()
    }

    fn save(&self, session: &PersistedSession) {
        (**self).save(session)
    }

    fn clear(&self) {
        (**self).clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRole;
    use uuid::Uuid;

    fn sample_session() -> PersistedSession {
        PersistedSession {
            user: User {
                id: Uuid::new_v4(),
                email: "jane@example.com".into(),
                first_name: "Jane".into(),
                last_name: "Doe".into(),
                role: UserRole::Employee,
                is_active: true,
                created_at: None,
            },
            token: "token-abc".into(),
        }
    }

    #[test]
    fn test_file_storage_round_trip() {
        let path = std::env::temp_dir().join(format!("outlay-session-{}.json", Uuid::new_v4()));
        let storage = FileStorage::new(&path);
        assert!(storage.load().is_none());

        let session = sample_session();
        storage.save(&session);
        assert_eq!(storage.load(), Some(session));

        storage.clear();
        assert!(storage.load().is_none());
        // clearing twice is a no-op
        storage.clear();
    }

    #[test]
    fn test_file_storage_discards_corrupt_file() {
        let path = std::env::temp_dir().join(format!("outlay-session-{}.json", Uuid::new_v4()));
        fs::write(&path, "{not json").unwrap();
        let storage = FileStorage::new(&path);
        assert!(storage.load().is_none());
        storage.clear();
    }

    #[test]
    fn test_memory_storage_round_trip() {
        let storage = MemoryStorage::default();
        let session = sample_session();
        storage.save(&session);
        assert_eq!(storage.load(), Some(session));
        storage.clear();
        assert!(storage.load().is_none());
    }
}
