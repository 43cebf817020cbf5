//! Session persistence

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::User;
use crate::error::Error;

/// Session data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// The mock token handed out at login
    #[serde(rename = "auth_token")]
    pub token: String,

    /// The logged in user
    #[serde(rename = "auth_user")]
    pub user: User,
}

impl Session {
    pub fn new(token: &str, user: User) -> Self {
        Self {
            token: token.to_string(),
            user,
        }
    }
}

/// Where a session survives between runs
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// The stored session, if any
    async fn load(&self) -> Result<Option<Session>, Error>;

    async fn save(&self, session: &Session) -> Result<(), Error>;

    async fn clear(&self) -> Result<(), Error>;
}

/// Keeps the session as a JSON document on disk
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> Result<Option<Session>, Error> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        // A damaged file is treated as a logged out state.
        match serde_json::from_str::<Session>(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring unreadable session file");
                Ok(None)
            }
        }
    }

    async fn save(&self, session: &Session) -> Result<(), Error> {
        let body = serde_json::to_string_pretty(session)?;
        tokio::fs::write(&self.path, body).await?;
        debug!(path = %self.path.display(), "session saved");
        Ok(())
    }

    async fn clear(&self) -> Result<(), Error> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process store, used by tests and one-shot sessions
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    session: Arc<Mutex<Option<Session>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> Result<Option<Session>, Error> {
        Ok(self.session.lock().await.clone())
    }

    async fn save(&self, session: &Session) -> Result<(), Error> {
        *self.session.lock().await = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), Error> {
        *self.session.lock().await = None;
        Ok(())
    }
}
