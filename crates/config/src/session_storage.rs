//! Persisted session: bearer token and serialized user
//!
//! Stored as a small JSON object with `token` and `user` keys. A session is
//! only considered present when both keys are.

use crate::persistence::{read_optional, remove_if_exists, write_atomic};
use crate::{ConfigError, ConfigResult};
use nestegg_core::User;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<User>,
}

/// Key/value storage for the signed-in session (`session.json`)
#[derive(Debug, Clone)]
pub struct SessionStorage {
    path: PathBuf,
}

impl SessionStorage {
    /// Creates a handle for the session file at `path`
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> ConfigResult<StoredSession> {
        match read_optional(&self.path)? {
            None => Ok(StoredSession::default()),
            Some(raw) => serde_json::from_str(&raw).map_err(|e| ConfigError::StorageError {
                path: self.path.clone(),
                source: e,
            }),
        }
    }

    fn write(&self, session: &StoredSession) -> ConfigResult<()> {
        let raw = serde_json::to_string(session).map_err(|e| ConfigError::StorageError {
            path: self.path.clone(),
            source: e,
        })?;
        write_atomic(&self.path, &raw)
    }

    /// Returns the stored bearer token, if any
    pub fn token(&self) -> ConfigResult<Option<String>> {
        Ok(self.read()?.token)
    }

    /// Returns the stored user, if any
    pub fn user(&self) -> ConfigResult<Option<User>> {
        Ok(self.read()?.user)
    }

    /// Returns the stored user and token when both are present
    ///
    /// A corrupted file is logged and treated as no session.
    pub fn restore(&self) -> Option<(User, String)> {
        match self.read() {
            Ok(StoredSession {
                token: Some(token),
                user: Some(user),
            }) => Some((user, token)),
            Ok(_) => None,
            Err(e) => {
                log::warn!("Ignoring unreadable session: {}", e);
                None
            }
        }
    }

    /// Stores a new session
    pub fn save(&self, user: &User, token: &str) -> ConfigResult<()> {
        self.write(&StoredSession {
            token: Some(token.to_string()),
            user: Some(user.clone()),
        })
    }

    /// Replaces the stored user, keeping the token
    pub fn save_user(&self, user: &User) -> ConfigResult<()> {
        let mut session = self.read().unwrap_or_default();
        session.user = Some(user.clone());
        self.write(&session)
    }

    /// Removes token and user
    pub fn clear(&self) -> ConfigResult<()> {
        remove_if_exists(&self.path)?;
        log::debug!("Session cleared at {}", self.path.display());
        Ok(())
    }
}
