//! Read-only view of the signed-in agent, as persisted by the login screen.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::UserId;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to read session file '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("malformed session data: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("session has no auth token; sign in again")]
    MissingToken,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    token: String,
    #[serde(rename = "_id")]
    user_id: UserId,
    #[serde(default)]
    name: String,
    #[serde(rename = "userType", default)]
    user_type: String,
}

impl SessionContext {
    pub fn new(
        token: impl Into<String>,
        user_id: impl Into<UserId>,
        name: impl Into<String>,
        user_type: impl Into<String>,
    ) -> Self {
        Self {
            token: token.into(),
            user_id: user_id.into(),
            name: name.into(),
            user_type: user_type.into(),
        }
    }

    pub fn from_json(raw: &str) -> Result<Self, SessionError> {
        let session: Self = serde_json::from_str(raw)?;
        if session.token.trim().is_empty() {
            return Err(SessionError::MissingToken);
        }
        Ok(session)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SessionError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| SessionError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn user_type(&self) -> &str {
        &self.user_type
    }

    /// Header title; name and user type are joined without a separator.
    pub fn greeting(&self) -> String {
        format!("Hi, {}{}", self.name, self.user_type)
    }
}

// Keeps the token out of logs.
impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("user_id", &self.user_id)
            .field("name", &self.name)
            .field("user_type", &self.user_type)
            .finish_non_exhaustive()
    }
}
