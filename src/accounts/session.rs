//! Session resolution
//!
//! Sign-in is handled by an external authentication provider. The service
//! only needs to turn a bearer token into the user id it belongs to.

use crate::error::{Result, VoteError};
use crate::types::UserId;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::{debug, warn};

/// Trait for session token resolution
#[async_trait]
pub trait SessionAuthenticator: Send + Sync {
    /// Resolve a bearer token to its user, or `None` for an unknown token
    async fn resolve_user(&self, token: &str) -> Result<Option<UserId>>;

    /// Resolve a token that must be valid
    async fn require_user(&self, token: &str) -> Result<UserId> {
        self.resolve_user(token)
            .await?
            .ok_or_else(|| VoteError::Unauthorized {
                reason: "unknown or expired session".to_string(),
            })
    }
}

/// Authenticator backed by a fixed token table
#[derive(Debug, Default)]
pub struct StaticSessionAuthenticator {
    sessions: RwLock<HashMap<String, UserId>>,
}

impl StaticSessionAuthenticator {
    pub fn new(sessions: HashMap<String, UserId>) -> Self {
        Self {
            sessions: RwLock::new(sessions),
        }
    }

    /// Register a token for a user
    pub fn insert(&self, token: impl Into<String>, user_id: UserId) -> Result<()> {
        self.sessions
            .write()
            .map_err(|_| VoteError::Unavailable {
                message: "session table lock poisoned".to_string(),
            })?
            .insert(token.into(), user_id);
        Ok(())
    }

    /// Drop a token, returning whether it existed
    pub fn revoke(&self, token: &str) -> Result<bool> {
        let removed = self
            .sessions
            .write()
            .map_err(|_| VoteError::Unavailable {
                message: "session table lock poisoned".to_string(),
            })?
            .remove(token);
        Ok(removed.is_some())
    }

    pub fn len(&self) -> usize {
        self.sessions.read().map(|sessions| sessions.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SessionAuthenticator for StaticSessionAuthenticator {
    async fn resolve_user(&self, token: &str) -> Result<Option<UserId>> {
        let sessions = self.sessions.read().map_err(|_| VoteError::Unavailable {
            message: "session table lock poisoned".to_string(),
        })?;

        match sessions.get(token) {
            Some(user_id) => {
                debug!("Session resolved to user {}", user_id);
                Ok(Some(*user_id))
            }
            None => {
                warn!("Rejected unknown session token");
                Ok(None)
            }
        }
    }
}
