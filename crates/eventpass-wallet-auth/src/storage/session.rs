/*
[INPUT]:  Validated sessions and refreshed profiles
[OUTPUT]: Persisted token + cached profile under fixed keys
[POS]:    Storage layer - session persistence for silent restoration
[UPDATE]: When persisted keys or the cached profile format change
*/

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::warn;

use super::kv::{KeyValueStore, KvWrite, StoreError};
use crate::types::{Session, UserProfile};

pub const TOKEN_KEY: &str = "eventpass.auth_token";
pub const USER_KEY: &str = "eventpass.user";
pub const SAVED_AT_KEY: &str = "eventpass.saved_at";

/// Reads and writes the persisted session
#[derive(Debug, Clone)]
pub struct SessionStore {
    kv: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Persist token and profile in one batch
    pub fn save(&self, session: &Session) -> Result<(), StoreError> {
        let user = serde_json::to_string(&session.user)?;
        self.kv.apply(&[
            KvWrite::Put(TOKEN_KEY.to_string(), session.token.clone()),
            KvWrite::Put(USER_KEY.to_string(), user),
            KvWrite::Put(SAVED_AT_KEY.to_string(), Utc::now().to_rfc3339()),
        ])
    }

    /// Load the persisted session
    ///
    /// Returns `None` when either key is missing or the cached profile no
    /// longer parses.
    pub fn load(&self) -> Result<Option<Session>, StoreError> {
        let Some(token) = self.kv.get(TOKEN_KEY)?.filter(|t| !t.trim().is_empty()) else {
            return Ok(None);
        };
        let Some(user) = self.kv.get(USER_KEY)? else {
            return Ok(None);
        };

        match serde_json::from_str::<UserProfile>(&user) {
            Ok(user) if user.is_well_formed() => Ok(Some(Session { token, user })),
            Ok(_) => {
                warn!("cached user profile has no address; ignoring persisted session");
                Ok(None)
            }
            Err(err) => {
                warn!(error = %err, "cached user profile is unreadable; ignoring persisted session");
                Ok(None)
            }
        }
    }

    pub fn token(&self) -> Result<Option<String>, StoreError> {
        self.kv.get(TOKEN_KEY)
    }

    pub fn saved_at(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        Ok(self
            .kv
            .get(SAVED_AT_KEY)?
            .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
            .map(|at| at.with_timezone(&Utc)))
    }

    /// Replace the cached profile, keeping the token
    pub fn update_user(&self, user: &UserProfile) -> Result<(), StoreError> {
        let user = serde_json::to_string(user)?;
        self.kv.apply(&[KvWrite::Put(USER_KEY.to_string(), user)])
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        self.kv.apply(&[
            KvWrite::Delete(TOKEN_KEY.to_string()),
            KvWrite::Delete(USER_KEY.to_string()),
            KvWrite::Delete(SAVED_AT_KEY.to_string()),
        ])
    }
}
