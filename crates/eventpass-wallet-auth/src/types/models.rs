/*
[INPUT]:  Wallet connections, backend challenges, exchange responses
[OUTPUT]: Typed Rust structs for the wallet auth handshake
[POS]:    Data layer - type definitions for wallet auth
[UPDATE]: When the handshake payloads or profile schema change
*/

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{ProviderKind, UserRole};
use crate::auth::AuthError;

/// Minimum length of a display name accepted by `register`
pub const MIN_DISPLAY_NAME_CHARS: usize = 2;

/// An active connection to a wallet provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletSession {
    pub provider_kind: ProviderKind,
    pub address: String,
    pub connected: bool,
}

/// Server-issued challenge, consumed by exactly one signature request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthChallenge {
    pub message: String,
    pub nonce: String,
    pub issued_at_unix_seconds: i64,
}

impl AuthChallenge {
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.issued_at_unix_seconds, 0).single()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedChallenge {
    pub signature: String,
    pub message: String,
    pub nonce: String,
    pub issued_at_unix_seconds: i64,
    /// Exact text the wallet signed, when the provider reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub address: String,
    #[serde(default, alias = "name")]
    pub display_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default, alias = "isVerified")]
    pub verified: bool,
    #[serde(default, alias = "isEmailVerified")]
    pub email_verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

impl UserProfile {
    pub fn is_well_formed(&self) -> bool {
        !self.address.trim().is_empty()
    }
}

/// Authenticated session returned by login/register
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: UserProfile,
}

/// Profile fields collected for `register`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInput {
    pub display_name: String,
    pub email: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_description: Option<String>,
}

impl ProfileInput {
    pub fn new(display_name: impl Into<String>, email: impl Into<String>, role: UserRole) -> Self {
        Self {
            display_name: display_name.into(),
            email: email.into(),
            role,
            organization_name: None,
            organization_description: None,
        }
    }

    pub fn with_organization(
        mut self,
        name: impl Into<String>,
        description: Option<String>,
    ) -> Self {
        self.organization_name = Some(name.into());
        self.organization_description = description;
        self
    }

    /// Local checks run before any backend call
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.display_name.trim().chars().count() < MIN_DISPLAY_NAME_CHARS {
            return Err(AuthError::ValidationError {
                field: "displayName",
                message: format!("must be at least {MIN_DISPLAY_NAME_CHARS} characters"),
            });
        }
        if !self.email.contains('@') {
            return Err(AuthError::ValidationError {
                field: "email",
                message: "must contain '@'".to_string(),
            });
        }
        Ok(())
    }
}

/// Compare two Aptos addresses, ignoring case and an optional `0x` prefix.
pub fn addresses_match(left: &str, right: &str) -> bool {
    fn normalize(address: &str) -> String {
        let address = address.trim();
        address
            .strip_prefix("0x")
            .or_else(|| address.strip_prefix("0X"))
            .unwrap_or(address)
            .to_ascii_lowercase()
    }

    !left.trim().is_empty() && normalize(left) == normalize(right)
}
