/*
[INPUT]:  Wallet kinds, backend role names, handshake phases
[OUTPUT]: Typed Rust enums with serialization support
[POS]:    Data layer - type definitions for wallet auth
[UPDATE]: When a wallet kind, role, or auth state is added
*/

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Supported Aptos wallet providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Petra,
    Martian,
    Pontem,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 3] = [ProviderKind::Petra, ProviderKind::Martian, ProviderKind::Pontem];

    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::Petra => "petra",
            ProviderKind::Martian => "martian",
            ProviderKind::Pontem => "pontem",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "petra" => Ok(ProviderKind::Petra),
            "martian" => Ok(ProviderKind::Martian),
            "pontem" => Ok(ProviderKind::Pontem),
            other => Err(format!("unknown wallet provider '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Attendee,
    Organizer,
    Admin,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Attendee => "attendee",
            UserRole::Organizer => "organizer",
            UserRole::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "attendee" => Ok(UserRole::Attendee),
            "organizer" => Ok(UserRole::Organizer),
            "admin" => Ok(UserRole::Admin),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// Handshake phase of a single orchestrator
///
/// `Authenticating` is only held while a challenge/sign/exchange round trip
/// is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthState {
    #[default]
    Disconnected,
    WalletConnected,
    Authenticating,
    Authenticated,
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AuthState::Disconnected => "disconnected",
            AuthState::WalletConnected => "wallet connected",
            AuthState::Authenticating => "authenticating",
            AuthState::Authenticated => "authenticated",
        };
        f.write_str(label)
    }
}
