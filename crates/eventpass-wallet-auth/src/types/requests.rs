/*
[INPUT]:  Signed challenges and registration profile input
[OUTPUT]: Request bodies for the auth backend
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When backend request schema changes
*/

use serde::{Deserialize, Serialize};

use super::enums::UserRole;
use super::models::{ProfileInput, SignedChallenge};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonceRequest {
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub address: String,
    pub signature: String,
    pub message: String,
    pub nonce: String,
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_message: Option<String>,
}

impl LoginRequest {
    pub fn new(address: &str, signed: &SignedChallenge) -> Self {
        Self {
            address: address.to_string(),
            signature: signed.signature.clone(),
            message: signed.message.clone(),
            nonce: signed.nonce.clone(),
            timestamp: signed.issued_at_unix_seconds,
            public_key: signed.public_key.clone(),
            full_message: signed.full_message.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(flatten)]
    pub credentials: LoginRequest,
    pub role: UserRole,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_description: Option<String>,
}

impl RegisterRequest {
    pub fn new(address: &str, signed: &SignedChallenge, profile: &ProfileInput) -> Self {
        Self {
            credentials: LoginRequest::new(address, signed),
            role: profile.role,
            name: profile.display_name.trim().to_string(),
            email: profile.email.trim().to_string(),
            organization_name: profile.organization_name.clone(),
            organization_description: profile.organization_description.clone(),
        }
    }
}
