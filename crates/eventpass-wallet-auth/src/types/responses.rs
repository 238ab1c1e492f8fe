/*
[INPUT]:  Normalized backend JSON bodies
[OUTPUT]: AuthChallenge, Session and UserProfile values
[POS]:    Data layer - typed extraction of backend responses
[UPDATE]: When backend response schema changes
*/

use serde_json::{Map, Value};

use super::models::{AuthChallenge, Session, UserProfile};
use crate::http::{BackendError, Result};

const TIMESTAMP_FIELDS: [&str; 3] = ["timestamp", "issuedAt", "issuedAtUnixSeconds"];
const TOKEN_FIELDS: [&str; 2] = ["token", "accessToken"];
const MILLIS_THRESHOLD: i64 = 1_000_000_000_000;

/// Extract a challenge from a normalized nonce response.
pub fn parse_challenge(body: &Value) -> Result<AuthChallenge> {
    let object = as_object(body, "nonce response")?;

    let message = non_empty_string(object.get("message"))
        .ok_or_else(|| missing("message"))?;
    let nonce = scalar_string(object.get("nonce")).ok_or_else(|| missing("nonce"))?;
    let issued_at_unix_seconds = TIMESTAMP_FIELDS
        .iter()
        .find_map(|field| unix_seconds(object.get(*field)))
        .ok_or_else(|| missing("timestamp"))?;

    Ok(AuthChallenge {
        message,
        nonce,
        issued_at_unix_seconds,
    })
}

/// Extract a session from a normalized login/register response.
///
/// Both a non-empty token and a well-formed user profile are required.
pub fn parse_exchange(body: &Value) -> Result<Session> {
    let object = as_object(body, "exchange response")?;

    let token = TOKEN_FIELDS
        .iter()
        .find_map(|field| non_empty_string(object.get(*field)))
        .ok_or_else(|| missing("token"))?;
    let user = object.get("user").ok_or_else(|| missing("user"))?;
    let user = profile_from_value(user)?;

    Ok(Session { token, user })
}

/// Extract a profile from a normalized profile response, `{user: {...}}` or bare.
pub fn parse_profile(body: &Value) -> Result<UserProfile> {
    let object = as_object(body, "profile response")?;
    match object.get("user") {
        Some(user) => profile_from_value(user),
        None => profile_from_value(body),
    }
}

fn profile_from_value(value: &Value) -> Result<UserProfile> {
    let profile: UserProfile = serde_json::from_value(value.clone())
        .map_err(|e| BackendError::InvalidResponse(format!("malformed user profile: {e}")))?;
    if !profile.is_well_formed() {
        return Err(BackendError::InvalidResponse(
            "user profile has no address".to_string(),
        ));
    }
    Ok(profile)
}

fn as_object<'a>(body: &'a Value, what: &str) -> Result<&'a Map<String, Value>> {
    body.as_object()
        .ok_or_else(|| BackendError::InvalidResponse(format!("{what} is not a JSON object")))
}

fn missing(field: &str) -> BackendError {
    BackendError::InvalidResponse(format!("missing '{field}'"))
}

fn non_empty_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn scalar_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Number(n) => Some(n.to_string()),
        other => non_empty_string(Some(other)),
    }
}

fn unix_seconds(value: Option<&Value>) -> Option<i64> {
    let raw = match value? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?,
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))?
        }
        _ => return None,
    };
    if raw >= MILLIS_THRESHOLD {
        Some(raw / 1000)
    } else {
        Some(raw)
    }
}
