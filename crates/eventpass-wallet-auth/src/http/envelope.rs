/*
[INPUT]:  Raw backend JSON bodies, wrapped or unwrapped
[OUTPUT]: One canonical flat JSON object per response
[POS]:    HTTP layer - response normalization applied to every backend body
[UPDATE]: When the backend changes its envelope format
*/

use serde_json::{Map, Value};

use crate::http::{BackendError, Result};

/// Flatten `{success, data: {...}}` envelopes into a single object.
///
/// When `data` is an object, top-level `message` and `error` are status text
/// and are dropped; other top-level fields are kept, and fields inside `data`
/// win on conflicts. `success: false` becomes an error. Bodies that are not
/// envelopes pass through unchanged.
pub fn normalize_response(body: Value) -> Result<Value> {
    let Value::Object(mut outer) = body else {
        return Ok(body);
    };

    let has_data_object = matches!(outer.get("data"), Some(Value::Object(_)));
    if !outer.contains_key("success") && !has_data_object {
        return Ok(Value::Object(outer));
    }

    if outer.get("success").and_then(Value::as_bool) == Some(false) {
        let message = error_message(&outer)
            .unwrap_or_else(|| "backend reported success=false".to_string());
        return Err(BackendError::Unsuccessful { message });
    }

    outer.remove("success");
    match outer.remove("data") {
        Some(Value::Object(inner)) => {
            outer.remove("message");
            outer.remove("error");
            outer.extend(inner);
        }
        Some(Value::Null) | None => {}
        Some(other) => {
            outer.insert("data".to_string(), other);
        }
    }

    Ok(Value::Object(outer))
}

/// Human-readable error text from a backend body, if any.
pub fn error_message(object: &Map<String, Value>) -> Option<String> {
    let text = match object.get("error") {
        Some(Value::String(s)) => Some(s.as_str()),
        Some(Value::Object(inner)) => inner.get("message").and_then(Value::as_str),
        _ => None,
    };
    text.or_else(|| object.get("message").and_then(Value::as_str))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unwrapped_body_passes_through() {
        let body = json!({"message": "m", "nonce": "n", "timestamp": 1});
        assert_eq!(normalize_response(body.clone()).unwrap(), body);
    }

    #[test]
    fn test_wrapped_body_is_flattened() {
        let body = json!({
            "success": true,
            "data": {"message": "m", "nonce": "n", "timestamp": 1},
        });
        assert_eq!(
            normalize_response(body).unwrap(),
            json!({"message": "m", "nonce": "n", "timestamp": 1})
        );
    }

    #[test]
    fn test_split_fields_are_merged_with_data_winning() {
        let body = json!({
            "success": true,
            "message": "Nonce generated",
            "timestamp": 5,
            "data": {"message": "Sign this", "nonce": "n"},
        });
        assert_eq!(
            normalize_response(body).unwrap(),
            json!({"message": "Sign this", "nonce": "n", "timestamp": 5})
        );
    }

    #[test]
    fn test_status_text_is_not_lifted_into_data() {
        let body = json!({
            "success": true,
            "message": "Nonce generated successfully",
            "error": null,
            "data": {"nonce": "n", "timestamp": 5},
        });
        assert_eq!(
            normalize_response(body).unwrap(),
            json!({"nonce": "n", "timestamp": 5})
        );
    }

    #[test]
    fn test_top_level_message_kept_without_data_object() {
        let body = json!({"success": true, "message": "m", "nonce": "n"});
        assert_eq!(
            normalize_response(body).unwrap(),
            json!({"message": "m", "nonce": "n"})
        );
    }

    #[test]
    fn test_success_false_becomes_error() {
        let body = json!({"success": false, "error": "Address not registered"});
        match normalize_response(body).unwrap_err() {
            BackendError::Unsuccessful { message } => {
                assert_eq!(message, "Address not registered");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_object_data_is_kept() {
        let body = json!({"success": true, "data": [1, 2]});
        assert_eq!(normalize_response(body).unwrap(), json!({"data": [1, 2]}));
    }

    #[test]
    fn test_error_message_prefers_error_field() {
        let body = json!({"message": "generic", "error": {"message": "specific"}});
        assert_eq!(
            error_message(body.as_object().unwrap()).as_deref(),
            Some("specific")
        );
    }
}
