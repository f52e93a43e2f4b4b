//! User-facing failure text.
//!
//! Every failure a user can hit maps to one fixed sentence here, except
//! server-side validation failures which are expanded per field.

use serde_json::Value;

pub const NETWORK_UNREACHABLE: &str =
    "Could not connect to the server. Please check your internet connection and try again.";
pub const TIMED_OUT: &str =
    "The request took too long. Your internet connection might be slow or unstable.";
pub const SESSION_EXPIRED: &str = "Your session has expired. Please login again.";
pub const UNDECODABLE_RESPONSE: &str = "Failed to process server response";
pub const INVALID_LOGIN: &str = "Invalid login credentials";
pub const LOGIN_FIELDS_REQUIRED: &str = "Please enter both email and password";
pub const NOT_LOGGED_IN: &str = "Authentication required. Please login again.";
pub const STAGED_STEP_MISSING: &str = "Session data is missing. Please start over.";

/// The fixed message for a failing HTTP status.
pub fn status_message(status: u16) -> String {
    match status {
        400 => "Invalid request. Please check your input and try again.".to_string(),
        401 => SESSION_EXPIRED.to_string(),
        403 => "You do not have permission to perform this action.".to_string(),
        404 => "The requested resource was not found.".to_string(),
        500 => "A server error occurred. Please try again later.".to_string(),
        502..=504 => "The server is currently unavailable. Please try again later.".to_string(),
        other => format!("An error occurred ({other}). Please try again."),
    }
}

/// Render one validation code for `field` as a sentence.
pub fn field_error_sentence(field: &str, code: &str) -> String {
    match code {
        "validation.unique" => format!("{field} is already in use"),
        "validation.required" => format!("{field} is required"),
        "validation.string" => format!("{field} must be a valid string"),
        other => format!("{field}: {other}"),
    }
}

/// Expand a `{"errors": {"<field>": ["<code>", ...]}}` body into sentences,
/// one per line. Returns `None` if the body carries no field errors.
pub fn expand_field_errors(body: &Value) -> Option<String> {
    let errors = body.get("errors")?.as_object()?;
    let mut lines = Vec::new();
    for (field, codes) in errors {
        match codes {
            Value::Array(items) => lines.extend(
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(|code| field_error_sentence(field, code)),
            ),
            Value::String(code) => lines.push(field_error_sentence(field, code)),
            _ => {}
        }
    }
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

fn top_level_message(body: &Value) -> Option<String> {
    ["message", "error"]
        .iter()
        .find_map(|k| body.get(*k).and_then(Value::as_str))
        .filter(|m| !m.trim().is_empty())
        .map(str::to_string)
}

/// Message for a failing response: field errors, then a top-level
/// `message`/`error`, then the status-class text.
pub fn describe_failure(status: u16, body: &Value) -> String {
    expand_field_errors(body)
        .or_else(|| top_level_message(body))
        .unwrap_or_else(|| status_message(status))
}

/// True when the body explicitly says the credential is no longer valid.
pub fn is_unauthenticated(body: &Value) -> bool {
    top_level_message(body)
        .map(|m| m.to_ascii_lowercase().starts_with("unauthenticated"))
        .unwrap_or(false)
}

/// "Missing required fields: a, b".
pub fn missing_fields_message(fields: &[String]) -> String {
    format!("Missing required fields: {}", fields.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unique_email_sentence() {
        let body = json!({"errors": {"email": ["validation.unique"]}});
        assert_eq!(describe_failure(422, &body), "email is already in use");
    }

    #[test]
    fn multiple_codes_expand_line_by_line() {
        let body = json!({
            "message": "The given data was invalid.",
            "errors": {
                "nin": ["validation.required", "validation.string"],
                "phone_number": ["validation.digits"]
            }
        });
        assert_eq!(
            describe_failure(422, &body),
            "nin is required\nnin must be a valid string\nphone_number: validation.digits"
        );
    }

    #[test]
    fn message_beats_status_text() {
        let body = json!({"message": "Owner already registered"});
        assert_eq!(describe_failure(409, &body), "Owner already registered");
        assert_eq!(describe_failure(500, &json!({"error": "boom"})), "boom");
    }

    #[test]
    fn status_text_fallback() {
        assert_eq!(
            describe_failure(503, &json!({})),
            "The server is currently unavailable. Please try again later."
        );
        assert_eq!(describe_failure(418, &json!({})), "An error occurred (418). Please try again.");
        assert_ne!(status_message(400), status_message(403));
        assert_ne!(status_message(404), status_message(500));
    }

    #[test]
    fn empty_errors_object_falls_through() {
        let body = json!({"errors": {}, "message": "nope"});
        assert_eq!(describe_failure(422, &body), "nope");
    }

    #[test]
    fn unauthenticated_signal() {
        assert!(is_unauthenticated(&json!({"message": "Unauthenticated."})));
        assert!(!is_unauthenticated(&json!({"message": "Saved"})));
        assert!(!is_unauthenticated(&json!({})));
    }

    #[test]
    fn missing_fields_are_enumerated() {
        let fields = vec!["lga".to_string(), "nin".to_string()];
        assert_eq!(missing_fields_message(&fields), "Missing required fields: lga, nin");
    }
}
