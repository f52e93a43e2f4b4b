//! Response interpretation.
//!
//! Order: take the raw text, decode it (an empty body decodes to `{}`),
//! then classify. Authentication expiry is checked before the decode result
//! so that a 401 always tears the session down, whatever its body.

use ranch_forms::message::{describe_failure, is_unauthenticated};
use serde_json::Value;

use crate::transport::RawResponse;
use crate::ApiError;

pub fn decode_body(text: &str) -> Result<Value, ApiError> {
    if text.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_str(text).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Turn a raw response into its decoded body or the failure it represents.
pub fn interpret(raw: &RawResponse) -> Result<Value, ApiError> {
    let decoded = decode_body(&raw.body);

    if raw.status == 401 {
        return Err(ApiError::AuthExpired);
    }
    let body = decoded?;
    if is_unauthenticated(&body) {
        return Err(ApiError::AuthExpired);
    }
    if !raw.is_success() {
        return Err(ApiError::Rejected {
            status: raw.status,
            message: describe_failure(raw.status, &body),
        });
    }
    Ok(body)
}
