use crate::core::errors::ApiError;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Normalize a raw backend response into its canonical payload.
///
/// The backends this client talks to disagree on their wire shape: one
/// returns the payload directly, the other wraps it in
/// `{success, message, data, timestamp}`. Detection is structural (an
/// object carrying a boolean `success` and a `message` key is treated as
/// the envelope) so a single client binary serves either convention
/// without a build-time switch. This is a compatibility contract: a bare
/// payload that happens to carry both sentinel keys would be unwrapped.
///
/// The HTTP status is checked before the body is inspected; a non-2xx
/// response fails with the status preserved regardless of what the body
/// contains.
pub fn normalize(raw_body: &str, http_status: u16) -> Result<Value, ApiError> {
    if !(200..300).contains(&http_status) {
        return Err(ApiError::StatusError {
            status: http_status,
            message: raw_body.trim().to_string(),
        });
    }

    if raw_body.trim().is_empty() {
        return Ok(Value::Null);
    }

    let value: Value = serde_json::from_str(raw_body)?;
    unwrap_envelope(value)
}

/// Unwrap an already-parsed response value.
///
/// Enveloped with `success: true` yields the `data` field (null when the
/// envelope carries none); `success: false` fails with the backend's
/// message; anything else is a bare payload and passes through unchanged.
pub fn unwrap_envelope(value: Value) -> Result<Value, ApiError> {
    match value {
        Value::Object(mut fields) if is_envelope(&fields) => {
            let success = fields
                .get("success")
                .and_then(Value::as_bool)
                .unwrap_or(false);

            if success {
                Ok(fields.remove("data").unwrap_or(Value::Null))
            } else {
                let message = fields
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("operation failed")
                    .to_string();
                Err(ApiError::EnvelopeError(message))
            }
        }
        other => Ok(other),
    }
}

/// Deserialize a canonical value into a concrete response type.
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(ApiError::JsonError)
}

fn is_envelope(fields: &serde_json::Map<String, Value>) -> bool {
    matches!(fields.get("success"), Some(Value::Bool(_))) && fields.contains_key("message")
}
