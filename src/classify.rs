//! Classification of HTTP outcomes into [`WeblateError`] kinds.
//!
//! Every status in 100..=599 and the "no response" case map to exactly one
//! kind. Success (2xx) maps to no error.

use reqwest::StatusCode;
use serde_json::Value;

use crate::error::{FieldMessage, WeblateError};

/// A finished HTTP exchange, as seen by the classifier.
#[derive(Debug, Clone, Copy)]
pub struct Reply<'a> {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: &'a [u8],
    /// The requested URL, kept for error messages.
    pub url: &'a str,
    /// Number of attempts made, including the first one.
    pub attempts: u32,
}

/// Statuses for which a structured body is read as field-level messages.
const VALIDATION_STATUSES: [u16; 3] = [400, 409, 422];

/// Classify a finished exchange. Returns `None` for 2xx.
pub fn classify(reply: &Reply<'_>) -> Option<WeblateError> {
    let status = reply.status;
    match status {
        200..=299 => None,
        401 | 403 => Some(WeblateError::Auth {
            status,
            url: reply.url.to_string(),
        }),
        404 => Some(WeblateError::NotFound {
            url: reply.url.to_string(),
        }),
        429 | 500..=599 => Some(WeblateError::ServiceUnavailable {
            status,
            attempts: reply.attempts,
        }),
        s if VALIDATION_STATUSES.contains(&s) => Some(match validation_messages(reply.body) {
            Some(messages) => WeblateError::Validation { status, messages },
            None => request_error(status),
        }),
        _ => Some(request_error(status)),
    }
}

/// Classify a failure where no response was received.
///
/// A request that could not even be built (an API key that is not a valid
/// header value, say) never reached the network and is a configuration
/// problem.
pub fn classify_transport(err: reqwest::Error) -> WeblateError {
    if err.is_builder() {
        return WeblateError::Config(format!("Cannot build request: {err}"));
    }
    WeblateError::Transport(err)
}

/// Decode a JSON body of a successful response.
pub fn decode_json(body: &[u8]) -> Result<Value, WeblateError> {
    serde_json::from_slice(body)
        .map_err(|e| WeblateError::Protocol(format!("Server returned invalid JSON: {e}")))
}

fn request_error(status: u16) -> WeblateError {
    let reason = StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown")
        .to_string();
    WeblateError::Request { status, reason }
}

/// Extract field-level messages from an error body.
///
/// Understands the classic `{"field": ["message", ...]}` layout and the
/// `{"type": ..., "errors": [{"attr", "code", "detail"}]}` layout. Messages
/// are kept exactly as the server sent them.
fn validation_messages(body: &[u8]) -> Option<Vec<FieldMessage>> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let object = value.as_object()?;

    if let Some(errors) = object.get("errors").and_then(Value::as_array) {
        let messages: Vec<FieldMessage> = errors
            .iter()
            .filter_map(|error| {
                let detail = error.get("detail")?.as_str()?;
                Some(FieldMessage {
                    field: error.get("attr").and_then(Value::as_str).map(str::to_string),
                    message: detail.to_string(),
                })
            })
            .collect();
        return (!messages.is_empty()).then_some(messages);
    }

    let mut messages = Vec::new();
    for (key, value) in object {
        let field = match key.as_str() {
            "detail" | "non_field_errors" => None,
            _ => Some(key.clone()),
        };
        match value {
            Value::Array(items) => {
                for item in items {
                    messages.push(FieldMessage {
                        field: field.clone(),
                        message: message_text(item),
                    });
                }
            }
            other => messages.push(FieldMessage {
                field,
                message: message_text(other),
            }),
        }
    }
    (!messages.is_empty()).then_some(messages)
}

fn message_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
