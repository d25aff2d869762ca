use std::fmt;

use reqwest::StatusCode;
use serde_json::Value;

#[derive(Debug)]
pub enum ForgeApiError {
    InvalidBaseUrl(String),
    InvalidHeader(String),
    Request(reqwest::Error),
    Status(StatusCode, String),
    Decode(String),
    Cancelled,
    Unknown(String),
}

impl ForgeApiError {
    /// Returns true when the HTTP client gave up waiting for the service.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Request(error) if error.is_timeout())
    }
}

impl fmt::Display for ForgeApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBaseUrl(value) => write!(f, "invalid base URL: {value}"),
            Self::InvalidHeader(message) => write!(f, "invalid header: {message}"),
            Self::Request(error) if error.is_connect() => {
                write!(f, "could not reach the service: {error}")
            }
            Self::Request(error) if error.is_timeout() => write!(f, "request timed out: {error}"),
            Self::Request(error) => write!(f, "request error: {error}"),
            Self::Status(status, message) => write!(f, "HTTP {status} {message}"),
            Self::Decode(message) => write!(f, "malformed response: {message}"),
            Self::Cancelled => write!(f, "request was cancelled"),
            Self::Unknown(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for ForgeApiError {}

impl From<reqwest::Error> for ForgeApiError {
    fn from(error: reqwest::Error) -> Self {
        Self::Request(error)
    }
}

/// Extract a human-readable message from an error response body.
///
/// Understands `{"detail": "..."}`, validation lists of the form
/// `{"detail": [{"msg": "..."}]}`, and `{"error": "..."}` /
/// `{"error": {"message": "..."}}`. Anything else falls back to the raw body,
/// or to the canonical status reason when the body is empty.
pub fn parse_error_message(status: StatusCode, body: &str) -> String {
    let fallback = || {
        if body.trim().is_empty() {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        } else {
            body.trim().to_string()
        }
    };

    let Ok(parsed) = serde_json::from_str::<Value>(body) else {
        return fallback();
    };

    if let Some(message) = parsed.get("detail").and_then(detail_message) {
        return message;
    }

    let error_message = match parsed.get("error") {
        Some(Value::String(message)) => non_empty(message),
        Some(Value::Object(fields)) => fields
            .get("message")
            .and_then(Value::as_str)
            .and_then(non_empty),
        _ => None,
    };

    error_message.unwrap_or_else(fallback)
}

fn detail_message(detail: &Value) -> Option<String> {
    match detail {
        Value::String(message) => non_empty(message),
        Value::Array(items) => {
            let messages = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .filter(|message| !message.trim().is_empty())
                .collect::<Vec<_>>();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        _ => None,
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
