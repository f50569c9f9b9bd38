use serde::Deserialize;
use thiserror::Error;

/// Every transport or server failure collapses into one of these; stores
/// display them through [`ApiError::message_or`].
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    /// Response arrived but the body was not the expected shape.
    #[error("response decode error: {0}")]
    Decode(String),

    /// Non-success status from the backend, with the body's `message`
    /// field when it carried one.
    #[error("server error ({status}): {}", message.as_deref().unwrap_or("no message"))]
    Server {
        status: u16,
        message: Option<String>,
    },
}

impl ApiError {
    /// Display string for the error banner: the server-supplied message
    /// when present, else the caller's per-operation fallback.
    pub fn message_or(&self, fallback: &str) -> String {
        match self {
            ApiError::Server {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            _ => fallback.to_string(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Server { status: 401, .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Best-effort extraction of the `message` field from an error body.
/// Anything unparseable simply yields no message.
pub(crate) fn server_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
}
