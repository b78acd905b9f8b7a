// src/browser/error.rs
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrowserError {
    /// The engine process could not be started or never announced its endpoint.
    #[error("browser launch failed: {0}")]
    Launch(String),

    #[error("websocket error: {0}")]
    WebSocket(String),

    #[error("CDP error: {message} (code: {code})")]
    Protocol { code: i64, message: String },

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    /// An element the run must interact with (form field, submit control) is absent.
    #[error("element not found: {0}")]
    ElementNotFound(String),

    #[error("JavaScript error: {0}")]
    JavaScript(String),

    #[error("timed out: {0}")]
    Timeout(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("session closed")]
    Closed,
}

impl From<tungstenite::Error> for BrowserError {
    fn from(e: tungstenite::Error) -> Self {
        BrowserError::WebSocket(e.to_string())
    }
}

impl From<serde_json::Error> for BrowserError {
    fn from(e: serde_json::Error) -> Self {
        BrowserError::InvalidResponse(e.to_string())
    }
}

impl From<std::io::Error> for BrowserError {
    fn from(e: std::io::Error) -> Self {
        BrowserError::Launch(e.to_string())
    }
}

impl From<url::ParseError> for BrowserError {
    fn from(e: url::ParseError) -> Self {
        BrowserError::Launch(format!("invalid DevTools URL: {e}"))
    }
}
