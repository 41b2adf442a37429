//! Error types for the cortexclaw domain.
//!
//! The pure transforms (turn extraction, context assembly) are total and
//! never produce these; they exist for the remote API and the tool surface.

use thiserror::Error;

/// The top-level error type for all cortexclaw operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Remote memory API errors ---
    #[error("Memory API error: {0}")]
    Api(#[from] ApiError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures talking to the remote memory service.
///
/// Every variant is a hard failure: callers do not retry.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("Cortex {path} → {status_code}: {body}")]
    Status {
        path: String,
        status_code: u16,
        body: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to decode response from {path}: {reason}")]
    Decode { path: String, reason: String },
}

impl ApiError {
    /// HTTP status code, when the server answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_status_error_displays_path_and_code() {
        let err = Error::Api(ApiError::Status {
            path: "/recall/recall_preferences".into(),
            status_code: 401,
            body: "invalid token".into(),
        });
        let text = err.to_string();
        assert!(text.contains("/recall/recall_preferences"));
        assert!(text.contains("401"));
        assert!(text.contains("invalid token"));
    }

    #[test]
    fn status_code_only_for_status_variant() {
        let status = ApiError::Status {
            path: "/list/data".into(),
            status_code: 500,
            body: String::new(),
        };
        assert_eq!(status.status_code(), Some(500));
        assert_eq!(ApiError::Network("refused".into()).status_code(), None);
    }

    #[test]
    fn tool_error_displays_correctly() {
        let err = Error::Tool(ToolError::InvalidArguments("Missing 'query' argument".into()));
        assert!(err.to_string().contains("query"));
    }
}
