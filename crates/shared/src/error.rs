use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Fetching the movie document failed before a body was read.
    Transport,
    /// The movie document was read but could not be understood.
    Malformed,
    /// User input was rejected.
    Validation,
}

/// Inline error shown next to the movie list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Validation, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_message_only() {
        let err = ApiError::validation("Please provide a title and a valid year.");
        assert_eq!(err.to_string(), "Please provide a title and a valid year.");
        assert_eq!(err.code, ErrorCode::Validation);
    }

    #[test]
    fn code_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorCode::Malformed).expect("serialize");
        assert_eq!(json, "\"malformed\"");
    }
}
