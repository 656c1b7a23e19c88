use std::path::PathBuf;

use shared::error::{ApiError, ErrorCode};
use thiserror::Error;

/// Message shown when an added movie is missing its title or year.
pub const ADD_MOVIE_VALIDATION_MESSAGE: &str = "Please provide a title and a valid year.";

#[derive(Debug, Error)]
pub enum MovieSourceError {
    #[error("invalid movie source url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("unexpected status {status} from {url}")]
    Status { url: String, status: u16 },
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed movie document: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("no movie ids left to assign")]
    IdsExhausted,
}

impl MovieSourceError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Malformed(_) | Self::IdsExhausted => ErrorCode::Malformed,
            Self::InvalidUrl(_) | Self::Transport { .. } | Self::Status { .. } | Self::Io { .. } => {
                ErrorCode::Transport
            }
        }
    }

    /// The inline error shown in place of the list when loading fails.
    pub fn to_api_error(&self) -> ApiError {
        ApiError::new(self.code(), format!("Failed to load movies: {self}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AddMovieError {
    #[error("title is empty")]
    EmptyTitle,
    #[error("year is not an integer")]
    InvalidYear,
    #[error("no movie ids left in this session")]
    IdsExhausted,
}

impl AddMovieError {
    pub fn to_api_error(&self) -> ApiError {
        match self {
            Self::EmptyTitle | Self::InvalidYear => {
                ApiError::validation(ADD_MOVIE_VALIDATION_MESSAGE)
            }
            Self::IdsExhausted => ApiError::new(ErrorCode::Validation, "No movie ids left."),
        }
    }
}

#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("failed to write preferences to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode preferences: {0}")]
    Encode(#[from] serde_json::Error),
}
