use axum::http::StatusCode;
use thiserror::Error;
use time::Date;

use crate::diary::DiaryError;

/// Failures surfaced to the dashboard user.
#[derive(Debug, Error)]
pub enum DashError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("diary login rejected")]
    Auth,

    #[error("diary request failed for {context}: {message}")]
    TransientFetch { context: String, message: String },

    #[error("no diary entries logged between {start} and {end}")]
    EmptyRange { start: Date, end: Date },
}

impl DashError {
    /// Maps a client-level failure, naming what was being fetched.
    pub fn from_diary(err: DiaryError, context: impl Into<String>) -> Self {
        match err {
            DiaryError::Unauthorized => DashError::Auth,
            DiaryError::Unavailable(message) => DashError::TransientFetch {
                context: context.into(),
                message,
            },
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            DashError::Validation(_) => StatusCode::BAD_REQUEST,
            DashError::Auth => StatusCode::UNAUTHORIZED,
            DashError::TransientFetch { .. } => StatusCode::BAD_GATEWAY,
            DashError::EmptyRange { .. } => StatusCode::NOT_FOUND,
        }
    }
}

impl From<DashError> for (StatusCode, String) {
    fn from(err: DashError) -> Self {
        (err.status(), err.to_string())
    }
}
