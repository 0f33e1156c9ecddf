//! Seam to the remote diet-tracking service.

use async_trait::async_trait;
use thiserror::Error;
use time::Date;

#[cfg(test)]
pub mod fake;
pub mod http;
pub mod repo_types;

pub use repo_types::{DayRecord, EntryRecord, MealRecord, WeightSample};

use crate::auth::Credentials;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DiaryError {
    #[error("credentials rejected")]
    Unauthorized,
    #[error("{0}")]
    Unavailable(String),
}

/// Opens authenticated sessions against the diary service.
#[async_trait]
pub trait DiaryProvider: Send + Sync {
    async fn connect(&self, credentials: &Credentials) -> Result<Box<dyn DiarySession>, DiaryError>;
}

/// One logged-in session; dropped at the end of the request.
#[async_trait]
pub trait DiarySession: Send + Sync {
    async fn day(&self, date: Date) -> Result<DayRecord, DiaryError>;
    async fn weights(&self, start: Date, end: Date) -> Result<Vec<WeightSample>, DiaryError>;
}
