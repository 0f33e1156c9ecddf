use std::time::Duration;

use futures_util::stream::{self, StreamExt};
use time::Date;
use tracing::{debug, info, warn};

use super::normalize::normalize_detail;
use super::repo_types::NutrientTable;
use crate::config::{DayErrorPolicy, FetchConfig};
use crate::dates::{days_in_range, format_day};
use crate::diary::{DayRecord, DiaryError, DiarySession, WeightSample};
use crate::error::DashError;

/// Days fetched for a range, plus the days left out under the skip policy.
#[derive(Debug, Default)]
pub struct FetchedRange {
    pub days: Vec<DayRecord>,
    pub missing_days: Vec<Date>,
}

/// Upper bound for a single retry sleep.
const MAX_RETRY_BACKOFF: Duration = Duration::from_secs(60);

/// Exponential backoff for the given 1-based retry attempt, capped at `MAX_RETRY_BACKOFF`.
fn retry_delay(policy: &FetchConfig, attempt: u32) -> Duration {
    let factor = 2_u32
        .checked_pow(attempt.saturating_sub(1))
        .unwrap_or(u32::MAX);
    policy
        .retry_backoff()
        .saturating_mul(factor)
        .min(MAX_RETRY_BACKOFF)
}

/// Looks up one day, retrying transient failures with exponential backoff.
async fn fetch_day(
    session: &dyn DiarySession,
    date: Date,
    policy: &FetchConfig,
) -> Result<DayRecord, DiaryError> {
    let mut attempt = 0;
    loop {
        match session.day(date).await {
            Ok(mut day) => {
                // the service keys the record by the requested day
                day.date = date;
                return Ok(day);
            }
            Err(DiaryError::Unauthorized) => return Err(DiaryError::Unauthorized),
            Err(err) if attempt < policy.max_retries => {
                attempt += 1;
                let backoff = retry_delay(policy, attempt);
                warn!(
                    date = %format_day(date),
                    error = %err,
                    attempt,
                    backoff_ms = backoff.as_millis() as u64,
                    "day fetch failed, retrying"
                );
                tokio::time::sleep(backoff).await;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Fetches every day of `[start, end]`, returned in date order.
pub async fn fetch_range(
    session: &dyn DiarySession,
    start: Date,
    end: Date,
    policy: &FetchConfig,
) -> Result<FetchedRange, DashError> {
    let dates = days_in_range(start, end);
    debug!(days = dates.len(), concurrency = policy.concurrency, "fetching diary range");

    // `buffered` keeps results in request order; dropping it cancels pending lookups
    let mut lookups = std::pin::pin!(stream::iter(dates)
        .map(|date| async move { (date, fetch_day(session, date, policy).await) })
        .buffered(policy.concurrency.max(1)));

    let mut fetched = FetchedRange::default();
    while let Some((date, result)) = lookups.next().await {
        match result {
            Ok(day) => fetched.days.push(day),
            Err(DiaryError::Unauthorized) => return Err(DashError::Auth),
            Err(err) => match policy.on_day_error {
                DayErrorPolicy::Abort => {
                    return Err(DashError::from_diary(err, format!("day {}", format_day(date))));
                }
                DayErrorPolicy::Skip => {
                    warn!(date = %format_day(date), error = %err, "skipping day that failed to load");
                    fetched.missing_days.push(date);
                }
            },
        }
    }

    info!(
        fetched = fetched.days.len(),
        missing = fetched.missing_days.len(),
        "diary range fetched"
    );
    Ok(fetched)
}

/// Weight samples inside `[start, end]`, sorted by date.
pub async fn fetch_weight(
    session: &dyn DiarySession,
    start: Date,
    end: Date,
) -> Result<Vec<WeightSample>, DashError> {
    let mut samples = session.weights(start, end).await.map_err(|e| {
        DashError::from_diary(e, format!("weight {}..{}", format_day(start), format_day(end)))
    })?;
    samples.retain(|s| s.date >= start && s.date <= end && s.value.is_finite());
    samples.sort_by_key(|s| s.date);
    Ok(samples)
}

/// Entries logged on `date`, one row each; meals without entries are left out.
pub async fn detail_for_date(
    session: &dyn DiarySession,
    date: Date,
) -> Result<NutrientTable, DashError> {
    let mut day = session
        .day(date)
        .await
        .map_err(|e| DashError::from_diary(e, format!("day {}", format_day(date))))?;
    day.date = date;
    Ok(normalize_detail(&day))
}
