use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

/// What to do when a single day of the range cannot be fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayErrorPolicy {
    /// Fail the whole request with the first error.
    Abort,
    /// Leave the day out and report it in `missing_days`.
    Skip,
}

impl FromStr for DayErrorPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "skip" => Ok(Self::Skip),
            other => anyhow::bail!("unknown day error policy: {other}"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    pub concurrency: usize,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    pub on_day_error: DayErrorPolicy,
}

impl FetchConfig {
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            concurrency: 1,
            max_retries: 0,
            retry_backoff_ms: 500,
            on_day_error: DayErrorPolicy::Abort,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub diary_base_url: String,
    pub diary_timeout_secs: u64,
    pub max_range_days: i64,
    pub fetch: FetchConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; unparsable numbers fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let diary_base_url = lookup("DIARY_BASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DIARY_BASE_URL is not set"))?
            .trim_end_matches('/')
            .to_string();

        let defaults = FetchConfig::default();
        let fetch = FetchConfig {
            concurrency: lookup("FETCH_CONCURRENCY")
                .and_then(|v| v.parse::<usize>().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.concurrency),
            max_retries: lookup("FETCH_MAX_RETRIES")
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(defaults.max_retries),
            retry_backoff_ms: lookup("FETCH_RETRY_BACKOFF_MS")
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(defaults.retry_backoff_ms),
            on_day_error: match lookup("FETCH_ON_DAY_ERROR") {
                Some(v) => v.parse()?,
                None => defaults.on_day_error,
            },
        };

        Ok(Self {
            diary_base_url,
            diary_timeout_secs: lookup("DIARY_TIMEOUT_SECS")
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(30),
            max_range_days: lookup("MAX_RANGE_DAYS")
                .and_then(|v| v.parse::<i64>().ok())
                .filter(|n| *n > 0)
                .unwrap_or(366),
            fetch,
        })
    }
}
