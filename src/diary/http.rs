use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use time::Date;
use tracing::{debug, error, warn};

use super::{DayRecord, DiaryError, DiaryProvider, DiarySession, WeightSample};
use crate::auth::Credentials;
use crate::dates::format_day;

#[derive(Debug, Serialize)]
struct LoginBody<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: String,
}

/// Diary service reached over HTTP/JSON.
#[derive(Clone)]
pub struct HttpDiary {
    client: Client,
    base_url: String,
}

impl HttpDiary {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("build diary http client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

pub(crate) fn classify_status(status: StatusCode) -> Option<DiaryError> {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        Some(DiaryError::Unauthorized)
    } else if !status.is_success() {
        Some(DiaryError::Unavailable(format!("diary service answered {status}")))
    } else {
        None
    }
}

fn transport(e: reqwest::Error) -> DiaryError {
    if e.is_timeout() {
        DiaryError::Unavailable("diary service timed out".into())
    } else {
        DiaryError::Unavailable(e.to_string())
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, DiaryError> {
    if let Some(err) = classify_status(response.status()) {
        let body = response.text().await.unwrap_or_default();
        warn!(error = %err, %body, "diary request failed");
        return Err(err);
    }
    response.json::<T>().await.map_err(|e| {
        error!(error = %e, "diary response did not decode");
        DiaryError::Unavailable(format!("unreadable diary response: {e}"))
    })
}

#[async_trait]
impl DiaryProvider for HttpDiary {
    async fn connect(&self, credentials: &Credentials) -> Result<Box<dyn DiarySession>, DiaryError> {
        let url = format!("{}/auth/login", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&LoginBody {
                username: &credentials.username,
                password: &credentials.password,
            })
            .send()
            .await
            .map_err(transport)?;
        let login: LoginResponse = decode(response).await?;
        debug!(username = %credentials.username, "diary session opened");

        Ok(Box::new(HttpSession {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: login.access_token,
        }))
    }
}

struct HttpSession {
    client: Client,
    base_url: String,
    token: String,
}

#[async_trait]
impl DiarySession for HttpSession {
    async fn day(&self, date: Date) -> Result<DayRecord, DiaryError> {
        let url = format!("{}/diary/{}", self.base_url, format_day(date));
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(transport)?;
        decode(response).await
    }

    async fn weights(&self, start: Date, end: Date) -> Result<Vec<WeightSample>, DiaryError> {
        let url = format!("{}/measurements/weight", self.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .query(&[("from", format_day(start)), ("to", format_day(end))])
            .send()
            .await
            .map_err(transport)?;
        decode(response).await
    }
}
