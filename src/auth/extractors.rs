use std::fmt;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use base64ct::{Base64, Encoding};
use tracing::warn;

/// Diary account login, passed through to the remote service on every request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Extracts diary credentials from an `Authorization: Basic` header.
pub struct BasicCredentials(pub Credentials);

pub(crate) fn parse_basic(header: &str) -> Result<Credentials, &'static str> {
    // Expect "Basic <base64(user:pass)>"
    let encoded = header
        .strip_prefix("Basic ")
        .or_else(|| header.strip_prefix("basic "))
        .ok_or("invalid auth scheme")?;

    let decoded = Base64::decode_vec(encoded.trim()).map_err(|_| "invalid base64 credentials")?;
    let decoded = String::from_utf8(decoded).map_err(|_| "credentials are not utf-8")?;

    let (username, password) = decoded
        .split_once(':')
        .ok_or("credentials must be user:password")?;
    if username.trim().is_empty() {
        return Err("username is required");
    }

    Ok(Credentials {
        username: username.trim().to_string(),
        password: password.to_string(),
    })
}

#[async_trait]
impl<S> FromRequestParts<S> for BasicCredentials
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or((StatusCode::UNAUTHORIZED, "missing Authorization header".into()))?;

        let credentials = parse_basic(auth).map_err(|reason| {
            warn!(reason, "rejected Authorization header");
            (StatusCode::UNAUTHORIZED, reason.to_string())
        })?;

        Ok(BasicCredentials(credentials))
    }
}
