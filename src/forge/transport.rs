//! forge::transport
//!
//! Authenticated HTTP transport for the GitHub REST API.
//!
//! # Design
//!
//! The transport is the only place that knows about headers, timeouts and
//! URL assembly. Authorization, API version and client identifier headers
//! are installed once as client defaults when the transport is built, so
//! individual requests only carry a method, path segments, an optional
//! query and an optional JSON body.
//!
//! The transport never retries and never interprets status codes beyond
//! success/failure. Mapping a status to a domain error (not found,
//! conflict, rate limit) is the caller's job, because the same status can
//! mean different things for different operations.

use std::fmt;
use std::time::Duration;

use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Method, Url};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use super::traits::ForgeError;

/// Default GitHub API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// REST API version pinned on every request.
const API_VERSION: &str = "2022-11-28";

/// User-Agent header value for API requests.
const USER_AGENT_VALUE: &str = concat!("forgekit/", env!("CARGO_PKG_VERSION"));

/// Response header carrying the remaining request quota.
const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";

/// Failure of a single HTTP round trip.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpError {
    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
        /// Value of `x-ratelimit-remaining`, when the server sent one
        rate_limit_remaining: Option<u64>,
    },

    /// DNS, TLS, connection or timeout failure.
    #[error("network error: {0}")]
    Network(String),

    /// A 2xx response whose body was not JSON.
    #[error("invalid JSON in response: {0}")]
    Decode(String),
}

impl HttpError {
    /// Status code of the response, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the server reported an exhausted rate-limit quota.
    pub fn rate_limit_exhausted(&self) -> bool {
        matches!(
            self,
            HttpError::Status {
                rate_limit_remaining: Some(0),
                ..
            }
        )
    }
}

/// HTTP transport bound to one API base and one credential.
pub struct HttpTransport {
    client: Client,
    api_base: Url,
}

// Custom Debug to avoid exposing the token held in default headers
impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("api_base", &self.api_base.as_str())
            .finish_non_exhaustive()
    }
}

impl HttpTransport {
    /// Build a transport.
    ///
    /// # Errors
    ///
    /// Returns `ForgeError::Misconfigured` if the token is absent or blank,
    /// if it cannot be used as a header value, or if `api_base` is not an
    /// absolute http(s) URL. No network call is made.
    pub fn new(
        token: Option<&str>,
        api_base: &str,
        timeout: Duration,
    ) -> Result<Self, ForgeError> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                ForgeError::Misconfigured(
                    "no access token configured (set GITHUB_TOKEN)".to_string(),
                )
            })?;

        let api_base = Url::parse(api_base).map_err(|e| {
            ForgeError::Misconfigured(format!("invalid API base '{}': {}", api_base, e))
        })?;
        if api_base.cannot_be_a_base() || !matches!(api_base.scheme(), "http" | "https") {
            return Err(ForgeError::Misconfigured(format!(
                "API base '{}' must be an http(s) URL",
                api_base
            )));
        }

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
            ForgeError::Misconfigured("access token contains invalid characters".to_string())
        })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(API_VERSION));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| ForgeError::Misconfigured(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, api_base })
    }

    /// The API base this transport talks to.
    pub fn api_base(&self) -> &str {
        self.api_base.as_str()
    }

    /// Build the absolute URL for a sequence of path segments.
    ///
    /// Each segment is percent-encoded on its own; empty segments are
    /// dropped so callers can pass split paths without filtering.
    pub fn url<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.api_base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .extend(segments.into_iter().filter(|s| !s.is_empty()));
        }
        url
    }

    /// Issue one request and parse the JSON response.
    ///
    /// A 2xx response with an empty body yields `Value::Null`.
    ///
    /// # Errors
    ///
    /// - `HttpError::Status` for any non-2xx response, with the raw body
    /// - `HttpError::Network` for transport failures, including timeouts
    /// - `HttpError::Decode` if a 2xx body is not valid JSON
    pub async fn request<'a, B>(
        &self,
        method: Method,
        segments: impl IntoIterator<Item = &'a str>,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<Value, HttpError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.url(segments);
        debug!("{} {}", method, url.path());

        let mut request = self.client.request(method, url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| HttpError::Network(e.to_string()))?;
        let status = response.status();
        let rate_limit_remaining = response
            .headers()
            .get(RATE_LIMIT_REMAINING)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let text = response
            .text()
            .await
            .map_err(|e| HttpError::Network(e.to_string()))?;

        if !status.is_success() {
            debug!("request failed with status {}", status.as_u16());
            return Err(HttpError::Status {
                status: status.as_u16(),
                body: text,
                rate_limit_remaining,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| HttpError::Decode(e.to_string()))
    }
}
