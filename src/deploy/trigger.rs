//! deploy::trigger
//!
//! Hook invocation.
//!
//! The hook's answer is passed through as data. A failed connection or a
//! non-2xx status is a `DeployOutcome` with `ok: false`, not an error; only
//! an unsupported method is rejected, and that happens before any request.

use std::time::Duration;

use log::{debug, warn};
use reqwest::redirect::Policy;
use reqwest::{Client, Response};
use serde::Serialize;
use serde_json::{json, Value};

use super::{redact_url, DeployError, DeployMethod, DeployTarget};

/// Result of invoking a deploy hook.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeployOutcome {
    /// Whether the hook answered with a 2xx status
    pub ok: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,

    /// Response body, as JSON when it parses, otherwise as a string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,

    /// Final URL after redirects, with query values redacted
    pub effective_url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeployOutcome {
    fn failed(url: &str, error: String) -> Self {
        Self {
            ok: false,
            status_code: None,
            body: None,
            effective_url: redact_url(url),
            error: Some(error),
        }
    }
}

/// Invoke `target` with a method given as text.
///
/// # Errors
///
/// `DeployError::UnsupportedMethod` for anything other than GET or POST
/// (case-insensitive). No request is made in that case.
pub async fn trigger(
    target: &DeployTarget,
    method: &str,
    timeout: Duration,
) -> Result<DeployOutcome, DeployError> {
    let method: DeployMethod = method.parse()?;
    Ok(trigger_with(target, method, timeout).await)
}

/// Invoke `target` with an already-parsed method.
pub async fn trigger_with(
    target: &DeployTarget,
    method: DeployMethod,
    timeout: Duration,
) -> DeployOutcome {
    let client = match Client::builder()
        .redirect(Policy::limited(10))
        .timeout(timeout)
        .build()
    {
        Ok(client) => client,
        Err(e) => return DeployOutcome::failed(&target.url, e.to_string()),
    };

    debug!("{} {}", method, redact_url(&target.url));
    let request = match method {
        DeployMethod::Get => client.get(&target.url),
        DeployMethod::Post => client.post(&target.url).json(&json!({})),
    };

    match request.send().await {
        Ok(response) => outcome_from(response).await,
        Err(e) => {
            let e = e.without_url();
            warn!("deploy hook unreachable: {}", e);
            DeployOutcome::failed(&target.url, e.to_string())
        }
    }
}

async fn outcome_from(response: Response) -> DeployOutcome {
    let status = response.status();
    let effective_url = redact_url(response.url().as_str());
    debug!("deploy hook answered {} from {}", status, effective_url);

    let body = match response.text().await {
        Ok(text) if text.trim().is_empty() => None,
        Ok(text) => Some(serde_json::from_str(&text).unwrap_or(Value::String(text))),
        Err(e) => {
            return DeployOutcome {
                ok: false,
                status_code: Some(status.as_u16()),
                body: None,
                effective_url,
                error: Some(e.without_url().to_string()),
            }
        }
    };

    if !status.is_success() {
        warn!("deploy hook returned {}", status);
    }

    DeployOutcome {
        ok: status.is_success(),
        status_code: Some(status.as_u16()),
        body,
        effective_url,
        error: None,
    }
}
