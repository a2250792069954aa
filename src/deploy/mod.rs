//! deploy
//!
//! Deploy hook triggering.
//!
//! A deploy hook is a plain URL that starts a deployment when it is
//! requested. The target is resolved from explicit input, a Render service
//! id plus deploy key, or an environment fallback (in that order), and is
//! then invoked with GET or POST.
//!
//! # Example
//!
//! ```ignore
//! use forgekit::deploy::{resolve_target, trigger, TargetSources, DEFAULT_RENDER_BASE};
//!
//! let sources = TargetSources {
//!     service_id: Some("srv-abc".into()),
//!     key: Some("k".into()),
//!     ..Default::default()
//! };
//! let target = resolve_target(&sources, DEFAULT_RENDER_BASE)?;
//! let outcome = trigger(&target, "post", Duration::from_secs(30)).await?;
//! println!("{}", outcome.ok);
//! ```

mod target;
mod trigger;

pub use target::{resolve_target, TargetSource, TargetSources};
pub use trigger::{trigger, trigger_with, DeployOutcome};

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// Default base of the Render deploy hook URL.
pub const DEFAULT_RENDER_BASE: &str = "https://api.render.com/deploy";

/// Errors from deploy target resolution and method parsing.
///
/// Network failures are not errors; they are reported in
/// [`DeployOutcome`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeployError {
    /// No usable deploy target.
    #[error("deploy misconfigured: {0}")]
    Misconfigured(String),

    /// Method other than GET or POST.
    #[error("unsupported deploy method '{0}' (expected GET or POST)")]
    UnsupportedMethod(String),
}

impl DeployError {
    /// Stable machine-readable kind.
    pub fn kind(&self) -> &'static str {
        match self {
            DeployError::Misconfigured(_) => "misconfigured",
            DeployError::UnsupportedMethod(_) => "unsupported_method",
        }
    }
}

/// HTTP method used to invoke a hook.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeployMethod {
    Get,
    #[default]
    Post,
}

impl FromStr for DeployMethod {
    type Err = DeployError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(DeployMethod::Get),
            "POST" => Ok(DeployMethod::Post),
            _ => Err(DeployError::UnsupportedMethod(s.trim().to_string())),
        }
    }
}

impl fmt::Display for DeployMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeployMethod::Get => write!(f, "GET"),
            DeployMethod::Post => write!(f, "POST"),
        }
    }
}

/// Resolved deploy hook.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct DeployTarget {
    /// Hook URL, including any key in the query
    pub url: String,
    /// Where the URL came from
    pub source: TargetSource,
}

// Hook URLs embed their key
impl fmt::Debug for DeployTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeployTarget")
            .field("url", &redact_url(&self.url))
            .field("source", &self.source)
            .finish()
    }
}

/// Replace query values in a hook URL with `***`.
pub fn redact_url(url: &str) -> String {
    match url.split_once('?') {
        Some((base, query)) => {
            let redacted: Vec<String> = query
                .split('&')
                .map(|pair| match pair.split_once('=') {
                    Some((name, _)) => format!("{}=***", name),
                    None => pair.to_string(),
                })
                .collect();
            format!("{}?{}", base, redacted.join("&"))
        }
        None => url.to_string(),
    }
}
