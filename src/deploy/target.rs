//! deploy::target
//!
//! Deploy target resolution.

use log::{debug, info};
use reqwest::Url;
use serde::Serialize;

use super::{redact_url, DeployError, DeployTarget};

/// Where a resolved deploy URL came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetSource {
    /// URL passed by the caller
    Explicit,
    /// Built from service id and deploy key
    Service,
    /// Fallback hook URL from the environment or config
    Environment,
}

/// Candidate inputs for a deploy target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetSources {
    pub explicit_url: Option<String>,
    pub service_id: Option<String>,
    pub key: Option<String>,
    pub env_fallback: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Resolve the hook URL to invoke.
///
/// An explicit URL wins, then service id plus key (both required), then
/// the fallback. Blank values count as absent.
///
/// # Errors
///
/// `DeployError::Misconfigured` if no source yields a URL, or if the
/// Render base cannot be combined with the service id.
pub fn resolve_target(
    sources: &TargetSources,
    render_base: &str,
) -> Result<DeployTarget, DeployError> {
    let target = if let Some(url) = present(&sources.explicit_url) {
        DeployTarget {
            url: url.to_string(),
            source: TargetSource::Explicit,
        }
    } else if let (Some(service_id), Some(key)) =
        (present(&sources.service_id), present(&sources.key))
    {
        DeployTarget {
            url: service_url(render_base, service_id, key)?,
            source: TargetSource::Service,
        }
    } else if let Some(url) = present(&sources.env_fallback) {
        info!("using fallback deploy hook");
        DeployTarget {
            url: url.to_string(),
            source: TargetSource::Environment,
        }
    } else {
        return Err(DeployError::Misconfigured(
            "no deploy hook: pass --url, set RENDER_SERVICE_ID and RENDER_DEPLOY_KEY, \
             or set DEPLOY_HOOK_URL"
                .to_string(),
        ));
    };

    debug!(
        "deploy target {} ({:?})",
        redact_url(&target.url),
        target.source
    );
    Ok(target)
}

/// `{render_base}/{service_id}?key={key}`
fn service_url(render_base: &str, service_id: &str, key: &str) -> Result<String, DeployError> {
    let mut url = Url::parse(render_base).map_err(|e| {
        DeployError::Misconfigured(format!("invalid deploy base '{}': {}", render_base, e))
    })?;
    url.path_segments_mut()
        .map_err(|_| {
            DeployError::Misconfigured(format!("deploy base '{}' cannot take a path", render_base))
        })?
        .pop_if_empty()
        .push(service_id);
    url.query_pairs_mut().append_pair("key", key);
    Ok(url.into())
}
