//! cli::commands::deploy
//!
//! Trigger a deploy hook. CLI flags override config and environment.

use std::time::Duration;

use anyhow::Result;
use serde_json::{json, Value};

use crate::core::config::Config;
use crate::deploy::{self, DeployMethod, TargetSources};

/// Flags given to `fk deploy`.
#[derive(Debug, Clone, Default)]
pub struct DeployArgs {
    pub url: Option<String>,
    pub service_id: Option<String>,
    pub key: Option<String>,
    pub method: Option<String>,
    pub timeout: Option<u64>,
}

/// Resolve the target and invoke it.
///
/// The method is validated before the target is resolved, so an
/// unsupported method fails even when nothing is configured.
pub async fn deploy(config: &Config, args: DeployArgs) -> Result<Value> {
    let method: DeployMethod = match args.method.as_deref() {
        Some(text) => text.parse()?,
        None => config.deploy_method(),
    };

    let sources = TargetSources {
        explicit_url: args.url,
        service_id: args
            .service_id
            .or_else(|| config.deploy_service_id().map(str::to_string)),
        key: args.key.or_else(|| config.deploy_key().map(str::to_string)),
        env_fallback: config.deploy_hook_url().map(str::to_string),
    };
    let target = deploy::resolve_target(&sources, config.render_base())?;

    let timeout = args
        .timeout
        .map(Duration::from_secs)
        .unwrap_or_else(|| config.deploy_timeout());
    let outcome = deploy::trigger_with(&target, method, timeout).await;

    let mut value = serde_json::to_value(&outcome)?;
    value["method"] = json!(method);
    value["source"] = json!(target.source);
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::FileConfig;
    use crate::deploy::DeployError;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(pairs: Vec<(&'static str, String)>) -> Config {
        Config::from_sources(FileConfig::default(), None, move |name| {
            pairs
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.clone())
        })
        .unwrap()
    }

    #[tokio::test]
    async fn unsupported_method_before_resolution() {
        let err = deploy(
            &config(vec![]),
            DeployArgs {
                method: Some("PUT".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DeployError>(),
            Some(DeployError::UnsupportedMethod(_))
        ));
    }

    #[tokio::test]
    async fn nothing_configured() {
        let err = deploy(&config(vec![]), DeployArgs::default()).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DeployError>(),
            Some(DeployError::Misconfigured(_))
        ));
    }

    #[tokio::test]
    async fn flags_override_environment() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/deploy/srv-flag"))
            .and(query_param("key", "k-flag"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let file = FileConfig {
            deploy: Some(crate::core::config::DeployConfig {
                render_base: Some(format!("{}/deploy", server.uri())),
                ..Default::default()
            }),
            ..Default::default()
        };
        let config = Config::from_sources(file, None, |name| match name {
            "RENDER_SERVICE_ID" => Some("srv-env".into()),
            "RENDER_DEPLOY_KEY" => Some("k-env".into()),
            _ => None,
        })
        .unwrap();

        let value = deploy(
            &config,
            DeployArgs {
                service_id: Some("srv-flag".into()),
                key: Some("k-flag".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(value["ok"], true);
        assert_eq!(value["method"], "POST");
        assert_eq!(value["source"], "service");
        assert!(!value.to_string().contains("k-flag"));
    }

    #[tokio::test]
    async fn environment_fallback_with_get() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/hook"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&server)
            .await;

        let value = deploy(
            &config(vec![("DEPLOY_HOOK_URL", format!("{}/hook", server.uri()))]),
            DeployArgs {
                method: Some("get".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(value["ok"], false);
        assert_eq!(value["status_code"], 500);
        assert_eq!(value["body"], "boom");
        assert_eq!(value["source"], "environment");
    }
}
