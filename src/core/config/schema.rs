//! core::config::schema
//!
//! Configuration file schema.
//!
//! # Location
//!
//! Searched in order (first existing file wins):
//! 1. `--config <path>` on the command line
//! 2. `$FORGEKIT_CONFIG` if set
//! 3. `$XDG_CONFIG_HOME/forgekit/config.toml`
//! 4. `~/.forgekit/config.toml`
//!
//! # Secrets
//!
//! The access token is never stored in the file. `token_env` may name a
//! different environment variable to read it from.
//!
//! # Validation
//!
//! Values are validated after parsing so a typo fails at startup rather
//! than on the first request.

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::types::RepoCoordinate;
use crate::deploy::DeployMethod;

/// Contents of the configuration file.
///
/// # Example
///
/// ```toml
/// api_base = "https://api.github.com"
/// timeout_secs = 20
/// default_repo = "octocat/hello-world"
///
/// [deploy]
/// service_id = "srv-abc123"
/// method = "POST"
/// timeout_secs = 30
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// REST API base (GitHub Enterprise: `https://host/api/v3`)
    pub api_base: Option<String>,

    /// Per-request timeout for repository operations
    pub timeout_secs: Option<u64>,

    /// Repository used when a command doesn't name one
    pub default_repo: Option<String>,

    /// Environment variable holding the access token
    pub token_env: Option<String>,

    /// Deploy hook settings
    pub deploy: Option<DeployConfig>,
}

impl FileConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(base) = &self.api_base {
            validate_http_url("api_base", base)?;
        }

        if self.timeout_secs == Some(0) {
            return Err(ConfigError::InvalidValue(
                "timeout_secs must be greater than zero".into(),
            ));
        }

        if let Some(repo) = &self.default_repo {
            repo.parse::<RepoCoordinate>()
                .map_err(|e| ConfigError::InvalidValue(format!("default_repo: {}", e)))?;
        }

        if let Some(name) = &self.token_env {
            if name.trim().is_empty() {
                return Err(ConfigError::InvalidValue("token_env cannot be empty".into()));
            }
        }

        if let Some(deploy) = &self.deploy {
            deploy.validate()?;
        }

        Ok(())
    }
}

/// Deploy hook settings.
///
/// Hook URL, service id and key are usually supplied through the
/// environment; the file values are used when the environment is silent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DeployConfig {
    /// Fallback hook URL
    pub hook_url: Option<String>,

    /// Render service id (combined with `key`)
    pub service_id: Option<String>,

    /// Render deploy key
    pub key: Option<String>,

    /// Base of the provider deploy URL template
    pub render_base: Option<String>,

    /// Timeout for the hook call
    pub timeout_secs: Option<u64>,

    /// Default method ("GET" or "POST")
    pub method: Option<String>,
}

impl DeployConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(base) = &self.render_base {
            validate_http_url("deploy.render_base", base)?;
        }
        if self.timeout_secs == Some(0) {
            return Err(ConfigError::InvalidValue(
                "deploy.timeout_secs must be greater than zero".into(),
            ));
        }
        if let Some(method) = &self.method {
            method
                .parse::<DeployMethod>()
                .map_err(|e| ConfigError::InvalidValue(format!("deploy.method: {}", e)))?;
        }
        Ok(())
    }
}

fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    match reqwest::Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        _ => Err(ConfigError::InvalidValue(format!(
            "{} must be an http(s) URL, got '{}'",
            field, value
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_file() {
        let config: FileConfig = toml::from_str(
            r#"
            api_base = "https://github.example.com/api/v3"
            timeout_secs = 5
            default_repo = "octocat/hello-world"
            token_env = "MY_TOKEN"

            [deploy]
            hook_url = "https://hooks.example.com/deploy"
            service_id = "srv-1"
            key = "k"
            method = "get"
            timeout_secs = 60
            "#,
        )
        .unwrap();

        assert_eq!(config.timeout_secs, Some(5));
        assert_eq!(config.deploy.as_ref().unwrap().service_id.as_deref(), Some("srv-1"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_unknown_fields() {
        let result: Result<FileConfig, _> = toml::from_str("tokn = \"x\"");
        assert!(result.is_err());
    }

    #[test]
    fn rejects_invalid_values() {
        let cases = [
            "api_base = \"not a url\"",
            "timeout_secs = 0",
            "default_repo = \"no-slash\"",
            "token_env = \" \"",
            "[deploy]\nmethod = \"PUT\"",
            "[deploy]\nrender_base = \"ftp://x\"",
        ];
        for case in cases {
            let config: FileConfig = toml::from_str(case).unwrap();
            assert!(config.validate().is_err(), "{}", case);
        }
    }

    #[test]
    fn empty_file_is_valid() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert_eq!(config, FileConfig::default());
        assert!(config.validate().is_ok());
    }
}
