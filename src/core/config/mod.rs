//! core::config
//!
//! Configuration loading.
//!
//! # Overview
//!
//! Configuration is read once at startup and handed to constructors. No
//! component reads the process environment on its own; the token and the
//! deploy hook target flow in through [`Config`].
//!
//! # Precedence
//!
//! Values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Config file (see [`schema`] for locations)
//! 3. Environment variables
//! 4. CLI flags (not handled here)
//!
//! # Environment
//!
//! - `GITHUB_TOKEN` (fallback `GH_TOKEN`, or the name in `token_env`)
//! - `FORGEKIT_API_BASE`
//! - `DEPLOY_HOOK_URL`
//! - `RENDER_SERVICE_ID`, `RENDER_DEPLOY_KEY`
//!
//! # Example
//!
//! ```no_run
//! use forgekit::core::config::Config;
//!
//! let config = Config::load(None).unwrap();
//! println!("API base: {}", config.api_base());
//! println!("token configured: {}", config.token().is_some());
//! ```

pub mod schema;

pub use schema::{DeployConfig, FileConfig};

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::debug;
use serde_json::{json, Value};
use thiserror::Error;

use crate::core::types::RepoCoordinate;
use crate::deploy::{DeployMethod, DEFAULT_RENDER_BASE};
use crate::forge::transport::{DEFAULT_API_BASE, DEFAULT_TIMEOUT};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "FORGEKIT_CONFIG";
/// Primary token variable.
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";
/// Token variable used when `GITHUB_TOKEN` is unset.
pub const FALLBACK_TOKEN_ENV: &str = "GH_TOKEN";
/// API base override.
pub const API_BASE_ENV: &str = "FORGEKIT_API_BASE";
/// Deploy hook fallback URL.
pub const DEPLOY_HOOK_ENV: &str = "DEPLOY_HOOK_URL";
/// Render service id.
pub const SERVICE_ID_ENV: &str = "RENDER_SERVICE_ID";
/// Render deploy key.
pub const DEPLOY_KEY_ENV: &str = "RENDER_DEPLOY_KEY";

/// Default timeout for deploy hook calls.
pub const DEFAULT_DEPLOY_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Effective configuration from all sources.
#[derive(Clone, Default)]
pub struct Config {
    file: FileConfig,
    path: Option<PathBuf>,
    token: Option<String>,
    api_base: Option<String>,
    hook_url: Option<String>,
    service_id: Option<String>,
    deploy_key: Option<String>,
}

// Custom Debug to avoid exposing the token and deploy key
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("path", &self.path)
            .field("has_token", &self.token.is_some())
            .field("api_base", &self.api_base())
            .field("default_repo", &self.file.default_repo)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Load configuration from the file system and the process environment.
    ///
    /// If `explicit` is given that file must exist. Otherwise the standard
    /// locations are searched; a missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read, parsed
    /// or validated.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let (file, path) = match explicit {
            Some(path) => (Self::read_file(path)?, Some(path.to_path_buf())),
            None => match Self::find_file() {
                Some(path) => (Self::read_file(&path)?, Some(path)),
                None => (FileConfig::default(), None),
            },
        };
        if let Some(path) = &path {
            debug!("loaded config from {}", path.display());
        }
        Self::from_sources(file, path, |name| std::env::var(name).ok())
    }

    /// Build configuration from a parsed file and an environment lookup.
    ///
    /// Blank environment values are treated as unset.
    pub fn from_sources(
        file: FileConfig,
        path: Option<PathBuf>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        file.validate()?;

        let lookup = |name: &str| {
            env(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let token = match file.token_env.as_deref() {
            Some(name) => lookup(name),
            None => lookup(TOKEN_ENV).or_else(|| lookup(FALLBACK_TOKEN_ENV)),
        };

        let api_base = lookup(API_BASE_ENV);
        if let Some(base) = &api_base {
            let valid = reqwest::Url::parse(base)
                .map(|u| matches!(u.scheme(), "http" | "https"))
                .unwrap_or(false);
            if !valid {
                return Err(ConfigError::InvalidValue(format!(
                    "{} must be an http(s) URL, got '{}'",
                    API_BASE_ENV, base
                )));
            }
        }

        Ok(Config {
            token,
            api_base,
            hook_url: lookup(DEPLOY_HOOK_ENV),
            service_id: lookup(SERVICE_ID_ENV),
            deploy_key: lookup(DEPLOY_KEY_ENV),
            file,
            path,
        })
    }

    /// First existing file among the standard locations.
    fn find_file() -> Option<PathBuf> {
        let mut candidates = Vec::new();
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            candidates.push(PathBuf::from(path));
        }
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            candidates.push(PathBuf::from(xdg_home).join("forgekit/config.toml"));
        }
        if let Some(home) = dirs::home_dir() {
            candidates.push(home.join(".forgekit/config.toml"));
        }
        candidates.into_iter().find(|p| p.exists())
    }

    /// Read and parse a config file.
    fn read_file(path: &Path) -> Result<FileConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    /// Path of the loaded config file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Access token for repository operations.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// REST API base. Defaults to `https://api.github.com`.
    pub fn api_base(&self) -> &str {
        self.api_base
            .as_deref()
            .or(self.file.api_base.as_deref())
            .unwrap_or(DEFAULT_API_BASE)
    }

    /// Per-request timeout for repository operations. Defaults to 20 seconds.
    pub fn timeout(&self) -> Duration {
        self.file
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT)
    }

    /// Repository used when a command doesn't name one.
    pub fn default_repo(&self) -> Option<RepoCoordinate> {
        // validated at construction
        self.file.default_repo.as_deref()?.parse().ok()
    }

    fn deploy(&self) -> Option<&DeployConfig> {
        self.file.deploy.as_ref()
    }

    /// Fallback deploy hook URL.
    pub fn deploy_hook_url(&self) -> Option<&str> {
        self.hook_url
            .as_deref()
            .or_else(|| self.deploy()?.hook_url.as_deref())
    }

    /// Render service id.
    pub fn deploy_service_id(&self) -> Option<&str> {
        self.service_id
            .as_deref()
            .or_else(|| self.deploy()?.service_id.as_deref())
    }

    /// Render deploy key.
    pub fn deploy_key(&self) -> Option<&str> {
        self.deploy_key
            .as_deref()
            .or_else(|| self.deploy()?.key.as_deref())
    }

    /// Base of the provider deploy URL template.
    pub fn render_base(&self) -> &str {
        self.deploy()
            .and_then(|d| d.render_base.as_deref())
            .unwrap_or(DEFAULT_RENDER_BASE)
    }

    /// Timeout for the hook call. Defaults to 30 seconds.
    pub fn deploy_timeout(&self) -> Duration {
        self.deploy()
            .and_then(|d| d.timeout_secs)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_DEPLOY_TIMEOUT)
    }

    /// Default deploy method. Defaults to POST.
    pub fn deploy_method(&self) -> DeployMethod {
        self.deploy()
            .and_then(|d| d.method.as_deref())
            .and_then(|m| m.parse().ok())
            .unwrap_or_default()
    }

    /// Effective configuration with secrets redacted.
    pub fn summary(&self) -> Value {
        json!({
            "config_file": self.path.as_ref().map(|p| p.display().to_string()),
            "api_base": self.api_base(),
            "timeout_secs": self.timeout().as_secs(),
            "default_repo": self.default_repo().map(|r| r.to_string()),
            "token_configured": self.token.is_some(),
            "deploy": {
                "hook_url_configured": self.deploy_hook_url().is_some(),
                "service_id": self.deploy_service_id(),
                "key_configured": self.deploy_key().is_some(),
                "render_base": self.render_base(),
                "timeout_secs": self.deploy_timeout().as_secs(),
                "method": self.deploy_method().to_string(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_without_sources() {
        let config = Config::from_sources(FileConfig::default(), None, env_of(&[])).unwrap();
        assert_eq!(config.token(), None);
        assert_eq!(config.api_base(), DEFAULT_API_BASE);
        assert_eq!(config.timeout(), Duration::from_secs(20));
        assert_eq!(config.deploy_method(), DeployMethod::Post);
        assert_eq!(config.render_base(), DEFAULT_RENDER_BASE);
        assert!(config.default_repo().is_none());
    }

    #[test]
    fn token_falls_back_to_gh_token() {
        let config =
            Config::from_sources(FileConfig::default(), None, env_of(&[("GH_TOKEN", "t2")]))
                .unwrap();
        assert_eq!(config.token(), Some("t2"));

        let config = Config::from_sources(
            FileConfig::default(),
            None,
            env_of(&[("GITHUB_TOKEN", "t1"), ("GH_TOKEN", "t2")]),
        )
        .unwrap();
        assert_eq!(config.token(), Some("t1"));
    }

    #[test]
    fn blank_token_is_unset() {
        let config =
            Config::from_sources(FileConfig::default(), None, env_of(&[("GITHUB_TOKEN", "  ")]))
                .unwrap();
        assert_eq!(config.token(), None);
    }

    #[test]
    fn token_env_override() {
        let file = FileConfig {
            token_env: Some("BOT_TOKEN".into()),
            ..Default::default()
        };
        let config = Config::from_sources(
            file,
            None,
            env_of(&[("GITHUB_TOKEN", "ignored"), ("BOT_TOKEN", "bot")]),
        )
        .unwrap();
        assert_eq!(config.token(), Some("bot"));
    }

    #[test]
    fn environment_overrides_file() {
        let file = FileConfig {
            api_base: Some("https://file.example.com".into()),
            deploy: Some(DeployConfig {
                hook_url: Some("https://file.example.com/hook".into()),
                service_id: Some("srv-file".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let config = Config::from_sources(
            file,
            None,
            env_of(&[
                ("FORGEKIT_API_BASE", "https://env.example.com"),
                ("DEPLOY_HOOK_URL", "https://env.example.com/hook"),
            ]),
        )
        .unwrap();
        assert_eq!(config.api_base(), "https://env.example.com");
        assert_eq!(config.deploy_hook_url(), Some("https://env.example.com/hook"));
        assert_eq!(config.deploy_service_id(), Some("srv-file"));
    }

    #[test]
    fn invalid_env_api_base_is_rejected() {
        let result = Config::from_sources(
            FileConfig::default(),
            None,
            env_of(&[("FORGEKIT_API_BASE", "nope")]),
        );
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn summary_redacts_secrets() {
        let config = Config::from_sources(
            FileConfig::default(),
            None,
            env_of(&[("GITHUB_TOKEN", "ghp_secret"), ("RENDER_DEPLOY_KEY", "dk_secret")]),
        )
        .unwrap();
        let text = config.summary().to_string();
        assert!(!text.contains("ghp_secret"));
        assert!(!text.contains("dk_secret"));
        assert_eq!(config.summary()["token_configured"], true);
        assert!(!format!("{:?}", config).contains("ghp_secret"));
    }

    #[test]
    fn load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "default_repo = \"octocat/hello\"\ntimeout_secs = 3").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.path(), Some(file.path()));
        assert_eq!(config.default_repo().unwrap().to_string(), "octocat/hello");
        assert_eq!(config.timeout(), Duration::from_secs(3));
    }

    #[test]
    fn load_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load(Some(&dir.path().join("absent.toml")));
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }

    #[test]
    fn load_malformed_file_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "timeout_secs = \"soon\"").unwrap();
        let result = Config::load(Some(file.path()));
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }
}
