//! forge::factory
//!
//! Forge creation from configuration.
//!
//! Commands use `create_forge()` instead of building a transport and a
//! concrete forge themselves, so they only ever see `dyn ContentForge`.
//!
//! # Example
//!
//! ```ignore
//! use forgekit::core::config::Config;
//! use forgekit::forge::create_forge;
//!
//! let config = Config::load(None)?;
//! let forge = create_forge(&config)?;
//! let listing = forge.list_tree(&repo, "main", true, Some("src")).await?;
//! ```

use log::debug;

use super::github::GitHubContents;
use super::traits::{ContentForge, ForgeError};
use super::transport::HttpTransport;
use crate::core::config::Config;

/// Create the content forge described by `config`.
///
/// # Errors
///
/// `ForgeError::Misconfigured` if no token is configured or the API base
/// is unusable. No network call is made.
pub fn create_forge(config: &Config) -> Result<Box<dyn ContentForge>, ForgeError> {
    let transport = HttpTransport::new(config.token(), config.api_base(), config.timeout())?;
    debug!("using {:?}", transport);
    Ok(Box::new(GitHubContents::new(transport)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::FileConfig;

    fn config(pairs: &'static [(&'static str, &'static str)]) -> Config {
        Config::from_sources(FileConfig::default(), None, |name| {
            pairs
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        })
        .unwrap()
    }

    #[test]
    fn github_with_token() {
        let forge = create_forge(&config(&[("GITHUB_TOKEN", "ghp_test")])).unwrap();
        assert_eq!(forge.name(), "github");
    }

    #[test]
    fn missing_token_is_misconfigured() {
        let result = create_forge(&config(&[]));
        assert!(matches!(result, Err(ForgeError::Misconfigured(_))));
    }
}
