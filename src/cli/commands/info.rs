//! cli::commands::info
//!
//! Commands that make no repository calls: `time` and `config`.

use anyhow::Result;
use serde_json::Value;

use crate::clock;
use crate::core::config::Config;

/// Current time in a zone or city.
pub fn time(zone: Option<&str>) -> Result<Value> {
    Ok(serde_json::to_value(clock::current_time(zone))?)
}

/// Effective configuration, secrets redacted.
pub fn config(config: &Config) -> Value {
    config.summary()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_unknown_zone() {
        let value = time(Some("Atlantis")).unwrap();
        assert_eq!(value["timezone"], "UTC");
        assert_eq!(value["resolved"], false);
    }

    #[test]
    fn config_summary_has_api_base() {
        let value = config(&Config::default());
        assert_eq!(value["api_base"], "https://api.github.com");
        assert_eq!(value["token_configured"], false);
    }
}
