//! ui::output
//!
//! Output formatting and logger setup.
//!
//! # Design
//!
//! stdout carries exactly one JSON document per invocation, success or
//! failure. Everything else (logs, the `error:` line) goes to stderr.

use std::io::Write;
use std::sync::Once;

use serde::Serialize;
use serde_json::{json, Value};

use crate::core::config::ConfigError;
use crate::core::types::TypeError;
use crate::deploy::DeployError;
use crate::forge::ForgeError;

static INIT_LOGGER: Once = Once::new();

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Errors only
    Quiet,
    /// Warnings and errors
    Normal,
    /// Everything from this crate at debug level
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }

    /// Default `env_logger` filter. `RUST_LOG` takes precedence.
    pub fn filter(self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "warn",
            Verbosity::Debug => "warn,forgekit=debug",
        }
    }
}

/// Initialise the global logger on stderr. Later calls are ignored.
pub fn init_logger(verbosity: Verbosity) {
    INIT_LOGGER.call_once(|| {
        let env = env_logger::Env::default().default_filter_or(verbosity.filter());
        env_logger::Builder::from_env(env)
            .target(env_logger::Target::Stderr)
            .format(|buf, record| {
                writeln!(
                    buf,
                    "[{}] [{}] {}",
                    record.level(),
                    record.target(),
                    record.args()
                )
            })
            .init();
    });
}

/// Print a document to stdout as pretty JSON.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{}", text)?;
    Ok(())
}

/// Stable kind for an error chain, from the first typed error found.
pub fn error_kind(err: &anyhow::Error) -> &'static str {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<ForgeError>() {
            return e.kind();
        }
        if let Some(e) = cause.downcast_ref::<DeployError>() {
            return e.kind();
        }
        if cause.downcast_ref::<ConfigError>().is_some() {
            return "config_error";
        }
        if cause.downcast_ref::<TypeError>().is_some() {
            return "invalid_argument";
        }
    }
    "error"
}

/// Failure document printed on stdout.
pub fn error_document(err: &anyhow::Error) -> Value {
    json!({
        "ok": false,
        "error": {
            "kind": error_kind(err),
            "message": format!("{:#}", err),
        }
    })
}
