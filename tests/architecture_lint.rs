//! Architecture enforcement tests.
//!
//! Two boundaries are checked on the source tree:
//!
//! 1. **Forge boundary** - command handlers talk to repositories only
//!    through `ContentForge` and `create_forge()`, never through the GitHub
//!    implementation or the HTTP transport.
//! 2. **Environment boundary** - only `core::config` reads the process
//!    environment; everything else receives configuration explicitly.

use std::fs;
use std::path::{Path, PathBuf};

/// Every `.rs` file under `dir`, recursively.
fn rust_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).expect("Failed to read directory") {
        let path = entry.expect("Failed to read entry").path();
        if path.is_dir() {
            files.extend(rust_files(&path));
        } else if path.extension().is_some_and(|e| e == "rs") {
            files.push(path);
        }
    }
    files
}

/// Source with any `#[cfg(test)]` module removed.
fn non_test_source(path: &Path) -> String {
    let content =
        fs::read_to_string(path).unwrap_or_else(|_| panic!("Failed to read {}", path.display()));
    match content.find("#[cfg(test)]") {
        Some(idx) => content[..idx].to_string(),
        None => content,
    }
}

#[test]
fn commands_use_forge_trait_only() {
    let mut violations = Vec::new();

    for path in rust_files(Path::new("src/cli")) {
        let content = non_test_source(&path);
        for forbidden in ["forge::github", "GitHubContents", "forge::transport", "HttpTransport"] {
            if content.contains(forbidden) {
                violations.push(format!("{}: references {}", path.display(), forbidden));
            }
        }
    }

    assert!(
        violations.is_empty(),
        "CLI must go through create_forge()/ContentForge:\n{}",
        violations.join("\n")
    );
}

#[test]
fn only_config_reads_environment() {
    let config_dir = Path::new("src/core/config");
    let mut violations = Vec::new();

    for path in rust_files(Path::new("src")) {
        if path.starts_with(config_dir) {
            continue;
        }
        let content = non_test_source(&path);
        if content.contains("std::env::var") || content.contains("env::var(") {
            violations.push(path.display().to_string());
        }
    }

    assert!(
        violations.is_empty(),
        "environment read outside core::config:\n{}",
        violations.join("\n")
    );
}

#[test]
fn forge_does_not_depend_on_cli() {
    for path in rust_files(Path::new("src/forge")) {
        let content = non_test_source(&path);
        assert!(
            !content.contains("crate::cli"),
            "{} depends on the CLI layer",
            path.display()
        );
    }
}
