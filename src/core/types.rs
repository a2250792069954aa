//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`RepoCoordinate`] - Validated `owner/repo` pair identifying a remote repository
//! - [`ContentRef`] - A path inside a repository, optionally pinned to a revision
//!
//! # Validation
//!
//! These types enforce validity at construction time. A coordinate that
//! cannot address a repository is rejected before any request is built.
//!
//! # Examples
//!
//! ```
//! use forgekit::core::types::{ContentRef, RepoCoordinate};
//!
//! let repo: RepoCoordinate = "octocat/hello-world".parse().unwrap();
//! assert_eq!(repo.owner(), "octocat");
//!
//! let target = ContentRef::new("/src/lib.rs").at("main");
//! assert_eq!(target.path(), "src/lib.rs");
//! assert_eq!(target.git_ref(), Some("main"));
//!
//! assert!("not-a-coordinate".parse::<RepoCoordinate>().is_err());
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid repository coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("invalid repository path (contains a `.` or `..` segment): {0}")]
    InvalidPath(String),
}

/// Identifies a remote repository by owner and name.
///
/// Owner and name must be non-empty and may not contain `/` or whitespace.
///
/// # Example
///
/// ```
/// use forgekit::core::types::RepoCoordinate;
///
/// let repo = RepoCoordinate::new("octocat", "hello-world").unwrap();
/// assert_eq!(repo.to_string(), "octocat/hello-world");
///
/// assert!(RepoCoordinate::new("", "repo").is_err());
/// assert!(RepoCoordinate::new("owner", "has space").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoCoordinate {
    owner: String,
    repo: String,
}

impl RepoCoordinate {
    /// Create a validated coordinate.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidCoordinate` if either part is empty or
    /// contains `/` or whitespace.
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Result<Self, TypeError> {
        let owner = owner.into();
        let repo = repo.into();
        Self::validate_part("owner", &owner)?;
        Self::validate_part("repository name", &repo)?;
        Ok(Self { owner, repo })
    }

    fn validate_part(what: &str, value: &str) -> Result<(), TypeError> {
        if value.is_empty() {
            return Err(TypeError::InvalidCoordinate(format!(
                "{} cannot be empty",
                what
            )));
        }
        if value.contains('/') || value.chars().any(char::is_whitespace) {
            return Err(TypeError::InvalidCoordinate(format!(
                "{} '{}' cannot contain '/' or whitespace",
                what, value
            )));
        }
        Ok(())
    }

    /// Parse a coordinate from a GitHub remote URL.
    ///
    /// Supports both SSH and HTTPS formats:
    /// - `git@github.com:owner/repo.git`
    /// - `https://github.com/owner/repo.git`
    /// - `https://github.com/owner/repo`
    ///
    /// # Example
    ///
    /// ```
    /// use forgekit::core::types::RepoCoordinate;
    ///
    /// let repo = RepoCoordinate::from_remote_url("git@github.com:octocat/hello-world.git").unwrap();
    /// assert_eq!(repo.repo(), "hello-world");
    /// ```
    pub fn from_remote_url(url: &str) -> Option<Self> {
        let rest = url
            .strip_prefix("git@github.com:")
            .or_else(|| url.strip_prefix("https://github.com/"))
            .or_else(|| url.strip_prefix("http://github.com/"))?;
        let rest = rest.strip_suffix(".git").unwrap_or(rest);
        let (owner, repo) = rest.split_once('/')?;
        Self::new(owner, repo).ok()
    }

    /// Get the repository owner.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Get the repository name.
    pub fn repo(&self) -> &str {
        &self.repo
    }
}

impl FromStr for RepoCoordinate {
    type Err = TypeError;

    /// Accepts `owner/repo` or any URL understood by [`RepoCoordinate::from_remote_url`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(coord) = Self::from_remote_url(s) {
            return Ok(coord);
        }
        match s.split_once('/') {
            Some((owner, repo)) => Self::new(owner, repo),
            None => Err(TypeError::InvalidCoordinate(format!(
                "expected 'owner/repo', got '{}'",
                s
            ))),
        }
    }
}

impl fmt::Display for RepoCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// A file or directory path inside a repository, optionally pinned to a ref.
///
/// The path is stored without leading or trailing `/`; the empty path
/// addresses the repository root. When no ref is given the upstream
/// default branch is used.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContentRef {
    path: String,
    git_ref: Option<String>,
}

impl ContentRef {
    /// Address `path` at the default branch.
    pub fn new(path: impl AsRef<str>) -> Self {
        Self {
            path: normalize_path(path.as_ref()),
            git_ref: None,
        }
    }

    /// Pin to a branch, tag or commit.
    pub fn at(mut self, git_ref: impl Into<String>) -> Self {
        self.git_ref = Some(git_ref.into());
        self
    }

    /// Pin to a ref if one is given; blank refs are treated as absent.
    pub fn at_optional(mut self, git_ref: Option<&str>) -> Self {
        self.git_ref = git_ref
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn git_ref(&self) -> Option<&str> {
        self.git_ref.as_deref()
    }
}

/// Strip surrounding whitespace and `/` from a repository path.
pub fn normalize_path(path: &str) -> String {
    path.trim().trim_matches('/').to_string()
}

/// Normalize a repository path, rejecting `.` and `..` segments.
///
/// URL building collapses dot segments, so `docs/../secret.txt` would
/// otherwise address `secret.txt`.
///
/// ```
/// use forgekit::core::types::validate_path;
///
/// assert_eq!(validate_path("/docs/a.md").unwrap(), "docs/a.md");
/// assert!(validate_path("docs/../secret.txt").is_err());
/// ```
pub fn validate_path(path: &str) -> Result<String, TypeError> {
    let normalized = normalize_path(path);
    if normalized.split('/').any(|s| s == "." || s == "..") {
        return Err(TypeError::InvalidPath(path.to_string()));
    }
    Ok(normalized)
}
