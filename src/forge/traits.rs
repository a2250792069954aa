//! forge::traits
//!
//! Content forge trait definition for reading and mutating the file tree
//! of a remote repository.
//!
//! # Design
//!
//! The `ContentForge` trait is async because every operation involves
//! network I/O. All methods return `Result` so callers see structured
//! failures (not found, conflict, rate limit) instead of opaque transport
//! errors.
//!
//! Nothing here caches. Each call is an independent round trip; a caller
//! that wants read-modify-write passes the hash it read back in explicitly.
//!
//! # Optimistic concurrency
//!
//! Every file carries an opaque `content_hash`. Writes and deletes that
//! target an existing file must carry the hash the caller last saw. The
//! forge never compares hashes itself; the upstream service is the
//! authority and a mismatch comes back as [`ForgeError::Conflict`].
//!
//! # Example
//!
//! ```ignore
//! use forgekit::forge::{ContentForge, WriteFileRequest};
//! use forgekit::core::types::{ContentRef, RepoCoordinate};
//!
//! async fn bump(forge: &dyn ContentForge, repo: &RepoCoordinate) -> Result<(), ForgeError> {
//!     let current = forge.read_file(repo, &ContentRef::new("VERSION")).await?;
//!     let commit = forge
//!         .write_file(repo, WriteFileRequest {
//!             path: "VERSION".to_string(),
//!             content: "1.2.4\n".to_string(),
//!             message: "Bump version".to_string(),
//!             prior_hash: Some(current.content_hash),
//!             ..Default::default()
//!         })
//!         .await?;
//!     println!("committed {}", commit.commit_hash);
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::transport::HttpError;
use crate::core::types::{validate_path, ContentRef, RepoCoordinate};

/// Errors from forge operations.
#[derive(Debug, Clone, Error)]
pub enum ForgeError {
    /// Credential or target is missing or unusable. Not retryable.
    #[error("misconfigured: {0}")]
    Misconfigured(String),

    /// The path or ref does not exist upstream.
    #[error("not found: {0}")]
    NotFound(String),

    /// The supplied hash is stale or missing for an existing file.
    #[error("conflict (HTTP {status}): {message}")]
    Conflict {
        /// HTTP status the upstream answered with (409 or 422)
        status: u16,
        /// Upstream message
        message: String,
    },

    /// Authentication failed (invalid token, expired, insufficient permissions).
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// Rate limit exceeded.
    #[error("rate limited")]
    RateLimited,

    /// A file operation was aimed at a directory or submodule.
    #[error("not a file: {0}")]
    NotAFile(String),

    /// The path has a `.` or `..` segment and was not sent upstream.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Any other HTTP failure, with status and body when available.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The upstream answered 2xx with a shape we could not interpret.
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ForgeError {
    /// Stable machine-readable name of the error class.
    pub fn kind(&self) -> &'static str {
        match self {
            ForgeError::Misconfigured(_) => "misconfigured",
            ForgeError::NotFound(_) => "not_found",
            ForgeError::Conflict { .. } => "conflict",
            ForgeError::AuthFailed(_) => "auth_failed",
            ForgeError::RateLimited => "rate_limited",
            ForgeError::NotAFile(_) => "not_a_file",
            ForgeError::InvalidPath(_) => "invalid_path",
            ForgeError::Http(_) => "http_error",
            ForgeError::Decode(_) => "decode_error",
        }
    }

    /// Whether a caller may reasonably retry, possibly after re-reading.
    ///
    /// The forge itself never retries.
    pub fn is_retryable(&self) -> bool {
        match self {
            ForgeError::Conflict { .. } | ForgeError::RateLimited => true,
            ForgeError::Http(HttpError::Network(_)) => true,
            ForgeError::Http(HttpError::Status { status, .. }) => *status >= 500,
            _ => false,
        }
    }

    /// HTTP status behind this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ForgeError::Conflict { status, .. } => Some(*status),
            ForgeError::Http(e) => e.status(),
            ForgeError::NotFound(_) => Some(404),
            _ => None,
        }
    }
}

/// Kind of an entry in a repository tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
    Symlink,
    Submodule,
}

impl EntryKind {
    /// Whether content can be read, written or deleted at this entry.
    pub fn is_file_like(self) -> bool {
        matches!(self, EntryKind::File | EntryKind::Symlink)
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryKind::File => write!(f, "file"),
            EntryKind::Dir => write!(f, "dir"),
            EntryKind::Symlink => write!(f, "symlink"),
            EntryKind::Submodule => write!(f, "submodule"),
        }
    }
}

/// Encoding of inline file content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentEncoding {
    Base64,
}

/// A file or directory as returned by a single-path read or a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    /// Entry kind
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Last path segment
    pub name: String,
    /// Full path inside the repository
    pub path: String,
    /// Opaque version token used for optimistic concurrency
    pub content_hash: String,
    /// Size in bytes (0 for directories)
    pub size: u64,
    /// Encoding of `raw_content`, when present
    pub encoding: Option<ContentEncoding>,
    /// Encoded content exactly as delivered upstream (single-file reads only)
    pub raw_content: Option<String>,
    /// Direct download URL for files
    pub download_url: Option<String>,
}

impl FileEntry {
    /// Describe a directory path the way a single-file read would.
    pub fn directory(path: &str) -> Self {
        FileEntry {
            kind: EntryKind::Dir,
            name: path.rsplit('/').next().unwrap_or_default().to_string(),
            path: path.to_string(),
            content_hash: String::new(),
            size: 0,
            encoding: None,
            raw_content: None,
            download_url: None,
        }
    }

    /// Decode the inline content to bytes.
    ///
    /// Returns `Ok(None)` when the entry carries no content (directories,
    /// listings, or files too large to inline). Base64 payloads are wrapped
    /// at 60 columns upstream; whitespace is ignored.
    pub fn decoded(&self) -> Result<Option<Vec<u8>>, ForgeError> {
        let Some(raw) = self.raw_content.as_deref() else {
            return Ok(None);
        };
        match self.encoding {
            Some(ContentEncoding::Base64) => {
                let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
                STANDARD
                    .decode(compact)
                    .map(Some)
                    .map_err(|e| ForgeError::Decode(format!("{}: {}", self.path, e)))
            }
            None => Ok(Some(raw.as_bytes().to_vec())),
        }
    }

    /// Decode the inline content as UTF-8 text.
    pub fn decoded_text(&self) -> Result<Option<String>, ForgeError> {
        match self.decoded()? {
            Some(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|_| ForgeError::Decode(format!("{} is not valid UTF-8", self.path))),
            None => Ok(None),
        }
    }
}

/// One entry of a recursive tree listing. Never carries content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeEntry {
    pub path: String,
    /// Git file mode (e.g. `100644`, `040000`, `120000`)
    pub mode: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub content_hash: String,
    /// Size in bytes; absent for directories and submodules
    pub size: Option<u64>,
}

/// Result of a tree listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeListing {
    /// Upstream stopped early; the listing is incomplete
    pub truncated: bool,
    /// Hash of the tree that was listed
    pub root_hash: String,
    pub entries: Vec<TreeEntry>,
}

/// Repository state after a write or delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitResult {
    pub path: String,
    /// New content hash; absent after a delete
    pub content_hash: Option<String>,
    pub commit_hash: String,
    pub commit_url: String,
}

/// Author or committer recorded on a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitIdentity {
    pub name: String,
    pub email: String,
}

/// Request to create or update a file.
#[derive(Debug, Clone, Default)]
pub struct WriteFileRequest {
    /// Path inside the repository
    pub path: String,
    /// New file content as text; transmitted base64-encoded
    pub content: String,
    /// Commit message
    pub message: String,
    /// Target branch (upstream default branch if absent)
    pub branch: Option<String>,
    /// Hash of the version being replaced; required when the file exists
    pub prior_hash: Option<String>,
    pub author: Option<CommitIdentity>,
    pub committer: Option<CommitIdentity>,
}

/// Request to delete a file.
#[derive(Debug, Clone, Default)]
pub struct DeleteFileRequest {
    pub path: String,
    pub message: String,
    pub branch: Option<String>,
    /// Hash of the version being deleted; looked up with a read when absent
    pub prior_hash: Option<String>,
}

/// The trait for reading and mutating files in a remote repository.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow use across async tasks.
///
/// # Error Handling
///
/// All methods return `Result<T, ForgeError>`. Callers should handle:
/// - `Misconfigured`: Missing credential; fix configuration
/// - `NotFound`: Path or ref doesn't exist
/// - `Conflict`: Re-read to get the current hash, then retry
/// - `RateLimited`: Back off and retry
/// - `Http`: Inspect status and body
#[async_trait]
pub trait ContentForge: Send + Sync {
    /// Get the forge name (e.g., "github", "mock").
    fn name(&self) -> &'static str;

    /// Read a single path.
    ///
    /// If the path is a directory the result has kind `Dir` and no content;
    /// use [`ContentForge::list_directory`] to see its children.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the path or ref doesn't exist
    async fn read_file(
        &self,
        repo: &RepoCoordinate,
        target: &ContentRef,
    ) -> Result<FileEntry, ForgeError>;

    /// List the entries at a path.
    ///
    /// A file path yields a one-element list, so callers never branch on
    /// the upstream response shape.
    async fn list_directory(
        &self,
        repo: &RepoCoordinate,
        path: &str,
        git_ref: Option<&str>,
    ) -> Result<Vec<FileEntry>, ForgeError>;

    /// Create or update a file.
    ///
    /// Success returns the new content hash and commit; there is no
    /// separate verification read.
    ///
    /// # Errors
    ///
    /// - `Conflict` if `prior_hash` is stale, or missing for an existing file
    async fn write_file(
        &self,
        repo: &RepoCoordinate,
        request: WriteFileRequest,
    ) -> Result<CommitResult, ForgeError>;

    /// Delete a file.
    ///
    /// When `prior_hash` is absent the current hash is read first. The read
    /// and the delete are two separate calls; a change in between surfaces
    /// as `Conflict` and is not retried.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the path doesn't exist (no delete is attempted)
    /// - `NotAFile` if the path is a directory
    /// - `Conflict` if the hash is stale
    async fn delete_file(
        &self,
        repo: &RepoCoordinate,
        request: DeleteFileRequest,
    ) -> Result<CommitResult, ForgeError>;

    /// List the tree at `git_ref`.
    ///
    /// `truncated` is reported exactly as upstream reports it; incomplete
    /// recursive listings are never paginated or retried. `path_prefix`
    /// keeps only entries under that directory.
    async fn list_tree(
        &self,
        repo: &RepoCoordinate,
        git_ref: &str,
        recursive: bool,
        path_prefix: Option<&str>,
    ) -> Result<TreeListing, ForgeError>;
}

/// Normalized path for a contents operation, or `InvalidPath`.
pub(crate) fn checked_path(path: &str) -> Result<String, ForgeError> {
    validate_path(path).map_err(|_| ForgeError::InvalidPath(path.to_string()))
}

/// Resolve the hash a delete should carry.
///
/// Uses the caller's hash when given; otherwise reads the file at the
/// delete's branch. This is the first of delete's two causally ordered
/// calls.
pub(crate) async fn resolve_delete_hash<F>(
    forge: &F,
    repo: &RepoCoordinate,
    request: &DeleteFileRequest,
) -> Result<String, ForgeError>
where
    F: ContentForge + ?Sized,
{
    if let Some(hash) = request.prior_hash.as_deref().filter(|h| !h.is_empty()) {
        return Ok(hash.to_string());
    }

    let target = ContentRef::new(&request.path).at_optional(request.branch.as_deref());
    let current = forge.read_file(repo, &target).await?;
    if !current.kind.is_file_like() {
        return Err(ForgeError::NotAFile(format!(
            "{} is a {}",
            target.path(),
            current.kind
        )));
    }
    Ok(current.content_hash)
}
