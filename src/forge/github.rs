//! forge::github
//!
//! GitHub implementation of [`ContentForge`] over the REST contents and
//! git trees endpoints.
//!
//! # Design
//!
//! - `GET/PUT/DELETE /repos/{owner}/{repo}/contents/{path}` for files
//! - `GET /repos/{owner}/{repo}/git/trees/{ref}` for tree listings
//!
//! All requests go through [`HttpTransport`], which owns headers and the
//! timeout. This module decides what a failed status *means* for each
//! operation: the same 422 is a conflict on a write but a plain HTTP error
//! on a read.
//!
//! # Rate Limiting
//!
//! GitHub has rate limits. This implementation:
//! - Returns `ForgeError::RateLimited` when limits are hit
//! - Does not implement automatic retry (caller's responsibility)
//!
//! # Example
//!
//! ```ignore
//! use forgekit::forge::github::GitHubContents;
//! use forgekit::forge::transport::{HttpTransport, DEFAULT_API_BASE, DEFAULT_TIMEOUT};
//!
//! let transport = HttpTransport::new(Some(&token), DEFAULT_API_BASE, DEFAULT_TIMEOUT)?;
//! let forge = GitHubContents::new(transport);
//! let entry = forge.read_file(&"octocat/hello-world".parse()?, &ContentRef::new("README")).await?;
//! ```

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::{debug, warn};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::traits::{
    checked_path, resolve_delete_hash, CommitIdentity, CommitResult, ContentEncoding, ContentForge,
    DeleteFileRequest, EntryKind, FileEntry, ForgeError, TreeEntry, TreeListing,
    WriteFileRequest,
};
use super::transport::{HttpError, HttpTransport};
use super::tree;
use crate::core::types::{ContentRef, RepoCoordinate};

/// Which family of operation a failure came from.
///
/// GitHub reports a missing or stale `sha` on a mutation as 409 or 422;
/// on reads those statuses carry no concurrency meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Read,
    Mutate,
}

/// GitHub content forge.
#[derive(Debug)]
pub struct GitHubContents {
    transport: HttpTransport,
}

impl GitHubContents {
    /// Create a forge over an already-configured transport.
    pub fn new(transport: HttpTransport) -> Self {
        Self { transport }
    }

    /// Path segments for the contents endpoint of `path`.
    fn contents_segments<'a>(repo: &'a RepoCoordinate, path: &'a str) -> Vec<&'a str> {
        let mut segments = vec!["repos", repo.owner(), repo.repo(), "contents"];
        segments.extend(path.split('/'));
        segments
    }

    /// Issue a request and deserialize the response, classifying failures.
    async fn call<T, B>(
        &self,
        method: Method,
        segments: Vec<&str>,
        query: &[(&str, &str)],
        body: Option<&B>,
        operation: Operation,
        subject: &str,
    ) -> Result<T, ForgeError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let value = self
            .transport
            .request(method, segments, query, body)
            .await
            .map_err(|e| classify(e, operation, subject))?;
        parse(value, subject)
    }
}

/// Map a transport failure onto the forge error taxonomy.
fn classify(err: HttpError, operation: Operation, subject: &str) -> ForgeError {
    let exhausted = err.rate_limit_exhausted();
    let (status, body, rate_limit_remaining) = match err {
        HttpError::Status {
            status,
            body,
            rate_limit_remaining,
        } => (status, body, rate_limit_remaining),
        other => return ForgeError::Http(other),
    };
    let message = error_message(&body);

    match (status, operation) {
        (404, _) => ForgeError::NotFound(subject.to_string()),
        (409, _) | (422, Operation::Mutate) => {
            warn!("{}: upstream rejected hash ({}): {}", subject, status, message);
            ForgeError::Conflict { status, message }
        }
        (401, _) => ForgeError::AuthFailed("invalid or expired token".to_string()),
        (429, _) => ForgeError::RateLimited,
        (403, _) if exhausted || message.to_ascii_lowercase().contains("rate limit") => {
            ForgeError::RateLimited
        }
        (403, _) => ForgeError::AuthFailed(format!("permission denied: {}", message)),
        _ => ForgeError::Http(HttpError::Status {
            status,
            body,
            rate_limit_remaining,
        }),
    }
}

/// Pull the `message` field out of a GitHub error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<GitHubErrorResponse>(body)
        .map(|e| e.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

fn parse<T: DeserializeOwned>(value: Value, subject: &str) -> Result<T, ForgeError> {
    serde_json::from_value(value).map_err(|e| ForgeError::Decode(format!("{}: {}", subject, e)))
}

#[async_trait]
impl ContentForge for GitHubContents {
    fn name(&self) -> &'static str {
        "github"
    }

    async fn read_file(
        &self,
        repo: &RepoCoordinate,
        target: &ContentRef,
    ) -> Result<FileEntry, ForgeError> {
        let path = checked_path(target.path())?;
        let query: Vec<(&str, &str)> = target.git_ref().map(|r| ("ref", r)).into_iter().collect();
        let response: ContentsResponse = self
            .call::<_, Value>(
                Method::GET,
                Self::contents_segments(repo, &path),
                &query,
                None,
                Operation::Read,
                &path,
            )
            .await?;

        Ok(match response {
            ContentsResponse::Single(content) => content.into(),
            ContentsResponse::Listing(_) => FileEntry::directory(&path),
        })
    }

    async fn list_directory(
        &self,
        repo: &RepoCoordinate,
        path: &str,
        git_ref: Option<&str>,
    ) -> Result<Vec<FileEntry>, ForgeError> {
        let path = checked_path(path)?;
        let target = ContentRef::new(&path).at_optional(git_ref);
        let query: Vec<(&str, &str)> = target.git_ref().map(|r| ("ref", r)).into_iter().collect();
        let response: ContentsResponse = self
            .call::<_, Value>(
                Method::GET,
                Self::contents_segments(repo, &path),
                &query,
                None,
                Operation::Read,
                &path,
            )
            .await?;

        Ok(response.into_entries())
    }

    async fn write_file(
        &self,
        repo: &RepoCoordinate,
        request: WriteFileRequest,
    ) -> Result<CommitResult, ForgeError> {
        let path = checked_path(&request.path)?;
        if request.prior_hash.is_none() {
            debug!("writing {} without a prior hash", path);
        }

        let body = PutContentsBody {
            message: &request.message,
            content: STANDARD.encode(request.content.as_bytes()),
            branch: request.branch.as_deref(),
            sha: request.prior_hash.as_deref(),
            author: request.author.as_ref(),
            committer: request.committer.as_ref(),
        };

        let response: GitHubCommitResponse = self
            .call(
                Method::PUT,
                Self::contents_segments(repo, &path),
                &[],
                Some(&body),
                Operation::Mutate,
                &path,
            )
            .await?;

        Ok(response.into_commit_result(path))
    }

    async fn delete_file(
        &self,
        repo: &RepoCoordinate,
        request: DeleteFileRequest,
    ) -> Result<CommitResult, ForgeError> {
        let path = checked_path(&request.path)?;
        let sha = resolve_delete_hash(self, repo, &request).await?;

        let body = DeleteContentsBody {
            message: &request.message,
            sha: &sha,
            branch: request.branch.as_deref(),
        };

        let response: GitHubCommitResponse = self
            .call(
                Method::DELETE,
                Self::contents_segments(repo, &path),
                &[],
                Some(&body),
                Operation::Mutate,
                &path,
            )
            .await?;

        Ok(response.into_commit_result(path))
    }

    async fn list_tree(
        &self,
        repo: &RepoCoordinate,
        git_ref: &str,
        recursive: bool,
        path_prefix: Option<&str>,
    ) -> Result<TreeListing, ForgeError> {
        let mut segments = vec!["repos", repo.owner(), repo.repo(), "git", "trees"];
        segments.extend(git_ref.split('/'));
        let query: &[(&str, &str)] = if recursive { &[("recursive", "1")] } else { &[] };

        let response: GitHubTree = self
            .call::<_, Value>(
                Method::GET,
                segments,
                query,
                None,
                Operation::Read,
                git_ref,
            )
            .await?;

        if response.truncated {
            warn!(
                "tree listing for {}@{} was truncated upstream; result is incomplete",
                repo, git_ref
            );
        }

        let entries = response.tree.into_iter().map(TreeEntry::from).collect();
        Ok(TreeListing {
            truncated: response.truncated,
            root_hash: response.sha,
            entries: tree::filter_by_prefix(entries, path_prefix),
        })
    }
}

// --------------------------------------------------------------------------
// API Request/Response Types
// --------------------------------------------------------------------------

/// Request body for creating or updating a file.
#[derive(Serialize)]
struct PutContentsBody<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    author: Option<&'a CommitIdentity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    committer: Option<&'a CommitIdentity>,
}

/// Request body for deleting a file.
#[derive(Serialize)]
struct DeleteContentsBody<'a> {
    message: &'a str,
    sha: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<&'a str>,
}

/// GitHub error response format.
#[derive(Deserialize)]
struct GitHubErrorResponse {
    message: String,
}

/// The contents endpoint answers with an object for a file and an array
/// for a directory.
#[derive(Deserialize)]
#[serde(untagged)]
enum ContentsResponse {
    Listing(Vec<GitHubContent>),
    Single(GitHubContent),
}

impl ContentsResponse {
    fn into_entries(self) -> Vec<FileEntry> {
        match self {
            ContentsResponse::Listing(items) => items.into_iter().map(Into::into).collect(),
            ContentsResponse::Single(item) => vec![item.into()],
        }
    }
}

/// GitHub contents item format.
#[derive(Deserialize)]
struct GitHubContent {
    #[serde(rename = "type")]
    kind: EntryKind,
    name: String,
    path: String,
    sha: String,
    #[serde(default)]
    size: u64,
    encoding: Option<String>,
    content: Option<String>,
    download_url: Option<String>,
}

impl From<GitHubContent> for FileEntry {
    fn from(gh: GitHubContent) -> Self {
        // "none" marks files too large to inline; content is then empty
        let encoding = match gh.encoding.as_deref() {
            Some("base64") => Some(ContentEncoding::Base64),
            _ => None,
        };
        let raw_content = encoding.and(gh.content);

        FileEntry {
            kind: gh.kind,
            name: gh.name,
            path: gh.path,
            content_hash: gh.sha,
            size: gh.size,
            encoding,
            raw_content,
            download_url: gh.download_url,
        }
    }
}

/// Response to a PUT or DELETE on the contents endpoint.
#[derive(Deserialize)]
struct GitHubCommitResponse {
    /// Null after a delete
    content: Option<GitHubContentRef>,
    commit: GitHubCommit,
}

#[derive(Deserialize)]
struct GitHubContentRef {
    path: String,
    sha: String,
}

#[derive(Deserialize)]
struct GitHubCommit {
    sha: String,
    html_url: Option<String>,
}

impl GitHubCommitResponse {
    fn into_commit_result(self, requested_path: String) -> CommitResult {
        let (path, content_hash) = match self.content {
            Some(content) => (content.path, Some(content.sha)),
            None => (requested_path, None),
        };
        CommitResult {
            path,
            content_hash,
            commit_hash: self.commit.sha,
            commit_url: self.commit.html_url.unwrap_or_default(),
        }
    }
}

/// GitHub git tree format.
#[derive(Deserialize)]
struct GitHubTree {
    sha: String,
    #[serde(default)]
    truncated: bool,
    tree: Vec<GitHubTreeItem>,
}

#[derive(Deserialize)]
struct GitHubTreeItem {
    path: String,
    mode: String,
    #[serde(rename = "type")]
    object_type: String,
    sha: String,
    size: Option<u64>,
}

impl From<GitHubTreeItem> for TreeEntry {
    fn from(item: GitHubTreeItem) -> Self {
        TreeEntry {
            kind: tree::entry_kind(&item.object_type, &item.mode),
            path: item.path,
            mode: item.mode,
            content_hash: item.sha,
            size: item.size,
        }
    }
}
