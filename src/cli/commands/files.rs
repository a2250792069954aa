//! cli::commands::files
//!
//! Repository file commands: read, ls, write, delete, tree.
//!
//! Handlers take any [`ContentForge`] so they run the same against GitHub
//! and the mock.

use anyhow::{Context as _, Result};
use serde_json::{json, Value};

use crate::core::types::{ContentRef, RepoCoordinate};
use crate::forge::{CommitIdentity, ContentForge, DeleteFileRequest, WriteFileRequest};

/// Read one path. With `text`, adds the decoded content as `text`.
pub async fn read(
    forge: &dyn ContentForge,
    repo: &RepoCoordinate,
    path: &str,
    git_ref: Option<&str>,
    text: bool,
) -> Result<Value> {
    let target = ContentRef::new(path).at_optional(git_ref);
    let entry = forge
        .read_file(repo, &target)
        .await
        .with_context(|| format!("reading {} in {}", target.path(), repo))?;

    let mut value = serde_json::to_value(&entry)?;
    if text {
        value["text"] = json!(entry.decoded_text()?);
    }
    Ok(value)
}

/// List a directory.
pub async fn ls(
    forge: &dyn ContentForge,
    repo: &RepoCoordinate,
    path: &str,
    git_ref: Option<&str>,
) -> Result<Value> {
    let entries = forge
        .list_directory(repo, path, git_ref)
        .await
        .with_context(|| format!("listing '{}' in {}", path, repo))?;
    Ok(json!({ "entries": entries }))
}

/// Options for [`write`] beyond path and content.
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    pub message: String,
    pub branch: Option<String>,
    pub sha: Option<String>,
    pub author: Option<CommitIdentity>,
    pub committer: Option<CommitIdentity>,
}

/// Create or update a file.
pub async fn write(
    forge: &dyn ContentForge,
    repo: &RepoCoordinate,
    path: &str,
    content: String,
    options: WriteOptions,
) -> Result<Value> {
    let request = WriteFileRequest {
        path: path.to_string(),
        content,
        message: options.message,
        branch: options.branch,
        prior_hash: options.sha,
        author: options.author,
        committer: options.committer,
    };
    let result = forge
        .write_file(repo, request)
        .await
        .with_context(|| format!("writing {} in {}", path, repo))?;
    Ok(serde_json::to_value(result)?)
}

/// Delete a file, reading its hash first when `sha` is absent.
pub async fn delete(
    forge: &dyn ContentForge,
    repo: &RepoCoordinate,
    path: &str,
    message: String,
    branch: Option<String>,
    sha: Option<String>,
) -> Result<Value> {
    let request = DeleteFileRequest {
        path: path.to_string(),
        message,
        branch,
        prior_hash: sha,
    };
    let result = forge
        .delete_file(repo, request)
        .await
        .with_context(|| format!("deleting {} in {}", path, repo))?;
    Ok(serde_json::to_value(result)?)
}

/// List the tree at a ref.
pub async fn tree(
    forge: &dyn ContentForge,
    repo: &RepoCoordinate,
    git_ref: &str,
    recursive: bool,
    prefix: Option<&str>,
) -> Result<Value> {
    let listing = forge
        .list_tree(repo, git_ref, recursive, prefix)
        .await
        .with_context(|| format!("listing tree {} of {}", git_ref, repo))?;
    Ok(serde_json::to_value(listing)?)
}
