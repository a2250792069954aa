//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Takes already-resolved inputs (forge, repository, config)
//! 2. Calls the library
//! 3. Returns the JSON document to print
//!
//! Printing and exit codes are handled by [`crate::cli::run`].

mod deploy;
mod files;
mod info;

pub use deploy::{deploy, DeployArgs};
pub use files::{delete, ls, read, tree, write, WriteOptions};
pub use info::{config, time};

use std::io::Read as _;
use std::path::Path;

use anyhow::{Context as _, Result};
use serde_json::Value;

use crate::cli::args::Command;
use crate::core::config::Config;
use crate::forge::{create_forge, CommitIdentity};

/// Dispatch a command to its handler.
pub async fn dispatch(command: Command, config: &Config) -> Result<Value> {
    match command {
        Command::Read {
            repo,
            path,
            git_ref,
            text,
        } => {
            let repo = repo.resolve(config.default_repo())?;
            let forge = create_forge(config)?;
            files::read(forge.as_ref(), &repo, &path, git_ref.as_deref(), text).await
        }
        Command::Ls {
            repo,
            path,
            git_ref,
        } => {
            let repo = repo.resolve(config.default_repo())?;
            let forge = create_forge(config)?;
            files::ls(forge.as_ref(), &repo, &path, git_ref.as_deref()).await
        }
        Command::Write {
            repo,
            path,
            content,
            file,
            message,
            branch,
            sha,
            author_name,
            author_email,
            committer_name,
            committer_email,
        } => {
            let repo = repo.resolve(config.default_repo())?;
            let forge = create_forge(config)?;
            let content = read_content(content, file.as_deref())?;
            let options = WriteOptions {
                message,
                branch,
                sha,
                author: identity(author_name, author_email),
                committer: identity(committer_name, committer_email),
            };
            files::write(forge.as_ref(), &repo, &path, content, options).await
        }
        Command::Delete {
            repo,
            path,
            message,
            branch,
            sha,
        } => {
            let repo = repo.resolve(config.default_repo())?;
            let forge = create_forge(config)?;
            files::delete(forge.as_ref(), &repo, &path, message, branch, sha).await
        }
        Command::Tree {
            repo,
            git_ref,
            recursive,
            prefix,
        } => {
            let repo = repo.resolve(config.default_repo())?;
            let forge = create_forge(config)?;
            files::tree(forge.as_ref(), &repo, &git_ref, recursive, prefix.as_deref()).await
        }
        Command::Deploy {
            url,
            service_id,
            key,
            method,
            timeout,
        } => {
            let args = DeployArgs {
                url,
                service_id,
                key,
                method,
                timeout,
            };
            deploy::deploy(config, args).await
        }
        Command::Time { zone } => info::time(zone.as_deref()),
        Command::Config => Ok(info::config(config)),
    }
}

/// A commit identity when both name and email are given.
fn identity(name: Option<String>, email: Option<String>) -> Option<CommitIdentity> {
    match (name, email) {
        (Some(name), Some(email)) => Some(CommitIdentity { name, email }),
        _ => None,
    }
}

/// New file content from `--content`, `--file`, or stdin.
fn read_content(content: Option<String>, file: Option<&Path>) -> Result<String> {
    if let Some(content) = content {
        return Ok(content);
    }
    if let Some(path) = file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("reading content from {}", path.display()));
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("reading content from stdin")?;
    Ok(buf)
}
