//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--config <path>`: Use this config file
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Errors only on stderr

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};

use crate::core::types::RepoCoordinate;

/// forgekit - repository files and deploy hooks for automation agents
#[derive(Parser, Debug)]
#[command(name = "fk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (overrides $FORGEKIT_CONFIG and the default locations)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Repository selection shared by the repository commands.
#[derive(Args, Debug, Clone, Default)]
pub struct RepoArgs {
    /// Repository as OWNER/REPO or a GitHub URL
    #[arg(long, value_name = "OWNER/REPO", conflicts_with_all = ["owner", "name"])]
    pub repo: Option<String>,

    /// Repository owner (with --name)
    #[arg(long, requires = "name")]
    pub owner: Option<String>,

    /// Repository name (with --owner)
    #[arg(long, requires = "owner")]
    pub name: Option<String>,
}

impl RepoArgs {
    /// Resolve to a coordinate, falling back to the configured default.
    pub fn resolve(&self, default: Option<RepoCoordinate>) -> Result<RepoCoordinate> {
        if let Some(repo) = &self.repo {
            return Ok(repo.parse()?);
        }
        if let (Some(owner), Some(name)) = (&self.owner, &self.name) {
            return Ok(RepoCoordinate::new(owner.as_str(), name.as_str())?);
        }
        match default {
            Some(repo) => Ok(repo),
            None => bail!("no repository given: pass --repo OWNER/REPO or set default_repo in config"),
        }
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Read a file (or describe a directory)
    #[command(after_help = "\
EXAMPLES:
    fk read README.md --repo octocat/hello-world
    fk read src/lib.rs --repo octocat/hello-world --ref main --text")]
    Read {
        #[command(flatten)]
        repo: RepoArgs,

        /// Path inside the repository
        path: String,

        /// Branch, tag or commit (default branch if omitted)
        #[arg(long = "ref", value_name = "REF")]
        git_ref: Option<String>,

        /// Include the decoded UTF-8 text alongside the raw content
        #[arg(long)]
        text: bool,
    },

    /// List a directory
    Ls {
        #[command(flatten)]
        repo: RepoArgs,

        /// Directory path (repository root if omitted)
        #[arg(default_value = "")]
        path: String,

        /// Branch, tag or commit
        #[arg(long = "ref", value_name = "REF")]
        git_ref: Option<String>,
    },

    /// Create or update a file
    #[command(after_help = "\
EXAMPLES:
    # Create a new file
    fk write notes.md --content 'hello' -m 'Add notes' --repo me/repo

    # Update an existing file (hash from a previous read)
    fk write notes.md --file ./notes.md -m 'Update notes' --sha 3d21ec53a331a6f037a91c368710b99387d012c1

CONCURRENCY:
    Updating an existing file requires --sha with the hash from your last read.
    A stale hash fails with kind \"conflict\"; read again and retry.")]
    Write {
        #[command(flatten)]
        repo: RepoArgs,

        /// Path inside the repository
        path: String,

        /// New content (reads stdin if neither --content nor --file is given)
        #[arg(long, conflicts_with = "file")]
        content: Option<String>,

        /// Read new content from a local file
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,

        /// Commit message
        #[arg(short, long)]
        message: String,

        /// Target branch
        #[arg(long)]
        branch: Option<String>,

        /// Hash of the version being replaced
        #[arg(long, value_name = "HASH")]
        sha: Option<String>,

        /// Author name (with --author-email)
        #[arg(long, requires = "author_email")]
        author_name: Option<String>,

        /// Author email (with --author-name)
        #[arg(long, requires = "author_name")]
        author_email: Option<String>,

        /// Committer name (with --committer-email)
        #[arg(long, requires = "committer_email")]
        committer_name: Option<String>,

        /// Committer email (with --committer-name)
        #[arg(long, requires = "committer_name")]
        committer_email: Option<String>,
    },

    /// Delete a file
    Delete {
        #[command(flatten)]
        repo: RepoArgs,

        /// Path inside the repository
        path: String,

        /// Commit message
        #[arg(short, long)]
        message: String,

        /// Target branch
        #[arg(long)]
        branch: Option<String>,

        /// Hash of the version being deleted (read first if omitted)
        #[arg(long, value_name = "HASH")]
        sha: Option<String>,
    },

    /// List the git tree at a ref
    Tree {
        #[command(flatten)]
        repo: RepoArgs,

        /// Branch, tag or tree hash
        #[arg(long = "ref", value_name = "REF", default_value = "HEAD")]
        git_ref: String,

        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,

        /// Only keep entries under this directory
        #[arg(long, value_name = "DIR")]
        prefix: Option<String>,
    },

    /// Trigger a deploy hook
    #[command(after_help = "\
TARGET RESOLUTION (first match wins):
    1. --url
    2. --service-id and --key (or RENDER_SERVICE_ID and RENDER_DEPLOY_KEY)
    3. DEPLOY_HOOK_URL")]
    Deploy {
        /// Hook URL
        #[arg(long)]
        url: Option<String>,

        /// Render service id
        #[arg(long)]
        service_id: Option<String>,

        /// Render deploy key
        #[arg(long)]
        key: Option<String>,

        /// GET or POST
        #[arg(long)]
        method: Option<String>,

        /// Request timeout in seconds
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
    },

    /// Show the current time in a timezone or city
    Time {
        /// IANA zone or city name (UTC if omitted)
        zone: Option<String>,
    },

    /// Show the effective configuration (secrets redacted)
    Config,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    mod repo_args {
        use super::*;

        #[test]
        fn repo_flag() {
            let args = RepoArgs {
                repo: Some("octocat/hello".into()),
                ..Default::default()
            };
            assert_eq!(args.resolve(None).unwrap().to_string(), "octocat/hello");
        }

        #[test]
        fn owner_and_name() {
            let args = RepoArgs {
                owner: Some("octocat".into()),
                name: Some("hello".into()),
                ..Default::default()
            };
            assert_eq!(args.resolve(None).unwrap().to_string(), "octocat/hello");
        }

        #[test]
        fn default_from_config() {
            let default = RepoCoordinate::new("me", "notes").unwrap();
            let args = RepoArgs::default();
            assert_eq!(args.resolve(Some(default.clone())).unwrap(), default);
        }

        #[test]
        fn nothing_given() {
            assert!(RepoArgs::default().resolve(None).is_err());
        }

        #[test]
        fn invalid_repo() {
            let args = RepoArgs {
                repo: Some("no-slash".into()),
                ..Default::default()
            };
            assert!(args.resolve(None).is_err());
        }
    }

    mod parsing {
        use super::*;

        #[test]
        fn tree_defaults() {
            let cli = Cli::try_parse_from(["fk", "tree", "--repo", "a/b"]).unwrap();
            match cli.command {
                Command::Tree {
                    git_ref,
                    recursive,
                    prefix,
                    ..
                } => {
                    assert_eq!(git_ref, "HEAD");
                    assert!(!recursive);
                    assert!(prefix.is_none());
                }
                other => panic!("unexpected command {:?}", other),
            }
        }

        #[test]
        fn write_requires_message() {
            assert!(Cli::try_parse_from(["fk", "write", "a.txt", "--content", "x"]).is_err());
        }

        #[test]
        fn committer_flags() {
            let cli = Cli::try_parse_from([
                "fk",
                "write",
                "a.txt",
                "-m",
                "m",
                "--committer-name",
                "Bot",
                "--committer-email",
                "bot@example.com",
            ])
            .unwrap();
            match cli.command {
                Command::Write {
                    committer_name,
                    committer_email,
                    author_name,
                    ..
                } => {
                    assert_eq!(committer_name.as_deref(), Some("Bot"));
                    assert_eq!(committer_email.as_deref(), Some("bot@example.com"));
                    assert!(author_name.is_none());
                }
                other => panic!("unexpected command {:?}", other),
            }
        }

        #[test]
        fn committer_flags_come_in_pairs() {
            assert!(Cli::try_parse_from([
                "fk", "write", "a.txt", "-m", "m", "--committer-name", "Bot"
            ])
            .is_err());
            assert!(Cli::try_parse_from([
                "fk",
                "write",
                "a.txt",
                "-m",
                "m",
                "--committer-email",
                "bot@example.com"
            ])
            .is_err());
        }

        #[test]
        fn global_flags_after_subcommand() {
            let cli = Cli::try_parse_from(["fk", "time", "Berlin", "--debug"]).unwrap();
            assert!(cli.debug);
        }
    }
}
