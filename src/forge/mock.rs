//! forge::mock
//!
//! Mock content forge for deterministic testing.
//!
//! # Design
//!
//! The mock forge keeps a single in-memory revision of one repository's
//! files and implements the same concurrency rules the real service
//! enforces: a write or delete against an existing file must carry its
//! current hash, otherwise it fails with `Conflict`. Every call is recorded
//! so tests can assert on the exact sequence of upstream requests, and any
//! operation can be configured to fail.
//!
//! Branches and refs are recorded but not modelled; all reads and writes
//! see the same revision.
//!
//! # Example
//!
//! ```
//! use forgekit::core::types::{ContentRef, RepoCoordinate};
//! use forgekit::forge::mock::MockForge;
//! use forgekit::forge::{ContentForge, WriteFileRequest};
//!
//! # tokio_test_block_on(async {
//! let forge = MockForge::new().with_file("README.md", "hello\n");
//! let repo: RepoCoordinate = "octocat/hello".parse().unwrap();
//!
//! let current = forge.read_file(&repo, &ContentRef::new("README.md")).await.unwrap();
//! let commit = forge
//!     .write_file(&repo, WriteFileRequest {
//!         path: "README.md".to_string(),
//!         content: "hello again\n".to_string(),
//!         message: "Update README".to_string(),
//!         prior_hash: Some(current.content_hash.clone()),
//!         ..Default::default()
//!     })
//!     .await
//!     .unwrap();
//!
//! assert_ne!(commit.content_hash.as_deref(), Some(current.content_hash.as_str()));
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use super::traits::{
    checked_path, resolve_delete_hash, CommitResult, ContentEncoding, ContentForge, DeleteFileRequest,
    EntryKind, FileEntry, ForgeError, TreeEntry, TreeListing, WriteFileRequest,
};
use super::tree;
use crate::core::types::{normalize_path, ContentRef, RepoCoordinate};

/// Mock forge for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share state.
#[derive(Debug, Clone)]
pub struct MockForge {
    /// Internal state shared across clones.
    inner: Arc<Mutex<MockForgeInner>>,
}

/// Internal mutable state.
#[derive(Debug)]
struct MockForgeInner {
    /// Stored files by normalised path.
    files: BTreeMap<String, MockFile>,
    /// Counter used to mint hashes.
    revision: u64,
    /// Whether tree listings report themselves truncated.
    truncated: bool,
    /// Method to fail on (for testing error paths).
    fail_on: Option<FailOn>,
    /// Recorded operations for verification.
    operations: Vec<MockOperation>,
}

#[derive(Debug, Clone)]
struct MockFile {
    content: String,
    hash: String,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    /// Fail read_file with the given error.
    ReadFile(ForgeError),
    /// Fail list_directory with the given error.
    ListDirectory(ForgeError),
    /// Fail write_file with the given error.
    WriteFile(ForgeError),
    /// Fail the delete request of delete_file (after any hash lookup).
    DeleteFile(ForgeError),
    /// Fail list_tree with the given error.
    ListTree(ForgeError),
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    ReadFile {
        path: String,
        git_ref: Option<String>,
    },
    ListDirectory {
        path: String,
        git_ref: Option<String>,
    },
    WriteFile {
        path: String,
        branch: Option<String>,
        prior_hash: Option<String>,
    },
    /// The delete request itself, with the hash it carried.
    DeleteFile {
        path: String,
        branch: Option<String>,
        hash: String,
    },
    ListTree {
        git_ref: String,
        recursive: bool,
        path_prefix: Option<String>,
    },
}

impl MockForge {
    /// Create a new empty mock forge.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockForgeInner {
                files: BTreeMap::new(),
                revision: 0,
                truncated: false,
                fail_on: None,
                operations: Vec::new(),
            })),
        }
    }

    /// Seed a file.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            let hash = inner.next_hash();
            inner.files.insert(
                normalize_path(path),
                MockFile {
                    content: content.to_string(),
                    hash,
                },
            );
        }
        self
    }

    /// Make tree listings report `truncated: true`.
    pub fn with_truncated_tree(self) -> Self {
        self.inner.lock().unwrap().truncated = true;
        self
    }

    /// Configure the mock to fail on a specific operation.
    ///
    /// # Example
    ///
    /// ```
    /// use forgekit::forge::mock::{MockForge, FailOn};
    /// use forgekit::forge::ForgeError;
    ///
    /// let forge = MockForge::new()
    ///     .fail_on(FailOn::ReadFile(ForgeError::RateLimited));
    /// ```
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.fail_on = Some(fail_on);
        }
        self
    }

    /// Clear the failure configuration.
    pub fn clear_fail_on(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_on = None;
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<MockOperation> {
        let inner = self.inner.lock().unwrap();
        inner.operations.clone()
    }

    /// Clear recorded operations.
    pub fn clear_operations(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.clear();
    }

    /// Current content of a file (for test verification).
    pub fn file_content(&self, path: &str) -> Option<String> {
        let inner = self.inner.lock().unwrap();
        inner
            .files
            .get(&normalize_path(path))
            .map(|f| f.content.clone())
    }

    /// Current hash of a file (for test verification).
    pub fn file_hash(&self, path: &str) -> Option<String> {
        let inner = self.inner.lock().unwrap();
        inner.files.get(&normalize_path(path)).map(|f| f.hash.clone())
    }

    /// Record an operation.
    fn record(&self, op: MockOperation) {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.push(op);
    }

    /// Check if we should fail and return the error if so.
    fn check_fail(&self, expected: &str) -> Result<(), ForgeError> {
        let inner = self.inner.lock().unwrap();
        match &inner.fail_on {
            Some(FailOn::ReadFile(e)) if expected == "read_file" => Err(e.clone()),
            Some(FailOn::ListDirectory(e)) if expected == "list_directory" => Err(e.clone()),
            Some(FailOn::WriteFile(e)) if expected == "write_file" => Err(e.clone()),
            Some(FailOn::DeleteFile(e)) if expected == "delete_file" => Err(e.clone()),
            Some(FailOn::ListTree(e)) if expected == "list_tree" => Err(e.clone()),
            _ => Ok(()),
        }
    }
}

impl Default for MockForge {
    fn default() -> Self {
        Self::new()
    }
}

impl MockForgeInner {
    fn next_hash(&mut self) -> String {
        self.revision += 1;
        format!("{:040x}", self.revision)
    }

    fn next_commit(&mut self) -> String {
        self.revision += 1;
        format!("c{:039x}", self.revision)
    }

    /// Directories implied by the stored file paths.
    fn directories(&self) -> BTreeSet<String> {
        let mut dirs = BTreeSet::new();
        for path in self.files.keys() {
            let mut segments: Vec<&str> = path.split('/').collect();
            segments.pop();
            while !segments.is_empty() {
                dirs.insert(segments.join("/"));
                segments.pop();
            }
        }
        dirs
    }

    fn file_entry(&self, path: &str, file: &MockFile, inline: bool) -> FileEntry {
        FileEntry {
            kind: EntryKind::File,
            name: path.rsplit('/').next().unwrap_or_default().to_string(),
            path: path.to_string(),
            content_hash: file.hash.clone(),
            size: file.content.len() as u64,
            encoding: inline.then_some(ContentEncoding::Base64),
            raw_content: inline.then(|| STANDARD.encode(file.content.as_bytes())),
            download_url: Some(format!("https://raw.example.invalid/{}", path)),
        }
    }

    fn commit(&mut self, path: String, content_hash: Option<String>) -> CommitResult {
        let commit_hash = self.next_commit();
        CommitResult {
            path,
            content_hash,
            commit_url: format!("https://example.invalid/commit/{}", commit_hash),
            commit_hash,
        }
    }
}

/// Whether `path` is an immediate child of `dir` (the root when `dir` is empty).
fn is_child(path: &str, dir: &str) -> bool {
    let rest = if dir.is_empty() {
        Some(path)
    } else {
        path.strip_prefix(dir).and_then(|r| r.strip_prefix('/'))
    };
    rest.is_some_and(|r| !r.is_empty() && !r.contains('/'))
}

#[async_trait]
impl ContentForge for MockForge {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn read_file(
        &self,
        _repo: &RepoCoordinate,
        target: &ContentRef,
    ) -> Result<FileEntry, ForgeError> {
        checked_path(target.path())?;
        self.record(MockOperation::ReadFile {
            path: target.path().to_string(),
            git_ref: target.git_ref().map(str::to_string),
        });
        self.check_fail("read_file")?;

        let inner = self.inner.lock().unwrap();
        let path = target.path();
        if let Some(file) = inner.files.get(path) {
            return Ok(inner.file_entry(path, file, true));
        }
        if path.is_empty() || inner.directories().contains(path) {
            return Ok(FileEntry::directory(path));
        }
        Err(ForgeError::NotFound(path.to_string()))
    }

    async fn list_directory(
        &self,
        _repo: &RepoCoordinate,
        path: &str,
        git_ref: Option<&str>,
    ) -> Result<Vec<FileEntry>, ForgeError> {
        let path = checked_path(path)?;
        self.record(MockOperation::ListDirectory {
            path: path.clone(),
            git_ref: git_ref.map(str::to_string),
        });
        self.check_fail("list_directory")?;

        let inner = self.inner.lock().unwrap();
        if let Some(file) = inner.files.get(&path) {
            return Ok(vec![inner.file_entry(&path, file, false)]);
        }

        let dirs = inner.directories();
        if !path.is_empty() && !dirs.contains(&path) {
            return Err(ForgeError::NotFound(path));
        }

        let mut entries: Vec<FileEntry> = dirs
            .iter()
            .filter(|d| is_child(d, &path))
            .map(|d| FileEntry::directory(d))
            .collect();
        entries.extend(
            inner
                .files
                .iter()
                .filter(|(p, _)| is_child(p, &path))
                .map(|(p, f)| inner.file_entry(p, f, false)),
        );
        Ok(entries)
    }

    async fn write_file(
        &self,
        _repo: &RepoCoordinate,
        request: WriteFileRequest,
    ) -> Result<CommitResult, ForgeError> {
        let path = checked_path(&request.path)?;
        self.record(MockOperation::WriteFile {
            path: path.clone(),
            branch: request.branch.clone(),
            prior_hash: request.prior_hash.clone(),
        });
        self.check_fail("write_file")?;

        let mut inner = self.inner.lock().unwrap();
        if inner.directories().contains(&path) {
            return Err(ForgeError::NotAFile(path));
        }

        match (inner.files.get(&path), request.prior_hash.as_deref()) {
            (Some(_), None) => {
                return Err(ForgeError::Conflict {
                    status: 422,
                    message: "\"sha\" wasn't supplied.".to_string(),
                })
            }
            (Some(existing), Some(prior)) if existing.hash != prior => {
                return Err(ForgeError::Conflict {
                    status: 409,
                    message: format!("{} does not match {}", path, prior),
                })
            }
            (None, Some(prior)) => {
                return Err(ForgeError::Conflict {
                    status: 409,
                    message: format!("{} does not exist at {}", path, prior),
                })
            }
            _ => {}
        }

        let hash = inner.next_hash();
        inner.files.insert(
            path.clone(),
            MockFile {
                content: request.content,
                hash: hash.clone(),
            },
        );
        Ok(inner.commit(path, Some(hash)))
    }

    async fn delete_file(
        &self,
        repo: &RepoCoordinate,
        request: DeleteFileRequest,
    ) -> Result<CommitResult, ForgeError> {
        let path = checked_path(&request.path)?;
        let hash = resolve_delete_hash(self, repo, &request).await?;

        self.record(MockOperation::DeleteFile {
            path: path.clone(),
            branch: request.branch.clone(),
            hash: hash.clone(),
        });
        self.check_fail("delete_file")?;

        let mut inner = self.inner.lock().unwrap();
        let current = inner.files.get(&path).map(|f| f.hash.clone());
        match current {
            None => Err(ForgeError::NotFound(path)),
            Some(existing) if existing != hash => Err(ForgeError::Conflict {
                status: 409,
                message: format!("{} does not match {}", path, hash),
            }),
            Some(_) => {
                inner.files.remove(&path);
                Ok(inner.commit(path, None))
            }
        }
    }

    async fn list_tree(
        &self,
        _repo: &RepoCoordinate,
        git_ref: &str,
        recursive: bool,
        path_prefix: Option<&str>,
    ) -> Result<TreeListing, ForgeError> {
        self.record(MockOperation::ListTree {
            git_ref: git_ref.to_string(),
            recursive,
            path_prefix: path_prefix.map(str::to_string),
        });
        self.check_fail("list_tree")?;

        let inner = self.inner.lock().unwrap();
        let mut entries: Vec<TreeEntry> = inner
            .directories()
            .into_iter()
            .map(|path| TreeEntry {
                content_hash: format!("tree-{}", path),
                path,
                mode: "040000".to_string(),
                kind: EntryKind::Dir,
                size: None,
            })
            .chain(inner.files.iter().map(|(path, file)| TreeEntry {
                path: path.clone(),
                mode: "100644".to_string(),
                kind: EntryKind::File,
                content_hash: file.hash.clone(),
                size: Some(file.content.len() as u64),
            }))
            .filter(|entry| recursive || !entry.path.contains('/'))
            .collect();
        entries.sort_by(|a, b| a.path.cmp(&b.path));

        Ok(TreeListing {
            truncated: inner.truncated,
            root_hash: format!("{:040x}", inner.revision),
            entries: tree::filter_by_prefix(entries, path_prefix),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> RepoCoordinate {
        "octocat/hello".parse().unwrap()
    }

    #[tokio::test]
    async fn read_returns_inline_content() {
        let forge = MockForge::new().with_file("docs/a.md", "alpha");
        let entry = forge
            .read_file(&repo(), &ContentRef::new("docs/a.md"))
            .await
            .unwrap();
        assert_eq!(entry.kind, EntryKind::File);
        assert_eq!(entry.decoded_text().unwrap().as_deref(), Some("alpha"));
        assert_eq!(Some(entry.content_hash), forge.file_hash("docs/a.md"));
    }

    #[tokio::test]
    async fn read_directory_reports_dir_kind() {
        let forge = MockForge::new().with_file("docs/a.md", "alpha");
        let entry = forge
            .read_file(&repo(), &ContentRef::new("docs"))
            .await
            .unwrap();
        assert_eq!(entry.kind, EntryKind::Dir);
    }

    #[tokio::test]
    async fn list_directory_shows_immediate_children() {
        let forge = MockForge::new()
            .with_file("README.md", "r")
            .with_file("src/lib.rs", "l")
            .with_file("src/forge/mod.rs", "m");

        let root = forge.list_directory(&repo(), "", None).await.unwrap();
        let names: Vec<&str> = root.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(names, vec!["src", "README.md"]);

        let src = forge.list_directory(&repo(), "src/", None).await.unwrap();
        let names: Vec<&str> = src.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(names, vec!["src/forge", "src/lib.rs"]);
        assert!(src.iter().all(|e| e.raw_content.is_none()));
    }

    #[tokio::test]
    async fn list_directory_on_file_is_single_entry() {
        let forge = MockForge::new().with_file("src/lib.rs", "l");
        let entries = forge
            .list_directory(&repo(), "src/lib.rs", None)
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, EntryKind::File);
    }

    #[tokio::test]
    async fn write_to_directory_is_rejected() {
        let forge = MockForge::new().with_file("src/lib.rs", "l");
        let err = forge
            .write_file(
                &repo(),
                WriteFileRequest {
                    path: "src".into(),
                    content: "x".into(),
                    message: "m".into(),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ForgeError::NotAFile(_)));
    }

    #[tokio::test]
    async fn dot_segments_are_rejected_unrecorded() {
        let forge = MockForge::new()
            .with_file("docs/secret.txt", "s")
            .with_file("secret.txt", "t");
        let err = forge
            .write_file(
                &repo(),
                WriteFileRequest {
                    path: "docs/../secret.txt".into(),
                    content: "x".into(),
                    message: "m".into(),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ForgeError::InvalidPath(_)));

        let err = forge
            .delete_file(
                &repo(),
                DeleteFileRequest {
                    path: "docs/./secret.txt".into(),
                    message: "rm".into(),
                    prior_hash: Some("h".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ForgeError::InvalidPath(_)));

        assert!(forge.operations().is_empty());
        assert_eq!(forge.file_content("docs/secret.txt").as_deref(), Some("s"));
        assert_eq!(forge.file_content("secret.txt").as_deref(), Some("t"));
    }

    #[tokio::test]
    async fn delete_removes_file() {
        let forge = MockForge::new().with_file("a.txt", "a");
        let commit = forge
            .delete_file(
                &repo(),
                DeleteFileRequest {
                    path: "a.txt".into(),
                    message: "rm".into(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(commit.content_hash, None);
        assert!(forge.file_content("a.txt").is_none());
    }

    #[tokio::test]
    async fn fail_on_and_clear() {
        let forge = MockForge::new()
            .with_file("a.txt", "a")
            .fail_on(FailOn::ReadFile(ForgeError::RateLimited));
        let err = forge
            .read_file(&repo(), &ContentRef::new("a.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, ForgeError::RateLimited));

        forge.clear_fail_on();
        assert!(forge
            .read_file(&repo(), &ContentRef::new("a.txt"))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn non_recursive_tree_lists_top_level() {
        let forge = MockForge::new()
            .with_file("README.md", "r")
            .with_file("src/lib.rs", "l");
        let listing = forge.list_tree(&repo(), "main", false, None).await.unwrap();
        let paths: Vec<&str> = listing.entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["README.md", "src"]);
        assert!(!listing.truncated);
    }
}
