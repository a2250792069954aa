//! forge::tree
//!
//! Flattening and filtering of git tree listings.
//!
//! The upstream tree endpoint describes objects in git terms (`blob`,
//! `tree`, `commit`) with a file mode. This module maps those onto
//! [`EntryKind`] and applies the client-side path prefix filter.
//!
//! # Prefix semantics
//!
//! An entry is kept iff its path starts with the prefix followed by `/`.
//! Trailing slashes on the prefix are ignored, so `src` and `src/` select
//! the same entries. Matching is exact on path components: `src` keeps
//! `src/main.rs` but not `srcgen/main.rs` or `lib/src/main.rs`, and not
//! the `src` directory entry itself.

use super::traits::{EntryKind, TreeEntry};

/// Git file mode of a symbolic link.
const SYMLINK_MODE: &str = "120000";

/// Map a git object type and mode onto an entry kind.
///
/// Unknown object types are treated as files.
pub fn entry_kind(object_type: &str, mode: &str) -> EntryKind {
    match object_type {
        "tree" => EntryKind::Dir,
        "commit" => EntryKind::Submodule,
        _ if mode == SYMLINK_MODE => EntryKind::Symlink,
        _ => EntryKind::File,
    }
}

/// Normalise a prefix; `None` means "keep everything".
fn normalize_prefix(prefix: Option<&str>) -> Option<&str> {
    prefix
        .map(|p| p.trim().trim_end_matches('/'))
        .filter(|p| !p.is_empty())
}

/// Whether `path` lies under the directory `prefix`.
pub fn matches_prefix(path: &str, prefix: Option<&str>) -> bool {
    match normalize_prefix(prefix) {
        None => true,
        Some(prefix) => path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/')),
    }
}

/// Keep only entries under `prefix`, preserving order.
pub fn filter_by_prefix(entries: Vec<TreeEntry>, prefix: Option<&str>) -> Vec<TreeEntry> {
    if normalize_prefix(prefix).is_none() {
        return entries;
    }
    entries
        .into_iter()
        .filter(|entry| matches_prefix(&entry.path, prefix))
        .collect()
}
