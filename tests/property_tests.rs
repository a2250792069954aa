//! Property-based tests for core domain types and the tree prefix filter.
//!
//! These tests use proptest to verify invariants hold across
//! randomly generated inputs.

use proptest::prelude::*;

use forgekit::core::types::{normalize_path, ContentRef, RepoCoordinate};
use forgekit::forge::tree::{filter_by_prefix, matches_prefix};
use forgekit::forge::{EntryKind, TreeEntry};

/// Strategy for a single path segment.
fn segment() -> impl Strategy<Value = String> {
    "[a-z]{1,4}"
}

/// Strategy for repository-relative paths like `src/cli/mod.rs`.
fn repo_path() -> impl Strategy<Value = String> {
    prop::collection::vec(segment(), 1..5).prop_map(|s| s.join("/"))
}

/// Strategy for coordinate parts.
fn coordinate_part() -> impl Strategy<Value = String> {
    "[A-Za-z0-9][A-Za-z0-9._-]{0,20}"
}

fn entry(path: String) -> TreeEntry {
    TreeEntry {
        path,
        mode: "100644".to_string(),
        kind: EntryKind::File,
        content_hash: "0".repeat(40),
        size: Some(1),
    }
}

proptest! {
    #[test]
    fn filter_keeps_exactly_entries_under_prefix(
        paths in prop::collection::vec(repo_path(), 0..30),
        prefix in repo_path(),
    ) {
        let entries: Vec<TreeEntry> = paths.iter().cloned().map(entry).collect();
        let kept = filter_by_prefix(entries, Some(&prefix));

        let expected: Vec<&String> = paths
            .iter()
            .filter(|p| p.starts_with(&format!("{}/", prefix)))
            .collect();
        prop_assert_eq!(kept.len(), expected.len());
        for (entry, path) in kept.iter().zip(expected) {
            prop_assert_eq!(&entry.path, path);
        }
    }

    #[test]
    fn trailing_slash_is_ignored(path in repo_path(), prefix in repo_path()) {
        let with_slash = format!("{}/", prefix);
        prop_assert_eq!(
            matches_prefix(&path, Some(&prefix)),
            matches_prefix(&path, Some(&with_slash))
        );
    }

    #[test]
    fn empty_prefix_keeps_everything(paths in prop::collection::vec(repo_path(), 0..20)) {
        for prefix in [None, Some(""), Some("/")] {
            let entries: Vec<TreeEntry> = paths.iter().cloned().map(entry).collect();
            prop_assert_eq!(filter_by_prefix(entries, prefix).len(), paths.len());
        }
    }

    #[test]
    fn prefix_never_matches_itself(prefix in repo_path()) {
        prop_assert!(!matches_prefix(&prefix, Some(&prefix)));
    }

    #[test]
    fn coordinate_display_round_trips(owner in coordinate_part(), repo in coordinate_part()) {
        let coord = RepoCoordinate::new(owner.clone(), repo.clone()).unwrap();
        let parsed: RepoCoordinate = coord.to_string().parse().unwrap();
        prop_assert_eq!(parsed.owner(), owner.as_str());
        prop_assert_eq!(parsed.repo(), repo.as_str());
    }

    #[test]
    fn normalized_paths_have_no_outer_slashes(path in repo_path(), lead in 0usize..3, trail in 0usize..3) {
        let raw = format!("{}{}{}", "/".repeat(lead), path, "/".repeat(trail));
        let normalized = normalize_path(&raw);
        prop_assert_eq!(&normalized, &path);
        let target = ContentRef::new(&raw);
        prop_assert_eq!(target.path(), path.as_str());
    }
}
