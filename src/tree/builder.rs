//! Tree construction from the flat manifest record list.

#![allow(missing_docs)]

use serde::Serialize;

use crate::manifest::records::FileRecord;
use crate::tree::node::{FileTreeNode, NodeKind};

/// Build-time options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Insert each record's domain as a top-level directory segment.
    pub group_by_domain: bool,
}

/// What a build produced and what it left out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    /// File nodes in the finished tree.
    pub files: usize,
    /// Directory nodes in the finished tree, root excluded.
    pub directories: usize,
    /// Records whose relative path could not be split into segments.
    pub skipped_malformed: usize,
    /// Records whose path was already taken by an earlier record.
    pub skipped_duplicates: usize,
}

/// Build the hierarchical tree from `records`.
///
/// Records are folded in list order: intermediate directories are created on
/// demand, the first record at a given path wins, and records with malformed
/// paths are counted and dropped instead of failing the build. An empty
/// record list yields a root-only tree.
#[must_use]
pub fn build_tree(records: &[FileRecord], options: BuildOptions) -> (FileTreeNode, BuildStats) {
    let mut root = FileTreeNode::root();
    let mut stats = BuildStats::default();

    for (index, record) in records.iter().enumerate() {
        let Some(segments) = split_segments(&record.relative_path) else {
            stats.skipped_malformed += 1;
            continue;
        };
        let Some((leaf, parents)) = segments.split_last() else {
            stats.skipped_malformed += 1;
            continue;
        };

        let mut node = &mut root;
        if options.group_by_domain {
            node = node.ensure_child_dir(&record.domain);
        }
        for parent in parents {
            node = node.ensure_child_dir(parent);
        }

        let attached = if record.kind.is_directory() {
            node.attach_dir(leaf, index)
        } else {
            node.attach_file(leaf, index)
        };
        if !attached {
            stats.skipped_duplicates += 1;
        }
    }

    count_nodes(&root, &mut stats);
    (root, stats)
}

/// Split a relative path into segments.
///
/// Rejected outright: the empty path, absolute paths, empty segments from
/// doubled separators, and `.`/`..` segments.
fn split_segments(relative_path: &str) -> Option<Vec<&str>> {
    if relative_path.is_empty() {
        return None;
    }
    let segments: Vec<&str> = relative_path.split('/').collect();
    if segments
        .iter()
        .any(|segment| segment.is_empty() || *segment == "." || *segment == "..")
    {
        return None;
    }
    Some(segments)
}

fn count_nodes(root: &FileTreeNode, stats: &mut BuildStats) {
    fn walk(node: &FileTreeNode, stats: &mut BuildStats) {
        for child in node.children() {
            match child.kind() {
                NodeKind::Directory => stats.directories += 1,
                NodeKind::File => stats.files += 1,
            }
            walk(child, stats);
        }
    }
    walk(root, stats);
}
