//! Property-based tests for tree construction invariants.
//!
//! Uses `proptest` to verify that arbitrary record lists uphold the builder
//! contract: idempotent builds, insertion-order independence, a complete
//! path index, and reachability of every well-formed record.

use std::collections::HashSet;

use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use super::builder::{BuildOptions, build_tree};
use super::node::{FileTreeNode, NodeKind};
use super::projector::{PresentationNode, project};
use crate::manifest::records::{FileRecord, RecordKind, RecordMetadata, expected_file_id};
use crate::view::icons::IconTheme;

// ──────────────────── strategies ────────────────────

fn arb_domain() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("HomeDomain"),
        Just("MediaDomain"),
        Just("AppDomain-com.example.app"),
    ]
}

fn arb_relative_path() -> impl Strategy<Value = String> {
    prop::collection::vec("[A-Za-z0-9_]{1,8}", 1..4).prop_map(|segments| segments.join("/"))
}

fn make_record(domain: &str, relative_path: String) -> FileRecord {
    FileRecord {
        file_id: expected_file_id(domain, &relative_path),
        domain: domain.to_string(),
        relative_path,
        kind: RecordKind::File,
        metadata: RecordMetadata::default(),
    }
}

/// Records with pairwise-distinct relative paths, so no build is affected
/// by duplicate resolution.
fn arb_unique_records() -> impl Strategy<Value = Vec<FileRecord>> {
    prop::collection::vec((arb_domain(), arb_relative_path()), 1..40).prop_map(|pairs| {
        let mut seen = HashSet::new();
        pairs
            .into_iter()
            .filter(|(_, path)| seen.insert(path.clone()))
            .map(|(domain, path)| make_record(domain, path))
            .collect()
    })
}

/// Structure of a projected tree with record indices erased, for comparing
/// builds whose input order differed.
fn shape(nodes: &[PresentationNode]) -> Vec<(String, NodeKind)> {
    nodes
        .iter()
        .map(|node| (node.path.clone(), node.kind))
        .collect()
}

// ──────────────────── property tests ────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Building twice from the same input yields identical trees and stats.
    #[test]
    fn build_is_idempotent(records in arb_unique_records()) {
        let (first, first_stats) = build_tree(&records, BuildOptions::default());
        let (second, second_stats) = build_tree(&records, BuildOptions::default());

        prop_assert_eq!(first, second);
        prop_assert_eq!(first_stats, second_stats);
    }

    /// Shuffling the record list never changes the resulting tree structure.
    #[test]
    fn build_ignores_input_order(
        records in arb_unique_records(),
        seed in any::<u64>()
    ) {
        let mut shuffled = records.clone();
        shuffled.shuffle(&mut StdRng::seed_from_u64(seed));

        let (original, original_stats) = build_tree(&records, BuildOptions::default());
        let (reordered, reordered_stats) = build_tree(&shuffled, BuildOptions::default());

        let (_, original_nodes) = project(&original, &IconTheme::default());
        let (_, reordered_nodes) = project(&reordered, &IconTheme::default());

        prop_assert_eq!(shape(&original_nodes), shape(&reordered_nodes));
        prop_assert_eq!(original_stats, reordered_stats);
    }

    /// The path index covers every presentation node exactly once, and depth
    /// always equals the number of path segments.
    #[test]
    fn path_index_is_complete(records in arb_unique_records()) {
        let (tree, _) = build_tree(&records, BuildOptions::default());
        let (index, nodes) = project(&tree, &IconTheme::default());

        prop_assert_eq!(index.len(), nodes.len());
        for (position, node) in nodes.iter().enumerate() {
            prop_assert_eq!(index.get(&node.path), Some(position));
            let expected_depth = if node.path.is_empty() {
                0
            } else {
                node.path.split('/').count()
            };
            prop_assert_eq!(node.depth, expected_depth);
        }
    }

    /// Every well-formed record ends up reachable under its full path and
    /// owns the record slot of its node. Paths that double as parents of
    /// deeper records keep their record while becoming directories, so file
    /// and directory counts are checked against the whole tree instead.
    #[test]
    fn every_record_is_reachable(records in arb_unique_records()) {
        let (tree, stats) = build_tree(&records, BuildOptions::default());
        let (index, _) = project(&tree, &IconTheme::default());

        prop_assert_eq!(stats.files + stats.directories + 1, tree.node_count());
        for (position, record) in records.iter().enumerate() {
            prop_assert!(
                index.contains(&record.relative_path),
                "missing path {}",
                record.relative_path
            );
            let node = tree.find(&record.relative_path);
            prop_assert_eq!(node.and_then(FileTreeNode::record_index), Some(position));
        }
    }

    /// Domain grouping prefixes every record path with its domain segment.
    #[test]
    fn grouping_prefixes_domain(records in arb_unique_records()) {
        let options = BuildOptions { group_by_domain: true };
        let (tree, _) = build_tree(&records, options);
        let (index, _) = project(&tree, &IconTheme::default());

        for record in &records {
            let grouped = format!("{}/{}", record.domain, record.relative_path);
            prop_assert!(index.contains(&grouped), "missing path {grouped}");
            prop_assert!(index.contains(&record.domain));
        }
    }
}
