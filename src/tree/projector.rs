//! Flattening the tree into display-ready rows.
//!
//! Views consume the tree as a pre-order list of [`PresentationNode`] rows
//! plus a [`PathIndex`] for path lookups. Every tree node appears exactly
//! once in both, and a parent always precedes its children in the list.

use std::collections::HashMap;

use serde::Serialize;

use crate::tree::node::{FileTreeNode, NodeKind};
use crate::view::icons::IconTheme;

/// Index from node path to position in the presentation list.
///
/// The root is indexed under the empty path.
#[derive(Debug, Clone, Default)]
pub struct PathIndex {
    by_path: HashMap<String, usize>,
}

impl PathIndex {
    /// Position of `path` in the presentation list.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<usize> {
        self.by_path.get(path).copied()
    }

    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.by_path.contains_key(path)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }

    /// All indexed paths, in arbitrary order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.by_path.keys().map(String::as_str)
    }

    /// Look up the presentation row for `path` in `nodes`.
    #[must_use]
    pub fn resolve<'a>(&self, path: &str, nodes: &'a [PresentationNode]) -> Option<&'a PresentationNode> {
        self.get(path).and_then(|position| nodes.get(position))
    }
}

/// One row of the flattened tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresentationNode {
    /// Slash-separated path from the root; empty for the root itself.
    pub path: String,
    /// Display text: the node name, or `/` for the root.
    pub label: String,
    pub kind: NodeKind,
    /// Root is depth 0.
    pub depth: usize,
    /// Path of the parent row; `None` only for the root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Index into the record list, when the node has a record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<usize>,
    /// Resolved icon, when the theme provides one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// Project `root` into a path index and a pre-order presentation list.
#[must_use]
pub fn project(root: &FileTreeNode, theme: &IconTheme) -> (PathIndex, Vec<PresentationNode>) {
    let mut projector = Projector {
        theme,
        index: PathIndex::default(),
        nodes: Vec::with_capacity(root.node_count()),
    };
    projector.push(root, String::new(), "/".to_string(), None, 0);
    (projector.index, projector.nodes)
}

struct Projector<'a> {
    theme: &'a IconTheme,
    index: PathIndex,
    nodes: Vec<PresentationNode>,
}

impl Projector<'_> {
    fn push(
        &mut self,
        node: &FileTreeNode,
        path: String,
        label: String,
        parent: Option<String>,
        depth: usize,
    ) {
        let position = self.nodes.len();
        self.index.by_path.insert(path.clone(), position);
        self.nodes.push(PresentationNode {
            path: path.clone(),
            label,
            kind: node.kind(),
            depth,
            parent,
            record: node.record_index(),
            icon: self.theme.icon_for(node.kind(), node.name()),
        });

        for child in node.children() {
            let child_path = if path.is_empty() {
                child.name().to_string()
            } else {
                format!("{path}/{}", child.name())
            };
            self.push(
                child,
                child_path,
                child.name().to_string(),
                Some(path.clone()),
                depth + 1,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::records::{FileRecord, RecordKind, RecordMetadata, expected_file_id};
    use crate::tree::builder::{BuildOptions, build_tree};

    fn home(path: &str, kind: RecordKind) -> FileRecord {
        FileRecord {
            file_id: expected_file_id("HomeDomain", path),
            domain: "HomeDomain".to_string(),
            relative_path: path.to_string(),
            kind,
            metadata: RecordMetadata::default(),
        }
    }

    fn projected(
        records: &[FileRecord],
        theme: &IconTheme,
    ) -> (PathIndex, Vec<PresentationNode>) {
        let (tree, _) = build_tree(records, BuildOptions::default());
        project(&tree, theme)
    }

    #[test]
    fn root_only_projection() {
        let (index, nodes) = projected(&[], &IconTheme::default());

        assert_eq!(nodes.len(), 1);
        assert_eq!(index.len(), 1);

        let root = &nodes[0];
        assert_eq!(root.path, "");
        assert_eq!(root.label, "/");
        assert_eq!(root.kind, NodeKind::Directory);
        assert_eq!(root.depth, 0);
        assert_eq!(root.parent, None);
        assert_eq!(root.record, None);
        assert_eq!(index.get(""), Some(0));
    }

    #[test]
    fn nested_record_projects_three_rows() {
        let records = [home("A/B.txt", RecordKind::File)];
        let (index, nodes) = projected(&records, &IconTheme::default());

        assert_eq!(nodes.len(), 3);
        assert_eq!(index.len(), 3);

        let a = index.resolve("A", &nodes).unwrap();
        assert_eq!(a.label, "A");
        assert_eq!(a.depth, 1);
        assert_eq!(a.parent.as_deref(), Some(""));
        assert_eq!(a.kind, NodeKind::Directory);

        let b = index.resolve("A/B.txt", &nodes).unwrap();
        assert_eq!(b.depth, 2);
        assert_eq!(b.parent.as_deref(), Some("A"));
        assert_eq!(b.kind, NodeKind::File);
        assert_eq!(b.record, Some(0));
    }

    #[test]
    fn parents_precede_children() {
        let records = [
            home("A/B/x.txt", RecordKind::File),
            home("A/C/y.txt", RecordKind::File),
            home("D/z.txt", RecordKind::File),
        ];
        let (index, nodes) = projected(&records, &IconTheme::default());

        for node in nodes.iter().skip(1) {
            let parent = node.parent.as_deref().unwrap();
            let own = index.get(&node.path).unwrap();
            let parent_position = index.get(parent).unwrap();
            assert!(parent_position < own, "{parent} should precede {}", node.path);
        }
    }

    #[test]
    fn index_covers_every_row_exactly_once() {
        let records = [
            home("A/B/x.txt", RecordKind::File),
            home("A/B/y.txt", RecordKind::File),
            home("C.txt", RecordKind::File),
        ];
        let (index, nodes) = projected(&records, &IconTheme::default());

        assert_eq!(index.len(), nodes.len());
        for (position, node) in nodes.iter().enumerate() {
            assert_eq!(index.get(&node.path), Some(position));
        }
    }

    #[test]
    fn siblings_appear_in_name_order() {
        let records = [
            home("b.txt", RecordKind::File),
            home("a.txt", RecordKind::File),
        ];
        let (_, nodes) = projected(&records, &IconTheme::default());

        let labels: Vec<&str> = nodes.iter().map(|node| node.label.as_str()).collect();
        assert_eq!(labels, ["/", "a.txt", "b.txt"]);
    }

    #[test]
    fn icons_resolve_from_theme() {
        let mut theme = IconTheme {
            directory: Some("folder".to_string()),
            file: Some("doc".to_string()),
            by_extension: HashMap::new(),
        };
        theme
            .by_extension
            .insert("jpg".to_string(), "image".to_string());

        let records = [home("Media/IMG_0001.JPG", RecordKind::File)];
        let (index, nodes) = projected(&records, &theme);

        assert_eq!(nodes[0].icon.as_deref(), Some("folder"));
        let media = index.resolve("Media", &nodes).unwrap();
        assert_eq!(media.icon.as_deref(), Some("folder"));
        let photo = index.resolve("Media/IMG_0001.JPG", &nodes).unwrap();
        assert_eq!(photo.icon.as_deref(), Some("image"));
    }

    #[test]
    fn empty_theme_leaves_icons_unset() {
        let records = [home("a.txt", RecordKind::File)];
        let (_, nodes) = projected(&records, &IconTheme::default());
        assert!(nodes.iter().all(|node| node.icon.is_none()));
    }
}
