//! Tree node type.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use serde::Serialize;

/// Kind of a tree node.
///
/// Symlink records become [`NodeKind::File`] leaves; their record kind stays
/// available through the record index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Directory,
    File,
}

/// One node of the hierarchical backup tree.
///
/// Children are keyed by segment name in a sorted map, so traversal order is
/// deterministic without a separate sort pass. `record` points into the flat
/// record list the tree was built from; implicit directories (created only
/// because a deeper path needed them) carry no record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileTreeNode {
    name: String,
    kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    record: Option<usize>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    children: BTreeMap<String, FileTreeNode>,
}

impl FileTreeNode {
    /// Root node: a directory with an empty name and no record.
    #[must_use]
    pub(crate) fn root() -> Self {
        Self {
            name: String::new(),
            kind: NodeKind::Directory,
            record: None,
            children: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Index into the record list this node was built from, if any.
    #[must_use]
    pub fn record_index(&self) -> Option<usize> {
        self.record
    }

    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    #[must_use]
    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }

    /// Direct children, sorted by name.
    pub fn children(&self) -> impl Iterator<Item = &Self> {
        self.children.values()
    }

    #[must_use]
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Self> {
        self.children.get(name)
    }

    /// Total node count including this node.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.children.values().map(Self::node_count).sum::<usize>()
    }

    /// Look up a descendant by slash-separated path. The empty path is this
    /// node itself.
    #[must_use]
    pub fn find(&self, path: &str) -> Option<&Self> {
        if path.is_empty() {
            return Some(self);
        }
        let mut node = self;
        for segment in path.split('/') {
            node = node.child(segment)?;
        }
        Some(node)
    }

    /// Get or create the directory child `name`.
    ///
    /// An existing file child is upgraded to a directory, keeping its record:
    /// a path can be recorded both as an object and as a parent of deeper
    /// objects.
    pub(crate) fn ensure_child_dir(&mut self, name: &str) -> &mut Self {
        let node = self
            .children
            .entry(name.to_string())
            .or_insert_with(|| Self {
                name: name.to_string(),
                kind: NodeKind::Directory,
                record: None,
                children: BTreeMap::new(),
            });
        node.kind = NodeKind::Directory;
        node
    }

    /// Attach a file record at child `name`. The first record wins; returns
    /// `false` when the slot already carries one.
    pub(crate) fn attach_file(&mut self, name: &str, record: usize) -> bool {
        match self.children.entry(name.to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(Self {
                    name: name.to_string(),
                    kind: NodeKind::File,
                    record: Some(record),
                    children: BTreeMap::new(),
                });
                true
            }
            Entry::Occupied(mut slot) => {
                let node = slot.get_mut();
                if node.record.is_some() {
                    return false;
                }
                node.record = Some(record);
                true
            }
        }
    }

    /// Attach a directory record at child `name`, creating the directory if
    /// needed. The first record wins.
    pub(crate) fn attach_dir(&mut self, name: &str, record: usize) -> bool {
        let node = self.ensure_child_dir(name);
        if node.record.is_some() {
            return false;
        }
        node.record = Some(record);
        true
    }
}
