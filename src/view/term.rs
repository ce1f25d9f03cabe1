//! Terminal-backed sink implementations.
//!
//! These render to plain text: the tree view draws box-drawing branches, the
//! status and alert sinks write single lines to stderr so stdout stays clean
//! for structured output.

use std::collections::HashMap;
use std::io::{self, Write};

use colored::Colorize;

use crate::tree::node::NodeKind;
use crate::tree::projector::{PathIndex, PresentationNode};
use crate::view::sinks::{AlertLevel, AlertSink, ListSink, StatusSink, TreeSink};

// ──────────────────────────── tree view ───────────────────────────────

/// Holds the projected tree and renders it with box-drawing branches.
#[derive(Debug, Default)]
pub struct TerminalTreeView {
    index: PathIndex,
    nodes: Vec<PresentationNode>,
    max_depth: Option<usize>,
}

impl TerminalTreeView {
    #[must_use]
    pub fn new(max_depth: Option<usize>) -> Self {
        Self {
            index: PathIndex::default(),
            nodes: Vec::new(),
            max_depth,
        }
    }

    /// Whether a load has installed a tree yet.
    #[must_use]
    pub fn is_installed(&self) -> bool {
        !self.nodes.is_empty()
    }

    #[must_use]
    pub fn index(&self) -> &PathIndex {
        &self.index
    }

    #[must_use]
    pub fn nodes(&self) -> &[PresentationNode] {
        &self.nodes
    }

    /// Render the installed tree to `out`.
    ///
    /// Nodes deeper than `max_depth` are omitted. Branch continuation is
    /// derived from last-sibling positions, so rendering is a single pass
    /// over the node list.
    pub fn render(&self, out: &mut impl Write) -> io::Result<()> {
        let Some(root) = self.nodes.first() else {
            return Ok(());
        };
        writeln!(out, "{}", self.decorate(root))?;

        let last_child = self.last_child_flags();
        // Indentation that children of node i inherit.
        let mut child_indent: Vec<String> = vec![String::new(); self.nodes.len()];

        for (i, node) in self.nodes.iter().enumerate().skip(1) {
            let Some(parent) = node
                .parent
                .as_deref()
                .and_then(|parent| self.index.get(parent))
            else {
                continue;
            };
            let indent = child_indent[parent].clone();
            child_indent[i] = format!(
                "{indent}{}",
                if last_child[i] { "    " } else { "\u{2502}   " }
            );

            if self.max_depth.is_some_and(|limit| node.depth > limit) {
                continue;
            }
            let branch = if last_child[i] {
                "\u{2514}\u{2500}\u{2500} "
            } else {
                "\u{251c}\u{2500}\u{2500} "
            };
            writeln!(out, "{indent}{branch}{}", self.decorate(node))?;
        }
        Ok(())
    }

    fn decorate(&self, node: &PresentationNode) -> String {
        let label = match node.kind {
            NodeKind::Directory => node.label.blue().bold().to_string(),
            NodeKind::File => node.label.clone(),
        };
        match &node.icon {
            Some(icon) => format!("{icon} {label}"),
            None => label,
        }
    }

    fn last_child_flags(&self) -> Vec<bool> {
        let mut groups: HashMap<&str, usize> = HashMap::new();
        // Pre-order projection keeps sibling order, so the highest index per
        // parent is that parent's last child.
        for (i, node) in self.nodes.iter().enumerate().skip(1) {
            groups.insert(node.parent.as_deref().unwrap_or(""), i);
        }
        let mut last = vec![false; self.nodes.len()];
        for (_, i) in groups {
            last[i] = true;
        }
        last
    }
}

impl TreeSink for TerminalTreeView {
    fn install(&mut self, index: PathIndex, nodes: Vec<PresentationNode>) {
        self.index = index;
        self.nodes = nodes;
    }
}

// ──────────────────────────── file list ───────────────────────────────

/// Line-based stand-in for the detail pane.
#[derive(Debug, Default)]
pub struct TerminalFileList {
    lines: Vec<String>,
}

impl TerminalFileList {
    pub fn push_line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl ListSink for TerminalFileList {
    fn clear(&mut self) {
        self.lines.clear();
    }
}

// ─────────────────────────── status + alerts ──────────────────────────

/// Prints progress lines to stderr, dimmed.
#[derive(Debug, Default)]
pub struct TerminalStatus {
    quiet: bool,
}

impl TerminalStatus {
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl StatusSink for TerminalStatus {
    fn update(&mut self, message: &str) {
        if !self.quiet {
            eprintln!("{}", message.dimmed());
        }
    }
}

/// Prints alerts to stderr with a colored severity tag.
#[derive(Debug, Default)]
pub struct TerminalAlerts;

impl AlertSink for TerminalAlerts {
    fn alert(&mut self, level: AlertLevel, title: &str, message: &str) {
        let tag = match level {
            AlertLevel::Info => title.green().bold(),
            AlertLevel::Warning => title.yellow().bold(),
            AlertLevel::Error => title.red().bold(),
        };
        eprintln!("{tag}: {message}");
    }
}
