//! Icon theme resolution for presentation nodes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::tree::node::NodeKind;

/// Node icons, resolved by kind and file extension.
///
/// The default theme is empty: nodes carry no icon until a theme is
/// configured. Extension keys are lowercase without the leading dot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IconTheme {
    /// Icon for directories.
    pub directory: Option<String>,
    /// Fallback icon for files without a matching extension entry.
    pub file: Option<String>,
    /// Extension to icon, e.g. `jpg` to an image glyph.
    pub by_extension: HashMap<String, String>,
}

impl IconTheme {
    /// Small built-in glyph set for terminal rendering.
    #[must_use]
    pub fn builtin() -> Self {
        let mut by_extension = HashMap::new();
        for ext in ["jpg", "jpeg", "png", "gif", "heic"] {
            by_extension.insert(ext.to_string(), "\u{1f5bc}".to_string());
        }
        for ext in ["db", "sqlite", "sqlitedb"] {
            by_extension.insert(ext.to_string(), "\u{1f5c3}".to_string());
        }
        by_extension.insert("plist".to_string(), "\u{2699}".to_string());
        by_extension.insert("txt".to_string(), "\u{1f4dd}".to_string());
        Self {
            directory: Some("\u{1f4c1}".to_string()),
            file: Some("\u{1f4c4}".to_string()),
            by_extension,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.directory.is_none() && self.file.is_none() && self.by_extension.is_empty()
    }

    /// Resolve the icon for a node named `file_name` of `kind`.
    ///
    /// Extensions match case-insensitively. A leading-dot name like
    /// `.decrypting` has no extension.
    #[must_use]
    pub fn icon_for(&self, kind: NodeKind, file_name: &str) -> Option<String> {
        match kind {
            NodeKind::Directory => self.directory.clone(),
            NodeKind::File => file_name
                .rsplit_once('.')
                .filter(|(stem, _)| !stem.is_empty())
                .map(|(_, ext)| ext.to_ascii_lowercase())
                .and_then(|ext| self.by_extension.get(&ext).cloned())
                .or_else(|| self.file.clone()),
        }
    }
}
