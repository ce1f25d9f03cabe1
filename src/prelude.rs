//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use device_backup_browser::prelude::*;
//! ```

// Core
pub use crate::core::config::Config;
pub use crate::core::errors::{DbbError, Result};

// Gate
pub use crate::gate::{
    EncryptionProbe, FixedProbe, GateDecision, ManifestProbe, check_load_preconditions,
};

// Manifest
pub use crate::manifest::{
    DomainLabel, FileRecord, LockdownInfo, ManifestMetadata, RecordKind, RecordMetadata,
    load_manifest_db, load_manifest_plist,
};

// Tree
pub use crate::tree::builder::{BuildOptions, BuildStats, build_tree};
pub use crate::tree::node::{FileTreeNode, NodeKind};
pub use crate::tree::projector::{PathIndex, PresentationNode, project};

// View
pub use crate::view::icons::IconTheme;
pub use crate::view::sinks::{AlertLevel, AlertSink, ListSink, StatusSink, TreeSink};

// Loader
pub use crate::loader::{
    BackupLoader, LoadError, LoadSinks, LoadStage, LoadedBackup, validate_backup_directory,
};
