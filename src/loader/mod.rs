//! Load pipeline: stages, results, and the orchestrator.

#![allow(missing_docs)]

pub mod orchestrator;

pub use orchestrator::{BackupLoader, LoadSinks, validate_backup_directory};

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::core::errors::DbbError;
use crate::manifest::metadata::ManifestMetadata;
use crate::manifest::records::FileRecord;
use crate::tree::builder::BuildStats;
use crate::tree::node::FileTreeNode;

/// Stages of the load pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStage {
    /// Decryption-state gate. Runs silently: no progress line.
    CheckingDecryption,
    CheckingDirectory,
    LoadingMetadata,
    LoadingRecords,
    BuildingFileTree,
    BuildingPresentationTree,
}

impl LoadStage {
    pub const ALL: [Self; 6] = [
        Self::CheckingDecryption,
        Self::CheckingDirectory,
        Self::LoadingMetadata,
        Self::LoadingRecords,
        Self::BuildingFileTree,
        Self::BuildingPresentationTree,
    ];

    /// Status line announced when the stage begins.
    #[must_use]
    pub const fn progress_message(self) -> Option<&'static str> {
        match self {
            Self::CheckingDecryption => None,
            Self::CheckingDirectory => Some("Checking backup directory..."),
            Self::LoadingMetadata => Some("Loading Manifest.plist file..."),
            Self::LoadingRecords => Some("Loading Manifest.db file..."),
            Self::BuildingFileTree => Some("Building file tree..."),
            Self::BuildingPresentationTree => Some("Building backup tree..."),
        }
    }

    /// Status line announced when the stage fails. Stages that cannot fail
    /// visibly have none.
    #[must_use]
    pub const fn failure_status(self) -> Option<&'static str> {
        match self {
            Self::CheckingDirectory => Some("Error: Invalid backup directory"),
            Self::LoadingMetadata => Some("Error: Manifest.plist file not found"),
            Self::LoadingRecords => Some("Error: Manifest.db file not found"),
            Self::CheckingDecryption | Self::BuildingFileTree | Self::BuildingPresentationTree => {
                None
            }
        }
    }
}

impl fmt::Display for LoadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::CheckingDecryption => "decryption check",
            Self::CheckingDirectory => "directory check",
            Self::LoadingMetadata => "metadata load",
            Self::LoadingRecords => "record load",
            Self::BuildingFileTree => "file tree build",
            Self::BuildingPresentationTree => "presentation tree build",
        };
        write!(f, "{label}")
    }
}

/// A load failure, tagged with the stage that produced it.
#[derive(Debug, Error)]
#[error("load failed during {stage}: {source}")]
pub struct LoadError {
    pub stage: LoadStage,
    #[source]
    pub source: DbbError,
}

impl LoadError {
    /// Stable error code of the underlying failure.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.source.code()
    }
}

/// Everything a successful load produces.
#[derive(Debug)]
pub struct LoadedBackup {
    /// Backup directory the load ran against.
    pub directory: PathBuf,
    /// Device and backup metadata.
    pub metadata: ManifestMetadata,
    /// Flat record list; tree nodes point into it by index.
    pub records: Vec<FileRecord>,
    /// Hierarchical tree built from the records.
    pub tree: FileTreeNode,
    /// Build counters.
    pub stats: BuildStats,
}

impl LoadedBackup {
    /// Record behind a tree node's record index.
    #[must_use]
    pub fn record(&self, index: usize) -> Option<&FileRecord> {
        self.records.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_order_is_fixed() {
        for pair in LoadStage::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn progress_messages_match_status_line_contract() {
        assert_eq!(LoadStage::CheckingDecryption.progress_message(), None);
        assert_eq!(
            LoadStage::CheckingDirectory.progress_message(),
            Some("Checking backup directory...")
        );
        assert_eq!(
            LoadStage::LoadingMetadata.progress_message(),
            Some("Loading Manifest.plist file...")
        );
        assert_eq!(
            LoadStage::LoadingRecords.progress_message(),
            Some("Loading Manifest.db file...")
        );
        assert_eq!(
            LoadStage::BuildingFileTree.progress_message(),
            Some("Building file tree...")
        );
        assert_eq!(
            LoadStage::BuildingPresentationTree.progress_message(),
            Some("Building backup tree...")
        );
    }

    #[test]
    fn failure_statuses_cover_the_visible_stages() {
        assert_eq!(
            LoadStage::CheckingDirectory.failure_status(),
            Some("Error: Invalid backup directory")
        );
        assert_eq!(
            LoadStage::LoadingMetadata.failure_status(),
            Some("Error: Manifest.plist file not found")
        );
        assert_eq!(
            LoadStage::LoadingRecords.failure_status(),
            Some("Error: Manifest.db file not found")
        );
        assert_eq!(LoadStage::CheckingDecryption.failure_status(), None);
        assert_eq!(LoadStage::BuildingFileTree.failure_status(), None);
    }

    #[test]
    fn load_error_display_names_the_stage() {
        let error = LoadError {
            stage: LoadStage::LoadingMetadata,
            source: DbbError::MetadataNotFound {
                path: PathBuf::from("/b/Manifest.plist"),
                details: "file does not exist".to_string(),
            },
        };
        let text = error.to_string();
        assert!(text.contains("metadata load"));
        assert_eq!(error.code(), "DBB-2201");
    }
}
