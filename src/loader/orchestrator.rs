//! Drives a full backup load through the staged pipeline.
//!
//! The orchestrator owns stage sequencing and everything user-visible about
//! it: progress lines, failure statuses, and alert dialogs all flow through
//! the [`LoadSinks`] attached to a call. Every sink is optional; the load
//! itself never depends on a view being present.

use std::path::Path;

use crate::core::config::Config;
use crate::core::errors::{DbbError, Result};
use crate::gate::{EncryptionProbe, GateDecision, ManifestProbe, check_load_preconditions};
use crate::loader::{LoadError, LoadStage, LoadedBackup};
use crate::manifest::metadata::load_manifest_plist;
use crate::manifest::records::load_manifest_db;
use crate::tree::builder::{BuildOptions, build_tree};
use crate::tree::projector::project;
use crate::view::icons::IconTheme;
use crate::view::sinks::{AlertLevel, AlertSink, ListSink, StatusSink, TreeSink};

// ──────────────────────────── sink bundle ─────────────────────────────

/// Views attached to one load call. All optional.
#[derive(Default)]
pub struct LoadSinks<'a> {
    /// Receives the projected tree on success.
    pub tree: Option<&'a mut dyn TreeSink>,
    /// Cleared on success.
    pub list: Option<&'a mut dyn ListSink>,
    /// Receives progress and failure status lines.
    pub status: Option<&'a mut dyn StatusSink>,
    /// Receives alert dialogs.
    pub alerts: Option<&'a mut dyn AlertSink>,
}

impl LoadSinks<'_> {
    /// No attached views; the pipeline runs silently.
    #[must_use]
    pub fn detached() -> Self {
        Self::default()
    }

    fn status(&mut self, message: &str) {
        if let Some(sink) = &mut self.status {
            sink.update(message);
        }
    }

    fn alert(&mut self, level: AlertLevel, title: &str, message: &str) {
        if let Some(sink) = &mut self.alerts {
            sink.alert(level, title, message);
        }
    }
}

// ────────────────────────── directory check ───────────────────────────

/// Validate the backup directory argument.
///
/// Empty input, a missing path, an indeterminate probe, and a non-directory
/// each fail with a typed error carrying the detail.
pub fn validate_backup_directory(dir: &Path) -> Result<()> {
    if dir.as_os_str().is_empty() {
        return Err(DbbError::InvalidDirectory {
            path: dir.to_path_buf(),
            details: "no directory given".to_string(),
        });
    }
    match dir.try_exists() {
        Ok(true) => {}
        Ok(false) => {
            return Err(DbbError::InvalidDirectory {
                path: dir.to_path_buf(),
                details: "path does not exist".to_string(),
            });
        }
        Err(source) => {
            return Err(DbbError::InvalidDirectory {
                path: dir.to_path_buf(),
                details: source.to_string(),
            });
        }
    }
    if !dir.is_dir() {
        return Err(DbbError::InvalidDirectory {
            path: dir.to_path_buf(),
            details: "not a directory".to_string(),
        });
    }
    Ok(())
}

// ──────────────────────────── orchestrator ────────────────────────────

/// Runs the staged load pipeline against a backup directory.
pub struct BackupLoader {
    options: BuildOptions,
    decode_metadata: bool,
    theme: IconTheme,
    probe: Box<dyn EncryptionProbe>,
}

impl BackupLoader {
    /// Loader configured from `config`. Encryption is probed through the
    /// backup's own metadata.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            options: BuildOptions {
                group_by_domain: config.load.group_by_domain,
            },
            decode_metadata: config.load.decode_metadata,
            theme: config.icons.clone(),
            probe: Box::new(ManifestProbe),
        }
    }

    /// Replace the encryption probe.
    #[must_use]
    pub fn with_probe(mut self, probe: Box<dyn EncryptionProbe>) -> Self {
        self.probe = probe;
        self
    }

    /// Replace the icon theme.
    #[must_use]
    pub fn with_theme(mut self, theme: IconTheme) -> Self {
        self.theme = theme;
        self
    }

    /// Run the pipeline against `dir`, emitting through `sinks`.
    ///
    /// Stage order: decryption gate, directory check, metadata, records,
    /// tree build, projection. The first failing stage aborts the load and
    /// is named in the returned error. On success the projected tree is
    /// installed into the tree sink and the list sink is cleared.
    pub fn load(
        &self,
        dir: &Path,
        sinks: &mut LoadSinks<'_>,
    ) -> std::result::Result<LoadedBackup, LoadError> {
        // The gate runs before anything is announced.
        match check_load_preconditions(dir, self.probe.as_ref()) {
            Ok(GateDecision::Allow) => {}
            Ok(GateDecision::Deny(reason)) => {
                sinks.alert(AlertLevel::Error, "Error", reason.message());
                return Err(LoadError {
                    stage: LoadStage::CheckingDecryption,
                    source: reason.into_error(dir),
                });
            }
            Err(source) => {
                sinks.alert(AlertLevel::Error, "Error", &source.to_string());
                return Err(LoadError {
                    stage: LoadStage::CheckingDecryption,
                    source,
                });
            }
        }

        let stage = LoadStage::CheckingDirectory;
        enter(stage, sinks);
        if let Err(source) = validate_backup_directory(dir) {
            return Err(fail(stage, source, sinks));
        }

        let stage = LoadStage::LoadingMetadata;
        enter(stage, sinks);
        let metadata = match load_manifest_plist(dir) {
            Ok(metadata) => metadata,
            Err(source) => return Err(fail(stage, source, sinks)),
        };

        let stage = LoadStage::LoadingRecords;
        enter(stage, sinks);
        let records = match load_manifest_db(dir, self.decode_metadata) {
            Ok(records) => records,
            Err(source) => return Err(fail(stage, source, sinks)),
        };

        enter(LoadStage::BuildingFileTree, sinks);
        let (tree, stats) = build_tree(&records, self.options);

        enter(LoadStage::BuildingPresentationTree, sinks);
        let (index, nodes) = project(&tree, &self.theme);

        if let Some(sink) = &mut sinks.tree {
            sink.install(index, nodes);
        }
        if let Some(sink) = &mut sinks.list {
            sink.clear();
        }

        sinks.status("Backup loaded successfully");
        sinks.alert(
            AlertLevel::Info,
            "Complete",
            "Backup has been successfully loaded!",
        );

        Ok(LoadedBackup {
            directory: dir.to_path_buf(),
            metadata,
            records,
            tree,
            stats,
        })
    }
}

fn enter(stage: LoadStage, sinks: &mut LoadSinks<'_>) {
    if let Some(message) = stage.progress_message() {
        sinks.status(message);
    }
}

fn fail(stage: LoadStage, source: DbbError, sinks: &mut LoadSinks<'_>) -> LoadError {
    if let Some(status) = stage.failure_status() {
        sinks.status(status);
    }
    emit_failure_alert(sinks, stage, &source);
    LoadError { stage, source }
}

/// Alert text contract per failing stage.
fn emit_failure_alert(sinks: &mut LoadSinks<'_>, stage: LoadStage, error: &DbbError) {
    match stage {
        LoadStage::CheckingDirectory => {
            let message = match error {
                DbbError::InvalidDirectory { path, .. } if path.as_os_str().is_empty() => {
                    "Please enter the backup directory.".to_string()
                }
                DbbError::InvalidDirectory { path, .. } => {
                    format!("Invalid directory: {}", path.display())
                }
                other => other.to_string(),
            };
            sinks.alert(AlertLevel::Error, "Error", &message);
        }
        LoadStage::LoadingMetadata => sinks.alert(
            AlertLevel::Warning,
            "Warning",
            "Manifest.plist file could not be found.",
        ),
        LoadStage::LoadingRecords => sinks.alert(
            AlertLevel::Warning,
            "Warning",
            "Manifest.db file could not be found.",
        ),
        LoadStage::CheckingDecryption
        | LoadStage::BuildingFileTree
        | LoadStage::BuildingPresentationTree => {
            sinks.alert(AlertLevel::Error, "Error", &error.to_string());
        }
    }
}
