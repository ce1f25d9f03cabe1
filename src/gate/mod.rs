//! Decryption-state gate.
//!
//! Backups that were (or are being) decrypted in place carry marker files in
//! the backup directory. The gate inspects those markers plus the backup's
//! own encryption flag and decides whether loading may proceed. Marker files
//! whose presence cannot be determined are reported as errors rather than
//! treated as absent.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use crate::core::errors::{DbbError, Result};
use crate::manifest::MANIFEST_PLIST;

// ──────────────────────────── marker files ────────────────────────────

/// Marker files written next to the backup content during decryption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Decryption started and has not finished (or was cancelled).
    InProgress,
    /// Decryption ran to completion.
    Complete,
}

impl Marker {
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::InProgress => ".decrypting",
            Self::Complete => ".decryption_complete",
        }
    }

    #[must_use]
    pub fn path(self, dir: &Path) -> PathBuf {
        dir.join(self.file_name())
    }

    /// Check whether the marker exists inside `dir`.
    ///
    /// Absence and presence are both definitive answers; an indeterminate
    /// probe (for example a permission failure on the directory) is an error.
    pub fn is_present(self, dir: &Path) -> Result<bool> {
        let path = self.path(dir);
        path.try_exists()
            .map_err(|source| DbbError::MarkerUnreadable { path, source })
    }
}

// ────────────────────────── encryption probe ──────────────────────────

/// Answers "is this backup still encrypted?".
///
/// The production probe reads the backup's own metadata; tests substitute a
/// fixed answer.
pub trait EncryptionProbe {
    fn is_backup_encrypted(&self, dir: &Path) -> Result<bool>;
}

/// Probe backed by the `IsEncrypted` flag in `Manifest.plist`.
///
/// A missing metadata file yields `false`: attribution of that problem
/// belongs to the metadata loading step, not the gate. A present but
/// unreadable or unparseable file is a probe failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestProbe;

impl EncryptionProbe for ManifestProbe {
    fn is_backup_encrypted(&self, dir: &Path) -> Result<bool> {
        let path = dir.join(MANIFEST_PLIST);
        match path.try_exists() {
            Ok(true) => {}
            Ok(false) => return Ok(false),
            Err(source) => {
                return Err(DbbError::EncryptionProbe {
                    path,
                    details: source.to_string(),
                });
            }
        }

        let value = plist::Value::from_file(&path).map_err(|e| DbbError::EncryptionProbe {
            path: path.clone(),
            details: e.to_string(),
        })?;

        let flag = value
            .as_dictionary()
            .and_then(|dict| dict.get("IsEncrypted"))
            .map(|v| {
                // Some writers store the flag as an integer instead of a bool.
                v.as_boolean()
                    .or_else(|| v.as_unsigned_integer().map(|n| n != 0))
                    .unwrap_or(false)
            })
            .unwrap_or(false);
        Ok(flag)
    }
}

/// Probe returning a preconfigured answer. Test helper.
#[derive(Debug, Clone, Copy)]
pub struct FixedProbe(pub bool);

impl EncryptionProbe for FixedProbe {
    fn is_backup_encrypted(&self, _dir: &Path) -> Result<bool> {
        Ok(self.0)
    }
}

// ──────────────────────────── gate decision ───────────────────────────

/// Outcome of the precondition check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// No decryption conflict; loading may proceed.
    Allow,
    /// Loading must not proceed.
    Deny(DenyReason),
}

impl GateDecision {
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Why the gate denied a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// `.decrypting` marker present.
    DecryptionInProgress,
    /// Backup is encrypted and `.decryption_complete` is absent.
    DecryptionIncomplete,
}

impl DenyReason {
    /// User-facing explanation for this denial.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::DecryptionInProgress => {
                "Decryption is still in progress or was cancelled before completion.\n\
                 Please finish or restart decryption before loading this backup."
            }
            Self::DecryptionIncomplete => "Decryption was not completed. Please try again.",
        }
    }

    /// Convert the denial into the matching typed error for `dir`.
    #[must_use]
    pub fn into_error(self, dir: &Path) -> DbbError {
        match self {
            Self::DecryptionInProgress => DbbError::DecryptionInProgress {
                path: dir.to_path_buf(),
            },
            Self::DecryptionIncomplete => DbbError::DecryptionIncomplete {
                path: dir.to_path_buf(),
            },
        }
    }
}

// ──────────────────────── precondition evaluation ─────────────────────

/// Evaluate the decryption-state gate for `dir`.
///
/// Order of checks: the in-progress marker wins over everything else, then
/// the encryption flag combined with the completion marker. Marker probe
/// failures and encryption probe failures surface as `Err`, never as a
/// silent `Allow`.
pub fn check_load_preconditions(dir: &Path, probe: &dyn EncryptionProbe) -> Result<GateDecision> {
    if Marker::InProgress.is_present(dir)? {
        return Ok(GateDecision::Deny(DenyReason::DecryptionInProgress));
    }

    if probe.is_backup_encrypted(dir)? && !Marker::Complete.is_present(dir)? {
        return Ok(GateDecision::Deny(DenyReason::DecryptionIncomplete));
    }

    Ok(GateDecision::Allow)
}
