//! `Manifest.db` loading: one [`FileRecord`] per backed-up filesystem object.
//!
//! The record database is opened read-only. Rows with NULL or mistyped
//! mandatory columns are skipped and counted instead of failing the whole
//! load; database-level failures (missing file, not SQLite, missing table)
//! are typed errors.

#![allow(missing_docs)]

use std::fmt::{self, Write as _};
use std::io::Cursor;
use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags};
use serde::Serialize;
use sha1::{Digest, Sha1};

use crate::core::errors::{DbbError, Result};
use crate::manifest::MANIFEST_DB;

// ──────────────────────────── record model ────────────────────────────

/// Kind of filesystem object a manifest row describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    File,
    Directory,
    Symlink,
    /// Flags value outside the documented set. Treated as file-like.
    Unknown,
}

impl RecordKind {
    /// Map the manifest `flags` column onto a kind.
    #[must_use]
    pub const fn from_flags(flags: i64) -> Self {
        match flags {
            1 => Self::File,
            2 => Self::Directory,
            4 => Self::Symlink,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub const fn is_directory(self) -> bool {
        matches!(self, Self::Directory)
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::File => "file",
            Self::Directory => "directory",
            Self::Symlink => "symlink",
            Self::Unknown => "unknown",
        };
        f.pad(label)
    }
}

/// Per-object attributes decoded from the row's archived `file` blob.
///
/// Every field is optional; a missing or undecodable blob yields the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RecordMetadata {
    /// Object size in bytes.
    pub size: Option<u64>,
    /// Last-modified time, seconds since the Unix epoch.
    pub last_modified: Option<i64>,
    /// POSIX mode bits.
    pub mode: Option<u32>,
}

/// One row of the `Files` table.
#[derive(Debug, Clone, Serialize)]
pub struct FileRecord {
    /// Content file name: 40 hex digits in healthy backups.
    pub file_id: String,
    /// Domain the object belongs to, e.g. `HomeDomain`.
    pub domain: String,
    /// Path relative to the domain root.
    pub relative_path: String,
    pub kind: RecordKind,
    pub metadata: RecordMetadata,
}

impl FileRecord {
    /// Content file name derived from this record's domain and path.
    #[must_use]
    pub fn expected_file_id(&self) -> String {
        expected_file_id(&self.domain, &self.relative_path)
    }

    /// Whether the stored ID matches the derived one.
    #[must_use]
    pub fn id_matches(&self) -> bool {
        self.file_id.eq_ignore_ascii_case(&self.expected_file_id())
    }

    /// Where this record's content lives under `backup_dir`.
    ///
    /// Content is sharded into two-hex-digit subdirectories. Records whose ID
    /// is not 40 hex digits have no content path.
    #[must_use]
    pub fn blob_path(&self, backup_dir: &Path) -> Option<PathBuf> {
        if self.file_id.len() != 40 || !self.file_id.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        Some(backup_dir.join(&self.file_id[..2]).join(&self.file_id))
    }
}

/// Derive the content file name for a `domain` + `relative_path` pair.
///
/// The backup format names content files after the SHA-1 of
/// `"<domain>-<relativePath>"`, lowercase hex.
#[must_use]
pub fn expected_file_id(domain: &str, relative_path: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(domain.as_bytes());
    hasher.update(b"-");
    hasher.update(relative_path.as_bytes());
    let digest = hasher.finalize();

    let mut out = String::with_capacity(40);
    for byte in digest {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

// ──────────────────────────── database load ───────────────────────────

/// Load every row of the `Files` table from `Manifest.db` in `dir`.
///
/// `decode_metadata` controls whether the archived `file` blob is decoded
/// into [`RecordMetadata`]; skipping it saves time on very large manifests.
/// An empty table is a valid result, not an error.
pub fn load_manifest_db(dir: &Path, decode_metadata: bool) -> Result<Vec<FileRecord>> {
    let path = dir.join(MANIFEST_DB);
    match path.try_exists() {
        Ok(true) => {}
        Ok(false) => {
            return Err(DbbError::RecordsNotFound {
                path,
                details: "file does not exist".to_string(),
            });
        }
        Err(source) => {
            return Err(DbbError::RecordsNotFound {
                path,
                details: source.to_string(),
            });
        }
    }

    let conn = Connection::open_with_flags(
        &path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|e| DbbError::RecordsNotFound {
        path: path.clone(),
        details: e.to_string(),
    })?;

    let mut stmt = conn
        .prepare("SELECT fileID, domain, relativePath, flags, file FROM Files")
        .map_err(|e| DbbError::RecordsNotFound {
            path: path.clone(),
            details: e.to_string(),
        })?;

    let mut records = Vec::new();
    let mut skipped = 0usize;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        // Mandatory text columns. NULL or a mistyped value skips the row.
        let file_id = row.get::<_, Option<String>>(0).ok().flatten();
        let domain = row.get::<_, Option<String>>(1).ok().flatten();
        let relative_path = row.get::<_, Option<String>>(2).ok().flatten();
        let (Some(file_id), Some(domain), Some(relative_path)) =
            (file_id, domain, relative_path)
        else {
            skipped += 1;
            continue;
        };

        let flags = row.get::<_, Option<i64>>(3).ok().flatten().unwrap_or(0);
        let metadata = if decode_metadata {
            row.get::<_, Option<Vec<u8>>>(4)
                .ok()
                .flatten()
                .and_then(|blob| decode_keyed_archive(&blob))
                .unwrap_or_default()
        } else {
            RecordMetadata::default()
        };

        records.push(FileRecord {
            file_id,
            domain,
            relative_path,
            kind: RecordKind::from_flags(flags),
            metadata,
        });
    }

    if skipped > 0 {
        eprintln!("[DBB-MANIFEST] skipped {skipped} malformed rows in {}", path.display());
    }

    Ok(records)
}

// ─────────────────────────── blob decoding ────────────────────────────

/// Decode the keyed-archive blob stored in the `file` column.
///
/// The blob is a binary property list holding an object table (`$objects`)
/// and a root reference (`$top.root`). The root object is a dictionary whose
/// `Size`, `LastModified`, and `Mode` entries carry the attributes we keep.
/// Any structural surprise yields `None`; the caller falls back to defaults.
fn decode_keyed_archive(blob: &[u8]) -> Option<RecordMetadata> {
    let value = plist::Value::from_reader(Cursor::new(blob)).ok()?;
    let archive = value.as_dictionary()?;
    let objects = archive.get("$objects")?.as_array()?;
    let root = archive.get("$top")?.as_dictionary()?.get("root")?;
    let plist::Value::Uid(uid) = root else {
        return None;
    };
    let target = objects
        .get(usize::try_from(uid.get()).ok()?)?
        .as_dictionary()?;

    Some(RecordMetadata {
        size: target.get("Size").and_then(plist::Value::as_unsigned_integer),
        last_modified: target
            .get("LastModified")
            .and_then(plist::Value::as_signed_integer),
        mode: target
            .get("Mode")
            .and_then(plist::Value::as_unsigned_integer)
            .and_then(|mode| u32::try_from(mode).ok()),
    })
}
