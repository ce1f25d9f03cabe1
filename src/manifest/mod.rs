//! Manifest loading: device metadata and the per-file record database.
//!
//! A device backup directory carries two manifest artifacts. `Manifest.plist`
//! describes the device and the backup itself; `Manifest.db` is a SQLite
//! database with one row per backed-up filesystem object. Both loaders return
//! typed errors that name the artifact they could not produce.

pub mod domains;
pub mod metadata;
pub mod records;

pub use domains::DomainLabel;
pub use metadata::{LockdownInfo, ManifestMetadata, load_manifest_plist};
pub use records::{
    FileRecord, RecordKind, RecordMetadata, expected_file_id, load_manifest_db,
};

/// Device metadata file inside a backup directory.
pub const MANIFEST_PLIST: &str = "Manifest.plist";

/// File record database inside a backup directory.
pub const MANIFEST_DB: &str = "Manifest.db";
