//! `Manifest.plist` loading: device and backup metadata.

#![allow(missing_docs)]

use std::path::Path;

use serde::Deserialize;

use crate::core::errors::{DbbError, Result};
use crate::manifest::MANIFEST_PLIST;

/// Backup-level metadata from `Manifest.plist`.
///
/// Keys the current format does not populate stay `None`; the loader does not
/// reject manifests from older backup versions.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ManifestMetadata {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub date: Option<plist::Date>,
    #[serde(default)]
    pub is_encrypted: bool,
    #[serde(default)]
    pub was_passcode_set: bool,
    #[serde(default)]
    pub lockdown: Option<LockdownInfo>,
    /// Installed-application table, kept opaque. Only its size is surfaced.
    #[serde(default)]
    pub applications: Option<plist::Value>,
}

/// Device identity fields nested under the `Lockdown` key.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LockdownInfo {
    #[serde(default)]
    pub device_name: Option<String>,
    #[serde(default)]
    pub product_type: Option<String>,
    #[serde(default)]
    pub product_version: Option<String>,
    #[serde(default)]
    pub build_version: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default, rename = "UniqueDeviceID")]
    pub unique_device_id: Option<String>,
}

impl ManifestMetadata {
    /// Number of applications recorded in the manifest, when present.
    #[must_use]
    pub fn application_count(&self) -> Option<usize> {
        self.applications
            .as_ref()
            .and_then(plist::Value::as_dictionary)
            .map(plist::Dictionary::len)
    }
}

/// Load and parse `Manifest.plist` from `dir`.
///
/// A missing, unreadable, or unparseable file all map to the same
/// metadata-unavailable error; the details string says which it was.
pub fn load_manifest_plist(dir: &Path) -> Result<ManifestMetadata> {
    let path = dir.join(MANIFEST_PLIST);
    match path.try_exists() {
        Ok(true) => {}
        Ok(false) => {
            return Err(DbbError::MetadataNotFound {
                path,
                details: "file does not exist".to_string(),
            });
        }
        Err(source) => {
            return Err(DbbError::MetadataNotFound {
                path,
                details: source.to_string(),
            });
        }
    }

    plist::from_file(&path).map_err(|e| DbbError::MetadataNotFound {
        path,
        details: e.to_string(),
    })
}
