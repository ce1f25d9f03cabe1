//! DBB-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, DbbError>;

/// Top-level error type for Device Backup Browser.
#[derive(Debug, Error)]
pub enum DbbError {
    #[error("[DBB-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[DBB-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[DBB-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[DBB-2001] invalid backup directory {path}: {details}")]
    InvalidDirectory { path: PathBuf, details: String },

    #[error(
        "[DBB-2101] decryption of {path} is still in progress or was cancelled before completion"
    )]
    DecryptionInProgress { path: PathBuf },

    #[error("[DBB-2102] decryption of {path} was not completed")]
    DecryptionIncomplete { path: PathBuf },

    #[error("[DBB-2103] cannot determine presence of marker file {path}: {source}")]
    MarkerUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[DBB-2104] encryption probe failed for {path}: {details}")]
    EncryptionProbe { path: PathBuf, details: String },

    #[error("[DBB-2201] manifest metadata unavailable at {path}: {details}")]
    MetadataNotFound { path: PathBuf, details: String },

    #[error("[DBB-2202] manifest records unavailable at {path}: {details}")]
    RecordsNotFound { path: PathBuf, details: String },

    #[error("[DBB-2301] SQL failure in {context}: {details}")]
    Sql {
        context: &'static str,
        details: String,
    },

    #[error("[DBB-2302] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[DBB-3001] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DbbError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "DBB-1001",
            Self::MissingConfig { .. } => "DBB-1002",
            Self::ConfigParse { .. } => "DBB-1003",
            Self::InvalidDirectory { .. } => "DBB-2001",
            Self::DecryptionInProgress { .. } => "DBB-2101",
            Self::DecryptionIncomplete { .. } => "DBB-2102",
            Self::MarkerUnreadable { .. } => "DBB-2103",
            Self::EncryptionProbe { .. } => "DBB-2104",
            Self::MetadataNotFound { .. } => "DBB-2201",
            Self::RecordsNotFound { .. } => "DBB-2202",
            Self::Sql { .. } => "DBB-2301",
            Self::Serialization { .. } => "DBB-2302",
            Self::Io { .. } => "DBB-3001",
        }
    }

    /// Whether retrying might resolve the failure.
    ///
    /// A backup still being decrypted will eventually finish; an incomplete
    /// decryption needs user action and is not retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::DecryptionInProgress { .. }
                | Self::MarkerUnreadable { .. }
                | Self::EncryptionProbe { .. }
                | Self::Sql { .. }
                | Self::Io { .. }
        )
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl From<rusqlite::Error> for DbbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sql {
            context: "rusqlite",
            details: value.to_string(),
        }
    }
}

impl From<plist::Error> for DbbError {
    fn from(value: plist::Error) -> Self {
        Self::Serialization {
            context: "plist",
            details: value.to_string(),
        }
    }
}

impl From<serde_json::Error> for DbbError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for DbbError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}
