//! Configuration system: TOML file + env var overrides + smart defaults.

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{DbbError, Result};
use crate::view::icons::IconTheme;

/// Full DBB configuration model.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub load: LoadConfig,
    pub icons: IconTheme,
    pub logging: LoggingConfig,
    pub paths: PathsConfig,
}

/// Knobs for the load pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoadConfig {
    /// Prefix each record's domain as the root-level tree segment.
    pub group_by_domain: bool,
    /// Decode per-record size/modified/mode from the manifest blob column.
    /// Disable to shave load time on very large manifests.
    pub decode_metadata: bool,
}

/// Activity-log tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: bool,
    pub jsonl_log: PathBuf,
    pub max_size_bytes: u64,
    pub max_rotated_files: u32,
}

/// Filesystem paths used by dbb.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    pub config_file: PathBuf,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            group_by_domain: false,
            decode_metadata: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            jsonl_log: data_dir().join("activity.jsonl"),
            max_size_bytes: 16 * 1024 * 1024, // 16 MiB
            max_rotated_files: 3,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            config_file: home_dir().join(".config").join("dbb").join("config.toml"),
        }
    }
}

fn home_dir() -> PathBuf {
    env::var_os("HOME").map_or_else(
        || {
            eprintln!("[DBB-CONFIG] WARNING: HOME not set, falling back to /tmp for data paths");
            PathBuf::from("/tmp")
        },
        PathBuf::from,
    )
}

fn data_dir() -> PathBuf {
    home_dir().join(".local").join("share").join("dbb")
}

impl Config {
    /// Default configuration path.
    #[must_use]
    pub fn default_path() -> PathBuf {
        PathsConfig::default().config_file
    }

    /// Load config from default or explicit path, then apply env overrides.
    ///
    /// Missing config file is not an error when loading from the default path;
    /// defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path_buf = path.map_or_else(Self::default_path, Path::to_path_buf);
        let is_explicit_path = path.is_some();

        let mut cfg = if path_buf.exists() {
            let raw = fs::read_to_string(&path_buf).map_err(|source| DbbError::Io {
                path: path_buf.clone(),
                source,
            })?;
            let parsed: Self = toml::from_str(&raw)?;
            parsed
        } else if is_explicit_path {
            return Err(DbbError::MissingConfig { path: path_buf });
        } else {
            Self::default()
        };

        cfg.paths.config_file = path_buf;
        cfg.apply_env_overrides()?;
        cfg.normalize_paths();
        cfg.validate()?;
        Ok(cfg)
    }

    /// Expand `~` in user-supplied paths so the log writer never opens a
    /// literal `./~` directory.
    fn normalize_paths(&mut self) {
        if let Some(raw) = self.logging.jsonl_log.to_str()
            && raw.starts_with('~')
        {
            self.logging.jsonl_log = crate::core::paths::expand_user(raw);
        }
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        set_env_bool("DBB_LOAD_GROUP_BY_DOMAIN", &mut self.load.group_by_domain)?;
        set_env_bool("DBB_LOAD_DECODE_METADATA", &mut self.load.decode_metadata)?;
        set_env_bool("DBB_LOGGING_ENABLED", &mut self.logging.enabled)?;
        set_env_path("DBB_LOGGING_JSONL_LOG", &mut self.logging.jsonl_log);
        set_env_u64(
            "DBB_LOGGING_MAX_SIZE_BYTES",
            &mut self.logging.max_size_bytes,
        )?;
        set_env_u32(
            "DBB_LOGGING_MAX_ROTATED_FILES",
            &mut self.logging.max_rotated_files,
        )?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.logging.enabled {
            if self.logging.max_size_bytes == 0 {
                return Err(DbbError::InvalidConfig {
                    details: "logging.max_size_bytes must be positive".to_string(),
                });
            }
            if self.logging.max_rotated_files == 0 {
                return Err(DbbError::InvalidConfig {
                    details: "logging.max_rotated_files must be at least 1".to_string(),
                });
            }
            if self.logging.jsonl_log.as_os_str().is_empty() {
                return Err(DbbError::InvalidConfig {
                    details: "logging.jsonl_log must not be empty".to_string(),
                });
            }
        }
        for (extension, icon) in &self.icons.by_extension {
            if extension.is_empty() || icon.is_empty() {
                return Err(DbbError::InvalidConfig {
                    details: "icons.by_extension entries must be non-empty".to_string(),
                });
            }
        }
        Ok(())
    }
}

fn set_env_bool(key: &str, target: &mut bool) -> Result<()> {
    if let Ok(raw) = env::var(key) {
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => *target = true,
            "0" | "false" | "no" | "off" => *target = false,
            other => {
                return Err(DbbError::InvalidConfig {
                    details: format!("{key} must be a boolean, got '{other}'"),
                });
            }
        }
    }
    Ok(())
}

fn set_env_u64(key: &str, target: &mut u64) -> Result<()> {
    if let Ok(raw) = env::var(key) {
        *target = raw.trim().parse().map_err(|_| DbbError::InvalidConfig {
            details: format!("{key} must be an unsigned integer, got '{raw}'"),
        })?;
    }
    Ok(())
}

fn set_env_u32(key: &str, target: &mut u32) -> Result<()> {
    if let Ok(raw) = env::var(key) {
        *target = raw.trim().parse().map_err(|_| DbbError::InvalidConfig {
            details: format!("{key} must be an unsigned integer, got '{raw}'"),
        })?;
    }
    Ok(())
}

fn set_env_path(key: &str, target: &mut PathBuf) {
    if let Some(raw) = env::var_os(key) {
        *target = PathBuf::from(raw);
    }
}
