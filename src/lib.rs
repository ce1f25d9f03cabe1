#![forbid(unsafe_code)]

//! Device Backup Browser (dbb) — loads mobile-device backup archives into a
//! navigable in-memory file tree.
//!
//! The load pipeline, in stage order:
//! 1. **Decryption gate** — marker files and the backup's encryption flag
//!    decide whether loading may proceed at all
//! 2. **Manifest loading** — device metadata from `Manifest.plist`, one
//!    record per backed-up object from `Manifest.db`
//! 3. **Tree building** — the flat record list folded into a hierarchy, then
//!    projected into display-ready rows plus a path index
//!
//! Progress, failures, and completion flow through pluggable sink traits, so
//! the same pipeline drives a terminal view, a GUI, or nothing at all.
//!
//! # Library usage
//!
//! Use the [`prelude`] for convenient access to the most common types:
//!
//! ```rust,no_run
//! use device_backup_browser::prelude::*;
//! ```
//!
//! Individual modules can also be imported directly:
//!
//! ```rust,no_run
//! use device_backup_browser::core::config::Config;
//! use device_backup_browser::loader::{BackupLoader, LoadSinks};
//! ```

pub mod prelude;

pub mod core;
pub mod gate;
pub mod loader;
pub mod logger;
pub mod manifest;
pub mod tree;
pub mod view;
