//! Core building blocks: configuration, errors, path handling.

pub mod config;
pub mod errors;
pub mod paths;
