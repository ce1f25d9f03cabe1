//! Presentation seams and their terminal implementations.
//!
//! The load pipeline never talks to a concrete UI. It emits through the sink
//! traits in [`sinks`]; the `cli` feature supplies terminal-backed sinks in
//! [`term`].

pub mod icons;
pub mod sinks;
#[cfg(feature = "cli")]
pub mod term;

pub use icons::IconTheme;
pub use sinks::{AlertLevel, AlertSink, ListSink, StatusSink, TreeSink};
#[cfg(feature = "cli")]
pub use term::{TerminalAlerts, TerminalFileList, TerminalStatus, TerminalTreeView};
