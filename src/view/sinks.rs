//! Sink traits the load pipeline emits through.
//!
//! Each trait is one seam a UI can plug into. All of them are optional at
//! load time; an unattached sink simply drops the emission.

use std::fmt;

use crate::tree::projector::{PathIndex, PresentationNode};

/// Severity of a user-facing alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    Info,
    Warning,
    Error,
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        };
        write!(f, "{label}")
    }
}

/// Receives the projected tree when a load completes.
pub trait TreeSink {
    fn install(&mut self, index: PathIndex, nodes: Vec<PresentationNode>);
}

/// A detail pane that is cleared on a successful load.
pub trait ListSink {
    fn clear(&mut self);
}

/// Receives one-line progress updates while a load runs.
pub trait StatusSink {
    fn update(&mut self, message: &str);
}

// Lets a plain closure stand in as a status sink.
impl<F: FnMut(&str)> StatusSink for F {
    fn update(&mut self, message: &str) {
        self(message);
    }
}

/// Receives user-facing alert dialogs.
pub trait AlertSink {
    fn alert(&mut self, level: AlertLevel, title: &str, message: &str);
}
