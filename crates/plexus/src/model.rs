//! Cells and their path-addressed properties.
//!
//! A [`Cell`] is either an element (a positioned, sized node) or a link (an
//! edge between two endpoints). Everything else about a cell lives in
//! nested JSON values addressed by `/`-delimited paths.

pub mod cell;
pub mod element;
pub mod link;
pub mod patch;
pub mod ports;

pub use cell::{Cell, CellKind, Change};
pub use element::ElementData;
pub use link::{Endpoint, Label, LabelOffset, LabelPosition, LinkData, LinkEnd, StrategyRef};
pub use ports::{Port, PortIndex, PortsCapable};

/// Flags accompanying every mutation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MutationOptions {
    /// Suppress change notifications.
    pub silent: bool,
    /// Unset the addressed path before merging the new value in, so stale
    /// nested keys do not survive.
    pub rewrite: bool,
}

impl MutationOptions {
    pub fn silent() -> Self {
        Self {
            silent: true,
            ..Self::default()
        }
    }

    pub fn rewrite() -> Self {
        Self {
            rewrite: true,
            ..Self::default()
        }
    }
}
