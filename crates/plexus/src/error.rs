//! Error types for Plexus operations.
//!
//! This module provides the main error type [`PlexusError`] which wraps the
//! failures that can occur while mutating a graph, rendering its views or
//! exporting a scene.
//!
//! Geometry queries never fail: when an exact answer cannot be found they
//! fall back to the shape center. Only structural problems (missing link
//! markup, unregistered strategies, invalid ids) surface as errors.

use std::{fmt, io};

use thiserror::Error;

use plexus_core::{error::GeometryError, identifier::Id};

/// The family a named strategy belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    Connector,
    Router,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connector => write!(f, "connector"),
            Self::Router => write!(f, "router"),
        }
    }
}

/// The main error type for Plexus operations.
#[derive(Debug, Error)]
pub enum PlexusError {
    /// A view could not be built from its template.
    #[error("Cannot construct view for `{cell}`: {reason}")]
    Construction { cell: Id, reason: String },

    #[error("Unknown {kind} `{name}`")]
    UnknownStrategy { kind: StrategyKind, name: String },

    #[error("Unknown cell `{0}`")]
    UnknownCell(Id),

    #[error("Cell `{0}` already exists")]
    DuplicateCell(Id),

    #[error("Invalid property `{path}`: {reason}")]
    InvalidProperty { path: String, reason: String },

    #[error("Cannot embed `{child}` into `{parent}`: {reason}")]
    InvalidEmbedding {
        parent: Id,
        child: Id,
        reason: String,
    },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Export error: {0}")]
    Export(Box<dyn std::error::Error>),
}

impl From<GeometryError> for PlexusError {
    fn from(error: GeometryError) -> Self {
        Self::Parse(error.to_string())
    }
}

impl From<crate::export::Error> for PlexusError {
    fn from(error: crate::export::Error) -> Self {
        Self::Export(Box::new(error))
    }
}

impl PlexusError {
    /// Create a new `InvalidProperty` error.
    pub fn invalid_property(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidProperty {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a new `InvalidEmbedding` error.
    pub fn invalid_embedding(parent: Id, child: Id, reason: impl Into<String>) -> Self {
        Self::InvalidEmbedding {
            parent,
            child,
            reason: reason.into(),
        }
    }
}
