//! Errors raised by the geometry kernel.

use thiserror::Error;

/// Failures while reading geometric source text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GeometryError {
    #[error("Invalid path data: {0}")]
    InvalidPath(String),

    #[error("Invalid transform: {0}")]
    InvalidTransform(String),
}
