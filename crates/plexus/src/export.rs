//! Export of rendered scenes.
//!
//! This module provides the [`Exporter`] trait that turns the current
//! geometry of a [`Scene`] into an output format. Export is a snapshot of
//! the views: it never mutates the scene.
//!
//! # Available Backends
//!
//! - [`svg`]: SVG output via [`svg::SvgBuilder`] and [`svg::Svg`]
//!
//! # Error Handling
//!
//! Export operations return [`Error`], covering rendering failures and I/O
//! errors. [`Error`] converts into [`PlexusError::Export`] at the crate
//! boundary.
//!
//! [`PlexusError::Export`]: crate::PlexusError::Export

/// SVG export backend.
pub mod svg;

use crate::scene::Scene;

/// Abstraction for scene export backends.
pub trait Exporter {
    /// Exports the elements and links of `scene` as they are currently laid
    /// out on its paper.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`] if the scene cannot be converted to the
    /// target format, or [`Error::Io`] if writing the output fails.
    fn export_scene(&mut self, scene: &Scene) -> Result<(), Error>;
}

/// Errors that can occur during scene export.
#[derive(Debug)]
pub enum Error {
    /// A rendering or conversion failure described by `message`.
    Render(String),
    /// An I/O error encountered while writing output.
    Io(std::io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Render(msg) => write!(f, "Render error: {msg}"),
            Self::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Render(_) => None,
            Self::Io(err) => Some(err),
        }
    }
}
