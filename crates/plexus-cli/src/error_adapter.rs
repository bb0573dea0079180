//! Error adapter for converting PlexusError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error types
//! and miette's rich diagnostic formatting used in the CLI.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan};

use plexus::{PlexusError, error::StrategyKind};

/// Adapter for a [`PlexusError`].
///
/// Snapshots carry no source spans, so every error renders as a code, a
/// message and an optional hint.
pub struct ErrorAdapter<'a>(pub &'a PlexusError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            PlexusError::Construction { .. } => "plexus::construction",
            PlexusError::UnknownStrategy { .. } => "plexus::strategy",
            PlexusError::UnknownCell(_) | PlexusError::DuplicateCell(_) => "plexus::cell",
            PlexusError::InvalidProperty { .. } => "plexus::property",
            PlexusError::InvalidEmbedding { .. } => "plexus::embedding",
            PlexusError::Parse(_) => "plexus::parse",
            PlexusError::Io(_) => "plexus::io",
            PlexusError::Json(_) => "plexus::json",
            PlexusError::Export(_) => "plexus::export",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match &self.0 {
            PlexusError::Construction { .. } => {
                "link markup must contain an element with class `connection`"
            }
            PlexusError::UnknownStrategy {
                kind: StrategyKind::Connector,
                ..
            } => "built-in connectors are `normal`, `smooth` and `rounded`",
            PlexusError::UnknownStrategy {
                kind: StrategyKind::Router,
                ..
            } => "built-in routers are `normal` and `orthogonal`",
            PlexusError::DuplicateCell(_) => "every cell id in a snapshot must be unique",
            PlexusError::Json(_) => "the input must be a JSON object with a `cells` array",
            _ => return None,
        };
        Some(Box::new(help))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        None
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        None
    }
}

/// A reportable error that can be rendered by miette.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// An error of the engine or of the CLI plumbing.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Error(e) => e.source(),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Error(e) => e.code(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Error(e) => e.help(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Error(e) => e.source_code(),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Error(e) => e.labels(),
        }
    }
}

/// Convert a [`PlexusError`] into a list of reportable errors.
pub fn to_reportables(err: &PlexusError) -> Vec<Reportable<'_>> {
    vec![Reportable::Error(ErrorAdapter(err))]
}

#[cfg(test)]
mod tests {
    use plexus::identifier::Id;

    use super::*;

    #[test]
    fn test_single_reportable() {
        let err = PlexusError::UnknownCell(Id::new("ghost"));

        let reportables = to_reportables(&err);

        assert_eq!(reportables.len(), 1);
        assert_eq!(reportables[0].to_string(), "Unknown cell `ghost`");
        assert_eq!(
            reportables[0].code().map(|c| c.to_string()),
            Some("plexus::cell".to_string())
        );
    }

    #[test]
    fn test_strategy_help_names_builtins() {
        let err = PlexusError::UnknownStrategy {
            kind: StrategyKind::Router,
            name: "manhattan".to_string(),
        };
        let adapter = ErrorAdapter(&err);

        assert_eq!(adapter.to_string(), "Unknown router `manhattan`");
        let help = adapter.help().map(|h| h.to_string()).unwrap();
        assert!(help.contains("orthogonal"));
    }

    #[test]
    fn test_io_error_has_no_help() {
        let err = PlexusError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        let adapter = ErrorAdapter(&err);

        assert_eq!(
            adapter.code().map(|c| c.to_string()),
            Some("plexus::io".to_string())
        );
        assert!(adapter.help().is_none());
        assert!(adapter.labels().is_none());
    }
}
