//! Error taxonomy for the restyling pipeline
//!
//! Three fatal classes, one per collaborator boundary: unreadable source
//! (`ParseError`), unresolvable theme role (`ThemeResolutionError`), and
//! codec read/write failure (`ContainerError`). Heuristic classification
//! ambiguity is accepted imprecision, not an error, and produces no
//! runtime signal. Fatal errors abort the whole run; no partial output
//! is ever committed and no retry is attempted.

use std::fmt;

use thiserror::Error;

/// Pipeline stage, named in every terminal failure report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Parse,
    Detect,
    Map,
    Generate,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Parse => "parse",
            Stage::Detect => "detect",
            Stage::Map => "map",
            Stage::Generate => "generate",
        };
        f.write_str(name)
    }
}

/// Source document could not be turned into a document tree
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("source document is unreadable: {0}")]
    Unreadable(String),
    #[error(transparent)]
    Container(#[from] ContainerError),
}

/// No usable style could be resolved for a semantic role
#[derive(Error, Debug)]
pub enum ThemeResolutionError {
    #[error("theme has no style for role '{role}' (fallback chain exhausted at '{base}')")]
    MissingRole { role: String, base: String },
    #[error("theme palette has no color token '{0}'")]
    UnknownColor(String),
    #[error("theme palette token chain starting at '{0}' does not terminate")]
    ColorCycle(String),
}

/// Container codec failed to read or write the package format
#[derive(Error, Debug)]
pub enum ContainerError {
    #[error("malformed container: {0}")]
    Malformed(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Top-level pipeline error
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Theme(#[from] ThemeResolutionError),
    #[error(transparent)]
    Container(#[from] ContainerError),
}

impl Error {
    /// The stage that aborted the run
    ///
    /// Container errors reaching the top level directly come from the
    /// write side; read-side codec failures are wrapped in `ParseError`.
    pub fn stage(&self) -> Stage {
        match self {
            Error::Parse(_) => Stage::Parse,
            Error::Theme(_) => Stage::Map,
            Error::Container(_) => Stage::Generate,
        }
    }

    /// Terminal failure report naming the stage and cause
    pub fn report(&self) -> String {
        format!("{} stage failed: {}", self.stage(), self)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_of_parse_error() {
        let err = Error::from(ParseError::Unreadable("empty".to_string()));
        assert_eq!(err.stage(), Stage::Parse);
        assert!(err.report().starts_with("parse stage failed"));
    }

    #[test]
    fn test_read_side_container_error_is_parse_stage() {
        let inner = ContainerError::Malformed("bad zip".to_string());
        let err = Error::from(ParseError::from(inner));
        assert_eq!(err.stage(), Stage::Parse);
    }

    #[test]
    fn test_write_side_container_error_is_generate_stage() {
        let err = Error::from(ContainerError::Malformed("disk full".to_string()));
        assert_eq!(err.stage(), Stage::Generate);
    }

    #[test]
    fn test_theme_error_message() {
        let err = ThemeResolutionError::MissingRole {
            role: "callout-warning".to_string(),
            base: "body".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("callout-warning"));
        assert!(msg.contains("body"));
    }
}
