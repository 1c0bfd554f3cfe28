//! Error types for acp-editor
//!
//! This module defines all error types used throughout the library.
//! Every editor operation returns [`Result`]; the command-line driver logs
//! the error and decides the exit status.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using acp-editor Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for acp-editor operations
#[derive(Error, Debug)]
pub enum Error {
    /// Input could not be read or is not well-formed XML
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// A local-name query could not be constructed
    #[error("query error: {0}")]
    Query(String),

    /// The document has no `folder` element to read namespaces from
    #[error("no folder element found")]
    NoFolderElement,

    /// Invalid command-line input
    #[error("validation error: {0}")]
    Validation(String),

    /// Limit exceeded error
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// The backup target already exists and would be overwritten
    #[error("backup file '{}' already exists", .0.display())]
    BackupExists(PathBuf),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing the tree failed
    #[error("write error: {0}")]
    Write(String),

    /// JSON report encoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Write(err.to_string())
    }
}

/// XML document parsing error
#[derive(Debug, Clone)]
pub struct ParseError {
    /// Error message
    pub message: String,
    /// Byte offset in the input where parsing stopped
    pub location: Option<usize>,
    /// File the input came from
    pub path: Option<PathBuf>,
}

impl ParseError {
    /// Create a new parse error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
            path: None,
        }
    }

    /// Set the byte offset
    pub fn with_location(mut self, location: usize) -> Self {
        self.location = Some(location);
        self
    }

    /// Set the source file
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref path) = self.path {
            write!(f, "{}: ", path.display())?;
        }

        write!(f, "{}", self.message)?;

        if let Some(loc) = self.location {
            write!(f, " (at byte {})", loc)?;
        }

        Ok(())
    }
}

impl std::error::Error for ParseError {}
