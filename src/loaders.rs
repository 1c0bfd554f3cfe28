//! Resource loading utilities
//!
//! This module reads ACP XML exports from disk and parses them into a
//! [`Document`], enforcing the configured [`Limits`].

use crate::documents::Document;
use crate::error::{ParseError, Result};
use crate::limits::Limits;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Resource loader for ACP documents
#[derive(Debug, Default)]
pub struct Loader {
    /// Resource limits
    limits: Limits,
}

impl Loader {
    /// Create a new loader with default settings
    pub fn new() -> Self {
        Self {
            limits: Limits::default(),
        }
    }

    /// Set the limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Load a file as a string.
    ///
    /// A missing, unreadable or non-UTF-8 file is reported as a parse error,
    /// the same as malformed XML.
    pub fn load(&self, path: &Path) -> Result<String> {
        let metadata = fs::metadata(path).map_err(|e| {
            ParseError::new(format!("Failed to read file: {}", e)).with_path(path)
        })?;

        // Check size limits before pulling the whole file in
        self.limits
            .check_xml_size(usize::try_from(metadata.len()).unwrap_or(usize::MAX))?;

        let content = fs::read_to_string(path).map_err(|e| {
            ParseError::new(format!("Failed to read file: {}", e)).with_path(path)
        })?;

        debug!(path = %path.display(), bytes = content.len(), "loaded input file");
        Ok(content)
    }

    /// Load and parse a file into a document
    pub fn load_document(&self, path: &Path) -> Result<Document> {
        let content = self.load(path)?;
        Document::parse_with_limits(&content, &self.limits).map_err(|e| match e {
            crate::Error::Parse(err) => err.with_path(path).into(),
            other => other,
        })
    }
}
