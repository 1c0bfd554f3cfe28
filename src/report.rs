//! Analysis report
//!
//! The `--analyze` output: rendition count, users, and custom content model
//! namespaces. [`Display`](std::fmt::Display) renders the three labeled
//! console sections; [`Serialize`] backs the JSON form.

use std::fmt;

use indexmap::IndexSet;
use serde::Serialize;

use crate::error::Result;

/// Statistics gathered from one export
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// Number of `rendition` elements
    pub rendition_count: usize,
    /// Distinct creator/modifier names, case-sensitive
    pub users: IndexSet<String>,
    /// Custom namespaces on the first `folder` element; `None` when there is no folder
    pub custom_models: Option<IndexSet<String>>,
}

impl AnalysisReport {
    /// Pretty-printed JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn bracketed(values: &IndexSet<String>) -> String {
    let joined: Vec<&str> = values.iter().map(String::as_str).collect();
    format!("[{}]", joined.join(", "))
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "===RENDITIONS===")?;
        writeln!(f, "RenditionCount: {}", self.rendition_count)?;
        writeln!(f)?;

        writeln!(f, "===USERS===")?;
        writeln!(f, "{}", bracketed(&self.users))?;
        writeln!(f)?;

        writeln!(f, "===CUSTOMCONTENT_MODELS===")?;
        match &self.custom_models {
            Some(models) => writeln!(f, "{}", bracketed(models))?,
            None => writeln!(f, "(no folder element found)")?,
        }
        writeln!(f)
    }
}
