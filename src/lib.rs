//! # acp-editor
//!
//! Inspect and edit Alfresco Content Package (ACP) XML exports.
//!
//! ## Features
//!
//! - Count rendition (thumbnail) elements
//! - List distinct creator/modifier user names
//! - List custom content model namespaces
//! - Purge rendition subtrees
//! - Rename users, one name or all of them
//! - Write back with a timestamped backup of the original
//!
//! All element matching is by local name, so `cm:creator`, `creator` and
//! `x:creator` are the same element as far as the editor is concerned.
//!
//! ## Example
//!
//! ```rust,no_run
//! use acp_editor::AcpEditor;
//!
//! let mut editor = AcpEditor::open("export.xml")?;
//! print!("{}", editor.analyze());
//!
//! editor.purge_renditions();
//! editor.rename_user("olduser", "newuser");
//! let backup = editor.write()?;
//! println!("previous version kept at {}", backup.display());
//! # Ok::<(), acp_editor::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Foundation
pub mod error;
pub mod limits;

// Names and namespaces
pub mod names;
pub mod namespaces;

// Tree, loading and queries
pub mod documents;
pub mod loaders;
pub mod xpath;

// Editing
pub mod backup;
pub mod editor;
pub mod report;

// Re-exports for convenience
pub use documents::{Document, Element, Node};
pub use editor::{AcpEditor, PurgeSummary, WILDCARD_USER};
pub use error::{Error, Result};
pub use limits::Limits;
pub use loaders::Loader;
pub use report::AnalysisReport;

/// Version of the acp-editor library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
