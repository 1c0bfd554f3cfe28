//! ACP export editor
//!
//! [`AcpEditor`] owns one parsed export and the path it came from. Queries
//! and mutations only touch the in-memory tree; nothing reaches the disk
//! until [`AcpEditor::write`].
//!
//! Operations are order sensitive. Renditions carry their own
//! `creator`/`modifier` elements, so user collection and renaming see
//! different users depending on whether [`AcpEditor::purge_renditions`]
//! already ran. The command-line driver always runs
//! analyze, purge, rename, write in that order.

use std::path::{Path, PathBuf};

use chrono::Local;
use indexmap::IndexSet;
use tracing::{debug, info, warn};

use crate::backup::write_with_backup;
use crate::documents::Document;
use crate::error::{Error, Result};
use crate::loaders::Loader;
use crate::namespaces::is_custom_namespace;
use crate::report::AnalysisReport;
use crate::xpath::{CREATOR, FOLDER, MODIFIER, RENDITION, RENDITIONED};

/// User name that matches every creator and modifier in [`AcpEditor::rename_user`]
pub const WILDCARD_USER: &str = "*";

/// What [`AcpEditor::purge_renditions`] matched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeSummary {
    /// `rendition` elements matched, nested ones included
    pub renditions: usize,
    /// `renditioned` elements matched, nested ones included
    pub renditioned: usize,
}

/// Editor for a single ACP XML export
#[derive(Debug)]
pub struct AcpEditor {
    path: Option<PathBuf>,
    document: Document,
}

impl AcpEditor {
    /// Load and parse the export at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_loader(path, &Loader::new())
    }

    /// Load and parse the export at `path` with a configured loader
    pub fn open_with_loader(path: impl AsRef<Path>, loader: &Loader) -> Result<Self> {
        let path = path.as_ref();
        let document = loader.load_document(path)?;
        info!(path = %path.display(), "loaded ACP export");
        Ok(Self {
            path: Some(path.to_path_buf()),
            document,
        })
    }

    /// Parse an export held in memory; such an editor cannot [`write`](Self::write)
    pub fn parse(xml: &str) -> Result<Self> {
        Ok(Self {
            path: None,
            document: Document::from_string(xml)?,
        })
    }

    /// The current tree
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Number of `rendition` elements anywhere in the tree
    pub fn rendition_count(&self) -> usize {
        RENDITION.count(&self.document)
    }

    /// Distinct trimmed `creator` then `modifier` values.
    ///
    /// Comparison is case-sensitive, so `bob` and `BOB` are two users here
    /// even though [`rename_user`](Self::rename_user) treats them as one.
    pub fn unique_users(&self) -> IndexSet<String> {
        CREATOR
            .select(&self.document)
            .chain(MODIFIER.select(&self.document))
            .map(|el| el.text_content().trim().to_string())
            .collect()
    }

    /// Custom content model namespaces declared on the first `folder` element.
    ///
    /// Every attribute value of that element is considered, namespace
    /// declarations included; see [`is_custom_namespace`] for the filter.
    pub fn unique_namespaces(&self) -> Result<IndexSet<String>> {
        let folder = FOLDER.first(&self.document).ok_or(Error::NoFolderElement)?;
        debug!(folder = %folder.name(), attributes = folder.attributes.len(), "scanning first folder");

        Ok(folder
            .attributes
            .iter()
            .map(|attr| attr.value.as_str())
            .filter(|value| is_custom_namespace(value))
            .map(str::to_string)
            .collect())
    }

    /// Rendition count, users and custom namespaces in one report.
    ///
    /// A missing `folder` element is recorded in the report rather than
    /// failing the whole analysis.
    pub fn analyze(&self) -> AnalysisReport {
        let custom_models = match self.unique_namespaces() {
            Ok(namespaces) => Some(namespaces),
            Err(e) => {
                warn!("cannot list custom content models: {}", e);
                None
            }
        };

        AnalysisReport {
            rendition_count: self.rendition_count(),
            users: self.unique_users(),
            custom_models,
        }
    }

    /// Remove every `rendition` and `renditioned` element, subtrees included
    pub fn purge_renditions(&mut self) -> PurgeSummary {
        let summary = PurgeSummary {
            renditions: RENDITION.count(&self.document),
            renditioned: RENDITIONED.count(&self.document),
        };

        RENDITION.detach_all(&mut self.document);
        RENDITIONED.detach_all(&mut self.document);

        info!(
            renditions = summary.renditions,
            renditioned = summary.renditioned,
            "purged renditions"
        );
        summary
    }

    /// Replace `creator`/`modifier` text equal to `old_name` with `new_name`.
    ///
    /// Matching trims the element text and ignores case; `*` matches every
    /// user. `new_name` is written verbatim. Returns the number of elements
    /// changed.
    pub fn rename_user(&mut self, old_name: &str, new_name: &str) -> usize {
        let wildcard = old_name == WILDCARD_USER;
        let mut renamed = 0;

        for query in [CREATOR, MODIFIER] {
            query.for_each_mut(&mut self.document, |el| {
                if wildcard || eq_ignore_case(el.text_content().trim(), old_name) {
                    el.set_text_content(new_name);
                    renamed += 1;
                }
            });
        }

        info!(old = old_name, new = new_name, renamed, "renamed user");
        renamed
    }

    /// Back up the source file and write the current tree in its place.
    ///
    /// Returns the backup path. See [`write_with_backup`] for the failure
    /// window between the two steps.
    pub fn write(&self) -> Result<PathBuf> {
        let path = self.path.as_deref().ok_or_else(|| {
            Error::Write("document was not loaded from a file".to_string())
        })?;
        let backup = write_with_backup(path, &self.document, Local::now())?;
        info!(path = %path.display(), backup = %backup.display(), "wrote updated export");
        Ok(backup)
    }
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}
