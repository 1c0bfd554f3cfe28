//! Local-name element queries
//!
//! Every query used on an ACP export has the shape `//*[local-name()='x']`:
//! any element, anywhere, whose local name is `x`, whatever its prefix or
//! namespace. [`LocalNameQuery`] is that expression as an immutable value;
//! the queries the editor needs are the constants below.

use std::borrow::Cow;
use std::fmt;

use crate::documents::{Document, Element};
use crate::error::Result;
use crate::names::validate_ncname;

/// `//*[local-name()='rendition']`
pub const RENDITION: LocalNameQuery = LocalNameQuery::constant("rendition");
/// `//*[local-name()='renditioned']`
pub const RENDITIONED: LocalNameQuery = LocalNameQuery::constant("renditioned");
/// `//*[local-name()='creator']`
pub const CREATOR: LocalNameQuery = LocalNameQuery::constant("creator");
/// `//*[local-name()='modifier']`
pub const MODIFIER: LocalNameQuery = LocalNameQuery::constant("modifier");
/// `//*[local-name()='folder']`
pub const FOLDER: LocalNameQuery = LocalNameQuery::constant("folder");

/// Selects elements by local name, ignoring namespace prefixes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalNameQuery {
    local_name: Cow<'static, str>,
}

impl LocalNameQuery {
    /// Build a query for a runtime name, rejecting anything that is not an NCName
    pub fn new(local_name: &str) -> Result<Self> {
        validate_ncname(local_name)?;
        Ok(Self {
            local_name: Cow::Owned(local_name.to_string()),
        })
    }

    const fn constant(local_name: &'static str) -> Self {
        Self {
            local_name: Cow::Borrowed(local_name),
        }
    }

    /// The local name this query matches
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// Whether an element matches this query
    pub fn matches(&self, element: &Element) -> bool {
        element.local_name() == self.local_name
    }

    /// All matching elements in document order
    pub fn select<'a>(&'a self, doc: &'a Document) -> impl Iterator<Item = &'a Element> + 'a {
        doc.elements().filter(move |el| self.matches(el))
    }

    /// First matching element in document order
    pub fn first<'a>(&self, doc: &'a Document) -> Option<&'a Element> {
        doc.elements().find(|el| self.matches(el))
    }

    /// Number of matching elements, nested matches included
    pub fn count(&self, doc: &Document) -> usize {
        doc.elements().filter(|el| self.matches(el)).count()
    }

    /// Apply `f` to every matching element
    pub fn for_each_mut<F>(&self, doc: &mut Document, mut f: F)
    where
        F: FnMut(&mut Element),
    {
        doc.for_each_element_mut(|el| {
            if self.matches(el) {
                f(el);
            }
        });
    }

    /// Detach every matching element from its parent
    pub fn detach_all(&self, doc: &mut Document) -> usize {
        doc.remove_elements(|el| self.matches(el))
    }
}

impl fmt::Display for LocalNameQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "//*[local-name()='{}']", self.local_name)
    }
}
