//! XML name validation and utilities
//!
//! Local-name queries only accept names that could actually appear as an
//! element's local part, i.e. NCNames.

use crate::error::{Error, Result};

/// Check if a string is a valid XML Name
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.')
}

/// Check if a string is a valid NCName (non-colonized name)
pub fn is_valid_ncname(name: &str) -> bool {
    !name.contains(':') && is_valid_name(name)
}

/// Validate an NCName for use in a query, returning a query error if invalid
pub fn validate_ncname(name: &str) -> Result<()> {
    if is_valid_ncname(name) {
        Ok(())
    } else {
        Err(Error::Query(format!("Invalid local name: '{}'", name)))
    }
}

/// Split a QName into prefix and local name
pub fn split_qname(qname: &str) -> (Option<&str>, &str) {
    if let Some((prefix, local)) = qname.split_once(':') {
        (Some(prefix), local)
    } else {
        (None, qname)
    }
}

/// Whether a raw attribute name is a namespace declaration (`xmlns` or `xmlns:*`)
pub fn is_namespace_declaration(name: &str) -> bool {
    match split_qname(name) {
        (None, local) => local == "xmlns",
        (Some(prefix), _) => prefix == "xmlns",
    }
}
