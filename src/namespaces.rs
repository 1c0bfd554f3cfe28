//! XML namespace handling
//!
//! Qualified names for parsed elements, plus the filter that separates
//! custom content model namespaces from the platform's built-in ones.

/// Namespace URI prefixes that belong to the platform itself
pub const BUILTIN_NAMESPACE_PREFIXES: [&str; 2] = ["http://www.alfresco", "http://www.jcp.org"];

/// Qualified name (QName) - combination of namespace and local name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    /// Namespace URI (None for no namespace)
    pub namespace: Option<String>,
    /// Local name
    pub local_name: String,
}

impl QName {
    /// Create a new QName
    pub fn new(namespace: Option<impl Into<String>>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.map(|s| s.into()),
            local_name: local_name.into(),
        }
    }
}

/// Whether an attribute value names a custom content model namespace.
///
/// Only `http://` values count; anything under the built-in prefixes is
/// excluded.
pub fn is_custom_namespace(value: &str) -> bool {
    value.starts_with("http://")
        && !BUILTIN_NAMESPACE_PREFIXES
            .iter()
            .any(|prefix| value.starts_with(prefix))
}
