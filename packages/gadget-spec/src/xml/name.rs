//! Qualified XML names.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Namespace URI bound to `xmlns` declarations.
pub const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";

/// A qualified XML name.
///
/// Identity is the pair (namespace URI, local part). The prefix is kept
/// only so the name can be written back the way it was read; two names
/// with different prefixes bound to the same namespace are equal.
#[derive(Debug, Clone)]
pub struct QName {
    namespace: Option<String>,
    prefix: Option<String>,
    local: String,
}

impl QName {
    /// Create a name in no namespace.
    pub fn local(local: impl Into<String>) -> Self {
        Self {
            namespace: None,
            prefix: None,
            local: local.into(),
        }
    }

    /// Create a name in the given namespace, without a prefix.
    pub fn with_namespace(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            prefix: None,
            local: local.into(),
        }
    }

    pub(crate) fn new(namespace: Option<String>, prefix: Option<String>, local: String) -> Self {
        Self {
            namespace,
            prefix,
            local,
        }
    }

    /// Namespace URI, or `None` for no namespace.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Prefix as written in the source document.
    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Local part of the name.
    #[must_use]
    pub fn local_part(&self) -> &str {
        &self.local
    }

    /// Check for a name in no namespace with the given local part.
    #[must_use]
    pub fn is(&self, local: &str) -> bool {
        self.namespace.is_none() && self.local == local
    }

    /// Whether this attribute name is a namespace declaration.
    #[must_use]
    pub fn is_namespace_declaration(&self) -> bool {
        self.namespace.as_deref() == Some(XMLNS_NAMESPACE)
    }

    /// Name as written in a document (`prefix:local` or `local`).
    #[must_use]
    pub fn qualified(&self) -> Cow<'_, str> {
        match &self.prefix {
            Some(prefix) => Cow::Owned(format!("{prefix}:{}", self.local)),
            None => Cow::Borrowed(&self.local),
        }
    }
}

impl PartialEq for QName {
    fn eq(&self, other: &Self) -> bool {
        self.namespace == other.namespace && self.local == other.local
    }
}

impl Eq for QName {}

impl Hash for QName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.namespace.hash(state);
        self.local.hash(state);
    }
}

impl PartialOrd for QName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.namespace
            .cmp(&other.namespace)
            .then_with(|| self.local.cmp(&other.local))
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified())
    }
}

impl From<&str> for QName {
    fn from(local: &str) -> Self {
        QName::local(local)
    }
}
