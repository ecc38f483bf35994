//! Error types for gadget document handling.
//!
//! Every failure surfaces as a [`GadgetError`]. Document-level failures
//! (malformed XML, structural and semantic validation, substitution) all
//! map to [`ErrorCode::MalformedXmlDocument`] so callers can treat them
//! uniformly, while the variant keeps the precise diagnosis.

use std::fmt;

use thiserror::Error;

/// Coarse error classification reported to callers of the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// The gadget document is not well-formed or fails validation.
    MalformedXmlDocument,
    /// The gadget document could not be retrieved.
    FailedToRetrieveContent,
    /// A caller-supplied parameter (such as the gadget URL) is invalid.
    InvalidParameter,
    /// Local failure unrelated to the document itself.
    InternalServerError,
}

impl ErrorCode {
    /// Return the wire name of the code.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::MalformedXmlDocument => "MALFORMED_XML_DOCUMENT",
            ErrorCode::FailedToRetrieveContent => "FAILED_TO_RETRIEVE_CONTENT",
            ErrorCode::InvalidParameter => "INVALID_PARAMETER",
            ErrorCode::InternalServerError => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main error type for the gadget spec library.
#[derive(Debug, Error)]
pub enum GadgetError {
    /// The byte stream is not well-formed XML.
    #[error("Malformed gadget document: {0}")]
    MalformedDocument(String),

    /// The document root is not a `<Module>` element.
    #[error("Gadget document root must be <Module>, found <{found}>")]
    UnexpectedRoot { found: String },

    /// A required child element is absent.
    #[error("{element} must contain a '{child}' element")]
    MissingRequiredElement { element: String, child: String },

    /// A required attribute is absent.
    #[error("{element}@{attribute} must be set")]
    MissingRequiredAttribute { element: String, attribute: String },

    /// A child element appears more often than its parent allows.
    #[error("{element} may contain only one '{child}' element")]
    DuplicateElement { element: String, child: String },

    /// Two attributes or sibling elements contradict each other.
    #[error("{element}: {message}")]
    ConflictingAttribute { element: String, message: String },

    /// An attribute value cannot be coerced to its declared type.
    #[error("{element}@{attribute} has invalid value '{value}', expected {expected}")]
    InvalidAttributeValue {
        element: String,
        attribute: String,
        value: String,
        expected: String,
    },

    /// A reference is syntactically invalid after substitution.
    #[error("{element}@{attribute} '{reference}' cannot be resolved: {reason}")]
    UnresolvableReference {
        element: String,
        attribute: String,
        reference: String,
        reason: String,
    },

    /// The gadget URL supplied by the caller is unusable.
    #[error("Invalid gadget URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The requested view is not defined by the gadget.
    #[error("Gadget has no view named '{view}'")]
    UnknownView { view: String },

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote host answered with a non-success status.
    #[error("Fetching {url} returned status {status}")]
    FetchStatus { url: String, status: u16 },

    /// Every retry of a transient failure failed.
    #[error("Giving up after {attempts} attempts: {message}")]
    RetriesExhausted { attempts: u32, message: String },

    /// The document exceeds the configured size limit.
    #[error("Document at {url} is {size} bytes, exceeding the limit of {limit} bytes")]
    DocumentTooLarge { url: String, size: u64, limit: u64 },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// XML emission failed.
    #[error("XML serialization failed: {0}")]
    Serialization(String),

    /// JSON serialization error.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization error.
    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl GadgetError {
    /// Build a [`GadgetError::MalformedDocument`] from any diagnostic.
    pub fn malformed(message: impl fmt::Display) -> Self {
        GadgetError::MalformedDocument(message.to_string())
    }

    pub(crate) fn missing_element(element: &str, child: &str) -> Self {
        GadgetError::MissingRequiredElement {
            element: element.to_string(),
            child: child.to_string(),
        }
    }

    pub(crate) fn missing_attribute(element: &str, attribute: &str) -> Self {
        GadgetError::MissingRequiredAttribute {
            element: element.to_string(),
            attribute: attribute.to_string(),
        }
    }

    pub(crate) fn duplicate(element: &str, child: &str) -> Self {
        GadgetError::DuplicateElement {
            element: element.to_string(),
            child: child.to_string(),
        }
    }

    pub(crate) fn conflict(element: &str, message: impl Into<String>) -> Self {
        GadgetError::ConflictingAttribute {
            element: element.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn invalid_value(
        element: &str,
        attribute: &str,
        value: &str,
        expected: impl Into<String>,
    ) -> Self {
        GadgetError::InvalidAttributeValue {
            element: element.to_string(),
            attribute: attribute.to_string(),
            value: value.to_string(),
            expected: expected.into(),
        }
    }

    pub(crate) fn unresolvable(
        element: &str,
        attribute: &str,
        reference: &str,
        reason: impl Into<String>,
    ) -> Self {
        GadgetError::UnresolvableReference {
            element: element.to_string(),
            attribute: attribute.to_string(),
            reference: reference.to_string(),
            reason: reason.into(),
        }
    }

    /// Classify the error the way the container reports it.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            GadgetError::MalformedDocument(_)
            | GadgetError::UnexpectedRoot { .. }
            | GadgetError::MissingRequiredElement { .. }
            | GadgetError::MissingRequiredAttribute { .. }
            | GadgetError::DuplicateElement { .. }
            | GadgetError::ConflictingAttribute { .. }
            | GadgetError::InvalidAttributeValue { .. }
            | GadgetError::UnresolvableReference { .. } => ErrorCode::MalformedXmlDocument,
            GadgetError::Http(_)
            | GadgetError::FetchStatus { .. }
            | GadgetError::RetriesExhausted { .. }
            | GadgetError::DocumentTooLarge { .. } => ErrorCode::FailedToRetrieveContent,
            GadgetError::InvalidUrl { .. } | GadgetError::UnknownView { .. } => {
                ErrorCode::InvalidParameter
            }
            GadgetError::Io(_)
            | GadgetError::Serialization(_)
            | GadgetError::Json(_)
            | GadgetError::Yaml(_) => ErrorCode::InternalServerError,
        }
    }

    /// Whether the error describes a problem with the document itself.
    #[must_use]
    pub fn is_spec_error(&self) -> bool {
        self.code() == ErrorCode::MalformedXmlDocument
    }
}

/// Result type alias for gadget spec operations.
pub type Result<T> = std::result::Result<T, GadgetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_element_display() {
        let err = GadgetError::missing_element("Module", "ModulePrefs");
        assert_eq!(err.to_string(), "Module must contain a 'ModulePrefs' element");
    }

    #[test]
    fn test_invalid_value_display() {
        let err = GadgetError::invalid_value("Content", "preferred_height", "tall", "an integer");
        assert_eq!(
            err.to_string(),
            "Content@preferred_height has invalid value 'tall', expected an integer"
        );
    }

    #[test]
    fn test_spec_errors_share_code() {
        let errors = [
            GadgetError::malformed("unterminated tag"),
            GadgetError::duplicate("Module", "ModulePrefs"),
            GadgetError::conflict("Service", "access@method is not equal request@method"),
            GadgetError::missing_attribute("UserPref", "name"),
        ];
        for err in errors {
            assert_eq!(err.code(), ErrorCode::MalformedXmlDocument);
            assert!(err.is_spec_error());
        }
    }

    #[test]
    fn test_fetch_error_code() {
        let err = GadgetError::FetchStatus {
            url: "http://example.org/g.xml".to_string(),
            status: 404,
        };
        assert_eq!(err.code(), ErrorCode::FailedToRetrieveContent);
        assert_eq!(err.code().to_string(), "FAILED_TO_RETRIEVE_CONTENT");
    }
}
