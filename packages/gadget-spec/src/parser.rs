//! Document entry point: raw bytes plus source URL in, validated
//! [`GadgetSpec`] out.

use sha2::{Digest, Sha256};
use url::Url;

use crate::error::{GadgetError, Result};
use crate::model::{GadgetSpec, Node, SpecElement};
use crate::registry::{
    create_gadget_parser, create_gadget_parser_with, Extensions, ParseContext, ParseEngine,
};

/// Parser for gadget documents.
///
/// Holds the element parser tree; build it once and share it. Each call to
/// [`GadgetSpecParser::parse`] uses its own reader, so a parser may be used
/// from several threads at once.
#[derive(Clone)]
pub struct GadgetSpecParser {
    engine: ParseEngine,
}

impl GadgetSpecParser {
    /// Parser for the standard gadget element set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            engine: ParseEngine::new(create_gadget_parser()),
        }
    }

    /// Parser that additionally accepts caller-registered extension
    /// elements.
    #[must_use]
    pub fn with_extensions(extensions: &Extensions) -> Self {
        Self {
            engine: ParseEngine::new(create_gadget_parser_with(extensions)),
        }
    }

    /// Parse and validate a gadget document.
    ///
    /// # Arguments
    /// * `xml` - Raw document bytes
    /// * `url` - Location the document came from; relative hrefs resolve
    ///   against it
    ///
    /// # Errors
    /// Returns `MalformedDocument` for XML errors, `UnexpectedRoot` if the
    /// root is not `<Module>`, or the validation error of the first invalid
    /// element.
    pub fn parse(&self, xml: &[u8], url: &Url) -> Result<GadgetSpec> {
        let context = ParseContext::new(url.clone());
        match self.engine.parse(xml, &context)? {
            Node::Module(spec) => {
                tracing::debug!(url = %url, bytes = xml.len(), "Parsed gadget document");
                Ok((*spec).with_checksum(checksum(xml)))
            }
            other => Err(GadgetError::UnexpectedRoot {
                found: other.name().to_string(),
            }),
        }
    }
}

impl Default for GadgetSpecParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a gadget document with the standard element set.
///
/// # Errors
/// See [`GadgetSpecParser::parse`].
///
/// # Examples
/// ```
/// use gadget_spec::parse_gadget_spec;
/// use url::Url;
///
/// let xml = r#"<Module><ModulePrefs title="Hi"/><Content>Hello</Content></Module>"#;
/// let url = Url::parse("http://example.org/hi.xml").unwrap();
/// let spec = parse_gadget_spec(xml.as_bytes(), &url).unwrap();
/// assert_eq!(spec.module_prefs().title(), "Hi");
/// assert_eq!(spec.view("default").unwrap().content(), "Hello");
///
/// let missing = r#"<Module><Content>Hello</Content></Module>"#;
/// assert!(parse_gadget_spec(missing.as_bytes(), &url).is_err());
/// ```
pub fn parse_gadget_spec(xml: &[u8], url: &Url) -> Result<GadgetSpec> {
    GadgetSpecParser::new().parse(xml, url)
}

/// Hex-encoded SHA-256 digest of raw document bytes.
#[must_use]
pub fn checksum(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
