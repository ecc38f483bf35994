//! Parse engine that drives the reader and dispatches elements to parsers.

use std::sync::Arc;

use tracing::debug;

use super::handler::ElementParser;
use super::types::ParseContext;
use crate::error::{GadgetError, Result};
use crate::model::Node;
use crate::xml::{StartTag, StreamReader, XmlEvent};

/// Build one element and its subtree.
///
/// Attributes go to the builder first. Nested start tags are dispatched to
/// the parser's child parsers; tags without one, and tags marked skip, are
/// consumed with their whole subtree. The builder is validated and frozen
/// at the matching end tag, so every child is validated before its parent.
///
/// # Errors
/// Returns the first reader, attribute or validation error.
pub fn parse_element<P: ElementParser + ?Sized>(
    parser: &P,
    reader: &mut StreamReader<'_>,
    start: StartTag,
    context: &ParseContext,
) -> Result<Node> {
    let StartTag { name, attributes } = start;
    let mut builder = parser.new_builder(name.clone());
    for (key, value) in attributes {
        builder.set_attribute(key, value)?;
    }

    loop {
        match reader.next_event()? {
            XmlEvent::StartElement(child) => {
                if parser.children().should_skip(&child.name) {
                    debug!(element = %child.name, parent = %name, "Skipping element");
                    reader.skip_element()?;
                    continue;
                }
                match parser.child(&child.name) {
                    Some(child_parser) => {
                        let node = child_parser.parse(reader, child, context)?;
                        builder.add_child(node)?;
                    }
                    None => {
                        debug!(element = %child.name, parent = %name, "Skipping unknown element");
                        reader.skip_element()?;
                    }
                }
            }
            XmlEvent::Text(text) => builder.add_text(&text),
            XmlEvent::EndElement(_) => return builder.build(context),
            XmlEvent::EndDocument => {
                return Err(GadgetError::malformed(format!(
                    "unexpected end of document inside <{name}>"
                )))
            }
        }
    }
}

/// Engine that parses a whole document with a root parser.
///
/// The engine reads up to the root start tag, checks that the root parser
/// accepts it, parses the tree and makes sure nothing follows the root.
#[derive(Clone)]
pub struct ParseEngine {
    root: Arc<dyn ElementParser>,
}

impl ParseEngine {
    /// Create a new engine with the given root parser.
    #[must_use]
    pub fn new(root: impl ElementParser + 'static) -> Self {
        Self {
            root: Arc::new(root),
        }
    }

    /// Parse a complete document.
    ///
    /// # Arguments
    /// * `input` - Raw document bytes
    /// * `context` - Document-level parse state
    ///
    /// # Returns
    /// The frozen root node
    ///
    /// # Errors
    /// Returns `UnexpectedRoot` if the root element does not match the root
    /// parser, `MalformedDocument` for XML errors, or any validation error.
    pub fn parse(&self, input: &[u8], context: &ParseContext) -> Result<Node> {
        let mut reader = StreamReader::new(input);

        let start = loop {
            match reader.next_event()? {
                XmlEvent::StartElement(start) => break start,
                XmlEvent::Text(_) => {}
                XmlEvent::EndElement(_) | XmlEvent::EndDocument => {
                    return Err(GadgetError::malformed("document has no root element"))
                }
            }
        };

        if !self.root.matches(&start.name) {
            return Err(GadgetError::UnexpectedRoot {
                found: start.name.to_string(),
            });
        }

        let node = self.root.parse(&mut reader, start, context)?;
        match reader.next_event()? {
            XmlEvent::EndDocument => Ok(node),
            _ => Err(GadgetError::malformed("content after the root element")),
        }
    }
}
