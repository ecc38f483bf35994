//! Element parser trait definition.

use super::core::ElementRegistry;
use super::engine::parse_element;
use super::types::ParseContext;
use crate::error::Result;
use crate::model::{ElementBuilder, Node};
use crate::xml::{QName, StartTag, StreamReader};

/// Constructor of a fresh builder for an element with the given name.
pub type BuilderFn = fn(QName) -> Box<dyn ElementBuilder>;

/// Trait for element parsers.
///
/// A parser owns one element kind: it creates the builder for the element,
/// knows which child elements it accepts, and drives the reader until the
/// element's end tag.
pub trait ElementParser: Send + Sync {
    /// Qualified name this parser is registered under.
    fn name(&self) -> &QName;

    /// Check whether a tag is handled by this parser.
    fn matches(&self, name: &QName) -> bool {
        self.name() == name
    }

    /// Parsers for accepted child elements.
    fn children(&self) -> &ElementRegistry;

    /// Look up the parser for a child tag.
    ///
    /// Default implementation consults [`ElementParser::children`].
    fn child(&self, name: &QName) -> Option<&dyn ElementParser> {
        self.children().get_parser(name)
    }

    /// Create the builder for an element whose start tag was just read.
    fn new_builder(&self, name: QName) -> Box<dyn ElementBuilder>;

    /// Parse the element whose start tag the caller already consumed.
    ///
    /// # Arguments
    /// * `reader` - Reader positioned right after `start`
    /// * `start` - The start tag that selected this parser
    /// * `context` - Document-level parse state
    ///
    /// # Errors
    /// Returns the first reader or validation error; nothing is returned
    /// for a partially built element.
    fn parse(
        &self,
        reader: &mut StreamReader<'_>,
        start: StartTag,
        context: &ParseContext,
    ) -> Result<Node> {
        parse_element(self, reader, start, context)
    }
}

/// Parser for the built-in element kinds: a tag name, a builder
/// constructor and a registry of child parsers.
pub struct SpecElementParser {
    name: QName,
    children: ElementRegistry,
    factory: BuilderFn,
}

impl SpecElementParser {
    #[must_use]
    pub fn new(name: QName, factory: BuilderFn) -> Self {
        Self {
            name,
            children: ElementRegistry::new(),
            factory,
        }
    }

    /// Register a child parser, returning `self` for chaining.
    #[must_use]
    pub fn with_child(mut self, child: impl ElementParser + 'static) -> Self {
        self.children.register(child);
        self
    }

    pub fn children_mut(&mut self) -> &mut ElementRegistry {
        &mut self.children
    }
}

impl ElementParser for SpecElementParser {
    fn name(&self) -> &QName {
        &self.name
    }

    fn children(&self) -> &ElementRegistry {
        &self.children
    }

    fn new_builder(&self, name: QName) -> Box<dyn ElementBuilder> {
        (self.factory)(name)
    }
}
