//! Generic elements for extension parsers.

use super::{display_as_xml, ElementBuilder, ElementData, LeafBuilder, Node, SpecElement};
use crate::registry::{ElementParser, ElementRegistry};
use crate::xml::QName;

/// An element kept as written: name, attributes, text and nested raw
/// children (stored as extensions).
#[derive(Debug, Clone, PartialEq)]
pub struct RawElement {
    data: ElementData,
}

impl RawElement {
    pub(crate) fn builder(name: QName) -> Box<dyn ElementBuilder> {
        LeafBuilder::boxed(name, |data, _| Ok(Node::Raw(RawElement { data })))
    }

    /// Wrap already collected element data.
    #[must_use]
    pub fn from_data(data: ElementData) -> Self {
        Self { data }
    }

    /// Nested elements in document order.
    #[must_use]
    pub fn children(&self) -> &[Node] {
        self.data.extensions()
    }
}

impl SpecElement for RawElement {
    fn data(&self) -> &ElementData {
        &self.data
    }
}

display_as_xml!(RawElement);

/// Parser that captures an element and everything below it as
/// [`RawElement`] nodes.
///
/// Register one below any known element to keep vendor extensions that
/// would otherwise be skipped; they land in that element's extensions.
pub struct RawElementParser {
    name: QName,
    children: ElementRegistry,
}

impl RawElementParser {
    #[must_use]
    pub fn new(name: impl Into<QName>) -> Self {
        Self {
            name: name.into(),
            children: ElementRegistry::new(),
        }
    }
}

impl ElementParser for RawElementParser {
    fn name(&self) -> &QName {
        &self.name
    }

    fn children(&self) -> &ElementRegistry {
        &self.children
    }

    /// Every nested element is captured raw as well.
    fn child(&self, _name: &QName) -> Option<&dyn ElementParser> {
        Some(self)
    }

    fn new_builder(&self, name: QName) -> Box<dyn ElementBuilder> {
        RawElement::builder(name)
    }
}
