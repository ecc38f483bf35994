//! XML emission helper shared by every node's serializer.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use super::name::QName;
use crate::error::{GadgetError, Result};

/// Thin wrapper over a `quick-xml` writer producing a UTF-8 string.
///
/// Elements are always written as explicit start/end pairs so that text
/// bodies and children can be appended without look-ahead. Attribute
/// values and text are escaped by the underlying writer.
pub struct XmlWriter {
    writer: Writer<Vec<u8>>,
}

impl XmlWriter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            writer: Writer::new(Vec::new()),
        }
    }

    /// Open an element, writing attributes in the order given.
    pub fn start_element<'a>(
        &mut self,
        name: &QName,
        attributes: impl IntoIterator<Item = (&'a QName, &'a str)>,
    ) -> Result<()> {
        let tag = name.qualified();
        let mut start = BytesStart::new(tag.as_ref());
        for (key, value) in attributes {
            start.push_attribute((key.qualified().as_ref(), value));
        }
        self.write(Event::Start(start))
    }

    /// Write escaped character data. Empty text writes nothing.
    pub fn text(&mut self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.write(Event::Text(BytesText::new(text)))
    }

    pub fn end_element(&mut self, name: &QName) -> Result<()> {
        let tag = name.qualified();
        self.write(Event::End(BytesEnd::new(tag.as_ref())))
    }

    /// Consume the writer and return the document text.
    pub fn into_string(self) -> Result<String> {
        String::from_utf8(self.writer.into_inner())
            .map_err(|e| GadgetError::Serialization(e.to_string()))
    }

    fn write(&mut self, event: Event<'_>) -> Result<()> {
        self.writer
            .write_event(event)
            .map_err(|e| GadgetError::Serialization(e.to_string()))
    }
}

impl Default for XmlWriter {
    fn default() -> Self {
        Self::new()
    }
}
