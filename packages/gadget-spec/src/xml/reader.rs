//! Streaming reader adapter over a pull-based XML event cursor.
//!
//! [`StreamReader`] turns the raw `quick-xml` event stream into the four
//! events the element parsers care about. Comments, processing
//! instructions and the XML declaration are dropped, self-closing tags are
//! reported as a start/end pair, entity references are folded into text,
//! line endings are normalized to `\n`, and every well-formedness problem
//! (unbound namespace prefixes included) becomes
//! [`GadgetError::MalformedDocument`].

use std::borrow::Cow;

use quick_xml::escape::resolve_xml_entity;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;

use super::name::{QName, XMLNS_NAMESPACE};
use crate::config::MAX_ELEMENT_DEPTH;
use crate::error::{GadgetError, Result};

/// An opening tag together with its attributes in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct StartTag {
    pub name: QName,
    pub attributes: Vec<(QName, String)>,
}

/// Event produced by [`StreamReader::next_event`].
#[derive(Debug, Clone, PartialEq)]
pub enum XmlEvent {
    StartElement(StartTag),
    EndElement(QName),
    Text(String),
    EndDocument,
}

/// Stateful, non-reentrant cursor over one XML document.
pub struct StreamReader<'a> {
    reader: NsReader<&'a [u8]>,
    buf: Vec<u8>,
    open: Vec<QName>,
    pending_end: bool,
    seen_root: bool,
    finished: bool,
}

impl<'a> StreamReader<'a> {
    /// Create a reader over a complete document.
    pub fn new(input: &'a [u8]) -> Self {
        let mut reader = NsReader::from_reader(input);
        reader.config_mut().trim_text(false);
        Self {
            reader,
            buf: Vec::new(),
            open: Vec::new(),
            pending_end: false,
            seen_root: false,
            finished: false,
        }
    }

    /// Advance to the next event.
    ///
    /// # Errors
    /// Returns `MalformedDocument` when the input is not well-formed, and
    /// when called again after [`XmlEvent::EndDocument`] was returned.
    pub fn next_event(&mut self) -> Result<XmlEvent> {
        if self.pending_end {
            self.pending_end = false;
            return self.close_element();
        }
        if self.finished {
            return Err(GadgetError::malformed(
                "attempted to read past the end of the document",
            ));
        }

        loop {
            self.buf.clear();
            let read = self.reader.read_resolved_event_into(&mut self.buf);
            let (resolve, event) = match read {
                Ok(pair) => pair,
                Err(err) => {
                    let position = self.reader.buffer_position();
                    return Err(GadgetError::malformed(format!(
                        "{err} (at byte {position})"
                    )));
                }
            };

            match event {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    let namespace = resolve_namespace(resolve)?;
                    let name = element_name(namespace, e)?;
                    let attributes = collect_attributes(&self.reader, e)?;

                    if self.open.is_empty() {
                        if self.seen_root {
                            return Err(GadgetError::malformed(format!(
                                "unexpected second root element <{name}>"
                            )));
                        }
                        self.seen_root = true;
                    }
                    if self.open.len() >= MAX_ELEMENT_DEPTH {
                        return Err(GadgetError::malformed(format!(
                            "elements nested deeper than {MAX_ELEMENT_DEPTH} levels"
                        )));
                    }

                    self.open.push(name.clone());
                    self.pending_end = matches!(event, Event::Empty(_));
                    return Ok(XmlEvent::StartElement(StartTag { name, attributes }));
                }
                Event::End(_) => return self.close_element(),
                Event::Text(e) => {
                    let text = e.decode().map_err(GadgetError::malformed)?;
                    let text = normalize_line_endings(&text).into_owned();
                    if let Some(event) = self.text_event(&text)? {
                        return Ok(event);
                    }
                }
                Event::CData(e) => {
                    let text = normalize_line_endings(&decode_utf8(e.as_ref())?).into_owned();
                    if let Some(event) = self.text_event(&text)? {
                        return Ok(event);
                    }
                }
                Event::GeneralRef(e) => {
                    let raw = e.decode().map_err(GadgetError::malformed)?;
                    let resolved = resolve_entity(&raw)?;
                    if let Some(event) = self.text_event(&resolved)? {
                        return Ok(event);
                    }
                }
                Event::Eof => {
                    if let Some(name) = self.open.last() {
                        return Err(GadgetError::malformed(format!(
                            "unexpected end of document inside <{name}>"
                        )));
                    }
                    if !self.seen_root {
                        return Err(GadgetError::malformed("document has no root element"));
                    }
                    self.finished = true;
                    return Ok(XmlEvent::EndDocument);
                }
                Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => {}
            }
        }
    }

    /// Consume everything up to and including the end tag of the element
    /// whose start tag was just returned.
    ///
    /// Used to drop unknown elements wholesale, nested unknowns included.
    pub fn skip_element(&mut self) -> Result<()> {
        let mut depth = 1usize;
        while depth > 0 {
            match self.next_event()? {
                XmlEvent::StartElement(_) => depth += 1,
                XmlEvent::EndElement(_) => depth -= 1,
                XmlEvent::Text(_) => {}
                XmlEvent::EndDocument => {
                    return Err(GadgetError::malformed(
                        "unexpected end of document while skipping an element",
                    ))
                }
            }
        }
        Ok(())
    }

    fn close_element(&mut self) -> Result<XmlEvent> {
        self.open
            .pop()
            .map(XmlEvent::EndElement)
            .ok_or_else(|| GadgetError::malformed("end tag without matching start tag"))
    }

    /// Text inside the root element is reported; whitespace around it is
    /// dropped and anything else outside it is an error.
    fn text_event(&self, text: &str) -> Result<Option<XmlEvent>> {
        if !self.open.is_empty() {
            return Ok(Some(XmlEvent::Text(text.to_string())));
        }
        if text.trim().is_empty() {
            return Ok(None);
        }
        Err(GadgetError::malformed(
            "character data outside the root element",
        ))
    }
}

fn resolve_namespace(resolve: ResolveResult<'_>) -> Result<Option<String>> {
    match resolve {
        ResolveResult::Bound(ns) => Ok(Some(String::from_utf8_lossy(ns.as_ref()).into_owned())),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => Err(GadgetError::malformed(format!(
            "unbound namespace prefix '{}'",
            String::from_utf8_lossy(&prefix)
        ))),
    }
}

/// Fold `\r\n` and lone `\r` into `\n`.
fn normalize_line_endings(text: &str) -> Cow<'_, str> {
    if text.contains('\r') {
        Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

fn decode_utf8(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(GadgetError::malformed)
}

fn element_name(namespace: Option<String>, start: &BytesStart<'_>) -> Result<QName> {
    let local = decode_utf8(start.local_name().as_ref())?;
    let prefix = start
        .name()
        .prefix()
        .map(|p| decode_utf8(p.as_ref()))
        .transpose()?;
    Ok(QName::new(namespace, prefix, local))
}

fn collect_attributes(
    reader: &NsReader<&[u8]>,
    start: &BytesStart<'_>,
) -> Result<Vec<(QName, String)>> {
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| GadgetError::malformed(format!("invalid attribute: {e}")))?;
        let key = attr.key;
        let local = decode_utf8(key.local_name().as_ref())?;
        let prefix = key.prefix().map(|p| decode_utf8(p.as_ref())).transpose()?;

        // Namespace declarations are kept so the element can be written back.
        let name = if key.as_ref() == b"xmlns" || prefix.as_deref() == Some("xmlns") {
            QName::new(Some(XMLNS_NAMESPACE.to_string()), prefix, local)
        } else {
            let (resolve, _) = reader.resolver().resolve_attribute(key);
            QName::new(resolve_namespace(resolve)?, prefix, local)
        };

        let value = attr
            .decode_and_unescape_value(reader.decoder())
            .map_err(|e| GadgetError::malformed(format!("invalid value for '{name}': {e}")))?
            .into_owned();
        attributes.push((name, value));
    }
    Ok(attributes)
}

/// Resolve a general entity reference such as `amp` or `#x41`.
fn resolve_entity(raw: &str) -> Result<String> {
    if let Some(resolved) = resolve_xml_entity(raw) {
        return Ok(resolved.to_string());
    }

    if let Some(rest) = raw.strip_prefix('#') {
        let code = match rest.strip_prefix('x').or_else(|| rest.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16),
            None => rest.parse::<u32>(),
        }
        .map_err(|_| GadgetError::malformed(format!("invalid character reference &{raw};")))?;

        return char::from_u32(code)
            .map(String::from)
            .ok_or_else(|| GadgetError::malformed(format!("invalid code point in &{raw};")));
    }

    Err(GadgetError::malformed(format!("undefined entity &{raw};")))
}
