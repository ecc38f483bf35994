//! XML plumbing: qualified names, the streaming reader and the writer.

mod name;
mod reader;
mod writer;

pub use name::{QName, XMLNS_NAMESPACE};
pub use reader::{StartTag, StreamReader, XmlEvent};
pub use writer::XmlWriter;
