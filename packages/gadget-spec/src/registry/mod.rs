//! Element registry system for extensible gadget parsing.
//!
//! Every element kind is parsed by an [`ElementParser`] registered under
//! its qualified name in its parent's [`ElementRegistry`]. The dispatch
//! loop in [`parse_element`] hands nested start tags to the matching child
//! parser and skips elements nobody registered, so documents carrying
//! vendor extensions still parse.

mod config;
mod core;
mod engine;
mod handler;
mod types;

pub use config::{create_gadget_parser, create_gadget_parser_with, Extensions};
pub use core::ElementRegistry;
pub use engine::{parse_element, ParseEngine};
pub use handler::{BuilderFn, ElementParser, SpecElementParser};
pub use types::ParseContext;
