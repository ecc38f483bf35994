//! Gadget Spec - Parse, validate and render gadget XML descriptors.
//!
//! This crate reads gadget descriptor documents (a `<Module>` root with
//! module preferences, user preference declarations and content blocks),
//! validates them element by element, merges content blocks into named
//! views and resolves `__NS_key__` placeholders against caller-supplied
//! values.
//!
//! # Example
//!
//! ```
//! use gadget_spec::{parse_gadget_spec, SubstitutionType, Substitutions};
//! use url::Url;
//!
//! let xml = br#"<Module>
//!   <ModulePrefs title="__MSG_title__"/>
//!   <Content type="html">Hello</Content>
//! </Module>"#;
//! let url = Url::parse("http://example.org/gadget.xml").unwrap();
//! let spec = parse_gadget_spec(xml, &url).unwrap();
//!
//! let mut subs = Substitutions::new();
//! subs.add_substitution(SubstitutionType::Message, "title", "Greeter");
//! let rendered = spec.substitute(&subs).unwrap();
//! assert_eq!(rendered.module_prefs().title(), "Greeter");
//! assert_eq!(rendered.view_or_default("default").unwrap().content(), "Hello");
//! ```
//!
//! # Architecture
//!
//! - [`xml`]: Streaming reader, writer and qualified names
//! - [`model`]: Typed element tree and its builders
//! - [`registry`]: Extensible element parser system
//! - [`parser`]: Document entry point
//! - [`substitution`]: Placeholder substitution
//! - [`uri`]: href validation and resolution
//! - [`fetch`]: Document retrieval over HTTP or from disk
//! - [`factory`]: Cached fetch-and-parse of shared specs
//! - [`summary`]: Serializable gadget metadata
//! - [`config`]: Configuration constants and validation
//! - [`error`]: Error types and Result alias
//! - [`cli`]: Command-line interface

pub mod cli;
pub mod config;
pub mod error;
pub mod factory;
pub mod fetch;
pub mod model;
pub mod parser;
pub mod registry;
pub mod substitution;
pub mod summary;
pub mod uri;
pub mod xml;

// Re-export main entry points
pub use factory::SpecFactory;
pub use fetch::{DocumentFetcher, FetchedDocument, HttpFetcher};
pub use parser::{checksum, parse_gadget_spec, GadgetSpecParser};

// Re-export commonly used items
pub use config::validate_spec_url;
pub use error::{ErrorCode, GadgetError, Result};
pub use model::{
    Content, ContentType, GadgetSpec, ModulePrefs, Node, RawElementParser, SpecElement, UserPref,
    View,
};
pub use registry::Extensions;
pub use substitution::{SubstitutionType, Substitutions};
pub use summary::GadgetSummary;
pub use xml::QName;
