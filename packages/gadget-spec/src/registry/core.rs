//! Element registry for mapping qualified tag names to parsers.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::handler::ElementParser;
use crate::xml::QName;

/// Registry mapping element names to parsers.
///
/// The registry allows registering parsers for specific tag names, as well
/// as marking tags to be consumed and dropped without a parser.
#[derive(Clone, Default)]
pub struct ElementRegistry {
    parsers: HashMap<QName, Arc<dyn ElementParser>>,
    skip_tags: HashSet<QName>,
}

impl ElementRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a parser under its own name, replacing any previous one.
    pub fn register(&mut self, parser: impl ElementParser + 'static) {
        self.register_shared(Arc::new(parser));
    }

    /// Register a parser that is shared with other registries.
    pub fn register_shared(&mut self, parser: Arc<dyn ElementParser>) {
        self.parsers.insert(parser.name().clone(), parser);
    }

    /// Mark tags as skip (consume the whole subtree, build nothing).
    pub fn skip(&mut self, tag_names: impl IntoIterator<Item = impl Into<QName>>) {
        for tag in tag_names {
            self.skip_tags.insert(tag.into());
        }
    }

    /// Get the parser for a tag.
    ///
    /// Returns `None` if the tag should be skipped or has no parser.
    #[must_use]
    pub fn get_parser(&self, name: &QName) -> Option<&dyn ElementParser> {
        if self.skip_tags.contains(name) {
            return None;
        }
        self.parsers.get(name).map(|parser| &**parser)
    }

    /// Check if a tag should be skipped.
    #[must_use]
    pub fn should_skip(&self, name: &QName) -> bool {
        self.skip_tags.contains(name)
    }

    /// Check if a parser is registered for a tag.
    #[must_use]
    pub fn has_parser(&self, name: &QName) -> bool {
        self.parsers.contains_key(name)
    }

    /// Return set of all registered tag names.
    #[must_use]
    pub fn registered_tags(&self) -> HashSet<&QName> {
        self.parsers.keys().collect()
    }

    /// Return set of all skipped tag names.
    #[must_use]
    pub fn skipped_tags(&self) -> HashSet<&QName> {
        self.skip_tags.iter().collect()
    }
}
