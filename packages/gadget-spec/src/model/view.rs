//! View merge: every content block naming the same view is folded into a
//! single [`View`].

use std::collections::BTreeMap;

use url::Url;

use super::content::{Content, ContentType};
use crate::config::{DEFAULT_QUIRKS, DEFAULT_SIGN};
use crate::error::{GadgetError, Result};
use crate::substitution::Substitutions;
use crate::uri;

/// A named rendering target merged from one or more content blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    name: String,
    content_type: ContentType,
    raw_type: Option<String>,
    quirks: bool,
    preferred_height: u32,
    preferred_width: u32,
    sign_owner: bool,
    sign_viewer: bool,
    content: String,
    raw_href: Option<String>,
    href: Option<Url>,
    attributes: BTreeMap<String, String>,
    contents: Vec<Content>,
    base: Url,
}

impl View {
    /// Merge content blocks, in document order, into one view.
    ///
    /// Declared values cascade last-wins, bodies are concatenated, and
    /// pass-through attributes of later blocks overwrite earlier ones.
    ///
    /// # Errors
    /// Returns `ConflictingAttribute` when the blocks mix `html` and `url`
    /// content, and `UnresolvableReference` when an href cannot be
    /// resolved against `base`.
    pub fn merge(name: &str, blocks: &[&Content], base: &Url) -> Result<View> {
        let mut view = View {
            name: name.to_string(),
            content_type: ContentType::Html,
            raw_type: None,
            quirks: DEFAULT_QUIRKS,
            preferred_height: 0,
            preferred_width: 0,
            sign_owner: DEFAULT_SIGN,
            sign_viewer: DEFAULT_SIGN,
            content: String::new(),
            raw_href: None,
            href: None,
            attributes: BTreeMap::new(),
            contents: blocks.iter().map(|block| (*block).clone()).collect(),
            base: base.clone(),
        };
        let mut merged_type: Option<ContentType> = None;

        for block in blocks {
            // An href without a declared type implies url content.
            let block_type = block
                .content_type()
                .or_else(|| block.href().map(|_| ContentType::Url));
            if let Some(block_type) = block_type {
                match merged_type {
                    Some(previous) if previous != block_type => {
                        return Err(GadgetError::conflict(
                            "Content",
                            format!(
                                "view '{name}' mixes '{previous}' and '{block_type}' content"
                            ),
                        ));
                    }
                    _ => merged_type = Some(block_type),
                }
            }
            if let Some(raw_type) = block.raw_type() {
                view.raw_type = Some(raw_type.to_string());
            }

            if let Some(quirks) = block.quirks() {
                view.quirks = quirks;
            }
            if let Some(height) = block.preferred_height() {
                view.preferred_height = height;
            }
            if let Some(width) = block.preferred_width() {
                view.preferred_width = width;
            }
            if let Some(sign_owner) = block.sign_owner() {
                view.sign_owner = sign_owner;
            }
            if let Some(sign_viewer) = block.sign_viewer() {
                view.sign_viewer = sign_viewer;
            }

            if let Some(href) = block.href() {
                let resolved = uri::resolve(href, base).map_err(|reason| {
                    GadgetError::unresolvable("Content", "href", href, reason)
                })?;
                view.raw_href = Some(href.to_string());
                view.href = Some(resolved);
            }

            view.content.push_str(block.body());
            for (key, value) in block.pass_through() {
                view.attributes
                    .insert(key.qualified().into_owned(), value.to_string());
            }
        }

        view.content_type = merged_type.unwrap_or(ContentType::Html);
        if view.content_type == ContentType::Url {
            view.content.clear();
        }
        Ok(view)
    }

    /// New view merged from substituted copies of the constituent blocks.
    ///
    /// # Errors
    /// Returns `UnresolvableReference` when a substituted href is invalid.
    pub fn substitute(&self, substitutions: &Substitutions) -> Result<View> {
        let contents = self
            .contents
            .iter()
            .map(|block| block.substitute(substitutions))
            .collect::<Result<Vec<_>>>()?;
        let blocks: Vec<&Content> = contents.iter().collect();
        View::merge(&self.name, &blocks, &self.base)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    /// Last declared `type` attribute, or the merged type when none was
    /// declared.
    #[must_use]
    pub fn raw_type(&self) -> &str {
        self.raw_type
            .as_deref()
            .unwrap_or_else(|| self.content_type.as_str())
    }

    #[must_use]
    pub fn is_quirks(&self) -> bool {
        self.quirks
    }

    #[must_use]
    pub fn preferred_height(&self) -> u32 {
        self.preferred_height
    }

    #[must_use]
    pub fn preferred_width(&self) -> u32 {
        self.preferred_width
    }

    #[must_use]
    pub fn sign_owner(&self) -> bool {
        self.sign_owner
    }

    #[must_use]
    pub fn sign_viewer(&self) -> bool {
        self.sign_viewer
    }

    /// Concatenated body of every block; empty for url views.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Resolved href of a url view.
    #[must_use]
    pub fn href(&self) -> Option<&Url> {
        self.href.as_ref()
    }

    /// href as written in the last block declaring one.
    #[must_use]
    pub fn raw_href(&self) -> Option<&str> {
        self.raw_href.as_deref()
    }

    /// Pass-through attributes keyed by qualified name.
    #[must_use]
    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// The content blocks this view was merged from.
    #[must_use]
    pub fn contents(&self) -> &[Content] {
        &self.contents
    }
}
