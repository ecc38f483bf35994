//! `<Content>` blocks.

use std::fmt;

use serde::Serialize;
use url::Url;

use super::coerce;
use super::{display_as_xml, ElementBuilder, ElementData, LeafBuilder, Node, SpecElement};
use crate::config::DEFAULT_VIEW;
use crate::error::{GadgetError, Result};
use crate::substitution::Substitutions;
use crate::uri;
use crate::xml::QName;

/// Attributes with a typed meaning; everything else passes through.
const KNOWN_ATTRIBUTES: [&str; 8] = [
    "type",
    "href",
    "view",
    "quirks",
    "preferred_height",
    "preferred_width",
    "sign_owner",
    "sign_viewer",
];

/// How a view is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// Inline markup carried in the element body.
    Html,
    /// External page referenced by `href`.
    Url,
}

impl ContentType {
    /// Map a raw `type` attribute. Only `url` is special; any other value
    /// (`html`, `html-inline`, vendor types) renders as HTML.
    #[must_use]
    pub fn from_raw(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("url") {
            ContentType::Url
        } else {
            ContentType::Html
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Html => "html",
            ContentType::Url => "url",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_pass_through(name: &QName) -> bool {
    if name.is_namespace_declaration() {
        return false;
    }
    name.namespace().is_some() || !KNOWN_ATTRIBUTES.contains(&name.local_part())
}

/// One content block contributing to one or more views.
///
/// Optional fields are `None` when the attribute was not declared, so that
/// view merging can tell an explicit value from a default.
#[derive(Debug, Clone, PartialEq)]
pub struct Content {
    data: ElementData,
    content_type: Option<ContentType>,
    views: Vec<String>,
    quirks: Option<bool>,
    preferred_height: Option<u32>,
    preferred_width: Option<u32>,
    sign_owner: Option<bool>,
    sign_viewer: Option<bool>,
}

impl Content {
    pub(crate) fn builder(name: QName) -> Box<dyn ElementBuilder> {
        LeafBuilder::boxed(name, |data, context| {
            let content = Content::from_data(data)?;
            content.check_href(context.spec_url())?;
            Ok(Node::Content(content))
        })
    }

    /// Check that the href resolves against the document URL.
    fn check_href(&self, base: &Url) -> Result<()> {
        if let Some(href) = self.href() {
            uri::resolve(href, base).map_err(|reason| {
                GadgetError::invalid_value(
                    self.data.local_name(),
                    "href",
                    href,
                    format!("a resolvable URI ({reason})"),
                )
            })?;
        }
        Ok(())
    }

    pub(crate) fn from_data(data: ElementData) -> Result<Self> {
        let element = data.local_name();
        let content_type = data.attribute("type").map(ContentType::from_raw);
        let href = data.attribute("href");

        if let Some(href) = href {
            uri::validate_reference(href).map_err(|reason| {
                GadgetError::invalid_value(element, "href", href, format!("a URI ({reason})"))
            })?;
        }
        match (content_type, href) {
            (Some(ContentType::Html), Some(_)) => {
                return Err(GadgetError::conflict(
                    element,
                    "href is only allowed with type=\"url\"",
                ))
            }
            (Some(ContentType::Url), None) => {
                return Err(GadgetError::conflict(
                    element,
                    "type=\"url\" requires an href attribute",
                ))
            }
            _ => {}
        }

        let views = parse_views(data.attribute("view"));
        let quirks = coerce::boolean(&data, "quirks")?;
        let preferred_height = coerce::integer(&data, "preferred_height")?;
        let preferred_width = coerce::integer(&data, "preferred_width")?;
        let sign_owner = coerce::boolean(&data, "sign_owner")?;
        let sign_viewer = coerce::boolean(&data, "sign_viewer")?;

        Ok(Self {
            data,
            content_type,
            views,
            quirks,
            preferred_height,
            preferred_width,
            sign_owner,
            sign_viewer,
        })
    }

    /// Declared content type, if any.
    #[must_use]
    pub fn content_type(&self) -> Option<ContentType> {
        self.content_type
    }

    /// `type` attribute as written.
    #[must_use]
    pub fn raw_type(&self) -> Option<&str> {
        self.data.attribute("type")
    }

    /// `href` attribute as written, before resolution.
    #[must_use]
    pub fn href(&self) -> Option<&str> {
        self.data.attribute("href")
    }

    /// Names of the views this block contributes to.
    #[must_use]
    pub fn views(&self) -> &[String] {
        &self.views
    }

    #[must_use]
    pub fn quirks(&self) -> Option<bool> {
        self.quirks
    }

    #[must_use]
    pub fn preferred_height(&self) -> Option<u32> {
        self.preferred_height
    }

    #[must_use]
    pub fn preferred_width(&self) -> Option<u32> {
        self.preferred_width
    }

    #[must_use]
    pub fn sign_owner(&self) -> Option<bool> {
        self.sign_owner
    }

    #[must_use]
    pub fn sign_viewer(&self) -> Option<bool> {
        self.sign_viewer
    }

    /// Element body, CDATA and entity references included.
    #[must_use]
    pub fn body(&self) -> &str {
        self.data.text()
    }

    /// Attributes without a typed meaning, in sorted order.
    pub fn pass_through(&self) -> impl Iterator<Item = (&QName, &str)> {
        self.data
            .attributes()
            .iter()
            .filter(|(name, _)| is_pass_through(name))
            .map(|(name, value)| (name, value.as_str()))
    }

    /// Copy with placeholders replaced in the body, the href and every
    /// pass-through attribute.
    ///
    /// # Errors
    /// Returns `UnresolvableReference` when the substituted href is not a
    /// valid URI reference.
    pub fn substitute(&self, substitutions: &Substitutions) -> Result<Content> {
        let data = self.data.substituted(substitutions, true, |name| {
            name.is("href") || is_pass_through(name)
        });
        if let Some(href) = data.attribute("href") {
            uri::validate_reference(href).map_err(|reason| {
                GadgetError::unresolvable(data.local_name(), "href", href, reason)
            })?;
        }
        Content::from_data(data)
    }
}

/// Split a comma-separated `view` attribute, dropping blank entries.
fn parse_views(raw: Option<&str>) -> Vec<String> {
    let views: Vec<String> = raw
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|view| !view.is_empty())
        .map(str::to_string)
        .collect();
    if views.is_empty() {
        vec![DEFAULT_VIEW.to_string()]
    } else {
        views
    }
}

impl SpecElement for Content {
    fn data(&self) -> &ElementData {
        &self.data
    }
}

display_as_xml!(Content);
