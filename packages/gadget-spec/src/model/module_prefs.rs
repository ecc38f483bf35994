//! `<ModulePrefs>` metadata and its children: feature requirements,
//! icons, links and locales.

use std::fmt;

use serde::Serialize;
use url::Url;

use super::coerce;
use super::oauth::OAuthSpec;
use super::{display_as_xml, ElementBuilder, ElementData, LeafBuilder, Node, SpecElement};
use crate::error::{GadgetError, Result};
use crate::registry::ParseContext;
use crate::substitution::Substitutions;
use crate::uri;
use crate::xml::{QName, XmlWriter};

/// String metadata attributes of `<ModulePrefs>`, all substitutable.
const METADATA_ATTRIBUTES: [&str; 12] = [
    "title",
    "title_url",
    "description",
    "author",
    "author_email",
    "screenshot",
    "thumbnail",
    "directory_title",
    "author_affiliation",
    "author_location",
    "category",
    "category2",
];

/// Gadget metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ModulePrefs {
    data: ElementData,
    height: u32,
    width: u32,
    scrolling: bool,
    features: Vec<Feature>,
    icons: Vec<Icon>,
    links: Vec<Link>,
    locales: Vec<Locale>,
    oauth: Option<OAuthSpec>,
}

impl ModulePrefs {
    pub(crate) fn builder(name: QName) -> Box<dyn ElementBuilder> {
        Box::new(ModulePrefsBuilder {
            data: ElementData::new(name),
            features: Vec::new(),
            icons: Vec::new(),
            links: Vec::new(),
            locales: Vec::new(),
            oauth: None,
        })
    }

    fn metadata(&self, attribute: &str) -> &str {
        self.data.attribute(attribute).unwrap_or_default()
    }

    #[must_use]
    pub fn title(&self) -> &str {
        self.metadata("title")
    }

    #[must_use]
    pub fn title_url(&self) -> &str {
        self.metadata("title_url")
    }

    #[must_use]
    pub fn description(&self) -> &str {
        self.metadata("description")
    }

    #[must_use]
    pub fn author(&self) -> &str {
        self.metadata("author")
    }

    #[must_use]
    pub fn author_email(&self) -> &str {
        self.metadata("author_email")
    }

    #[must_use]
    pub fn author_affiliation(&self) -> &str {
        self.metadata("author_affiliation")
    }

    #[must_use]
    pub fn author_location(&self) -> &str {
        self.metadata("author_location")
    }

    #[must_use]
    pub fn screenshot(&self) -> &str {
        self.metadata("screenshot")
    }

    #[must_use]
    pub fn thumbnail(&self) -> &str {
        self.metadata("thumbnail")
    }

    #[must_use]
    pub fn directory_title(&self) -> &str {
        self.metadata("directory_title")
    }

    /// Non-empty `category` and `category2` values.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        ["category", "category2"]
            .into_iter()
            .map(|attribute| self.metadata(attribute))
            .filter(|category| !category.is_empty())
            .collect()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn scrolling(&self) -> bool {
        self.scrolling
    }

    /// Declared features, `<Require>` and `<Optional>` alike.
    #[must_use]
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    #[must_use]
    pub fn feature(&self, name: &str) -> Option<&Feature> {
        self.features.iter().find(|feature| feature.name() == name)
    }

    #[must_use]
    pub fn icons(&self) -> &[Icon] {
        &self.icons
    }

    #[must_use]
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    #[must_use]
    pub fn link(&self, rel: &str) -> Option<&Link> {
        self.links.iter().find(|link| link.rel() == rel)
    }

    #[must_use]
    pub fn locales(&self) -> &[Locale] {
        &self.locales
    }

    /// Locale matching a language and country exactly.
    #[must_use]
    pub fn locale(&self, language: &str, country: &str) -> Option<&Locale> {
        self.locales
            .iter()
            .find(|locale| locale.language() == language && locale.country() == country)
    }

    #[must_use]
    pub fn oauth(&self) -> Option<&OAuthSpec> {
        self.oauth.as_ref()
    }

    /// Copy with placeholders replaced in the metadata and in every child
    /// that carries substitutable text. OAuth descriptors are copied as is.
    ///
    /// # Errors
    /// Returns `UnresolvableReference` when a substituted link or message
    /// bundle href is invalid.
    pub fn substitute(&self, substitutions: &Substitutions, base: &Url) -> Result<ModulePrefs> {
        Ok(ModulePrefs {
            data: self
                .data
                .substituted_fields(substitutions, false, &METADATA_ATTRIBUTES),
            height: self.height,
            width: self.width,
            scrolling: self.scrolling,
            features: self
                .features
                .iter()
                .map(|feature| feature.substitute(substitutions))
                .collect(),
            icons: self
                .icons
                .iter()
                .map(|icon| icon.substitute(substitutions))
                .collect(),
            links: self
                .links
                .iter()
                .map(|link| link.substitute(substitutions, base))
                .collect::<Result<_>>()?,
            locales: self
                .locales
                .iter()
                .map(|locale| locale.substitute(substitutions, base))
                .collect::<Result<_>>()?,
            oauth: self.oauth.clone(),
        })
    }
}

impl SpecElement for ModulePrefs {
    fn data(&self) -> &ElementData {
        &self.data
    }

    fn write_children(&self, writer: &mut XmlWriter) -> Result<()> {
        for feature in &self.features {
            feature.write_xml(writer)?;
        }
        for icon in &self.icons {
            icon.write_xml(writer)?;
        }
        for link in &self.links {
            link.write_xml(writer)?;
        }
        for locale in &self.locales {
            locale.write_xml(writer)?;
        }
        if let Some(oauth) = &self.oauth {
            oauth.write_xml(writer)?;
        }
        Ok(())
    }
}

struct ModulePrefsBuilder {
    data: ElementData,
    features: Vec<Feature>,
    icons: Vec<Icon>,
    links: Vec<Link>,
    locales: Vec<Locale>,
    oauth: Option<OAuthSpec>,
}

impl ElementBuilder for ModulePrefsBuilder {
    fn data_mut(&mut self) -> &mut ElementData {
        &mut self.data
    }

    fn add_child(&mut self, child: Node) -> Result<()> {
        match child {
            Node::Feature(feature) => {
                // A later declaration of the same feature replaces the earlier.
                match self
                    .features
                    .iter_mut()
                    .find(|existing| existing.name() == feature.name())
                {
                    Some(existing) => *existing = feature,
                    None => self.features.push(feature),
                }
            }
            Node::Icon(icon) => self.icons.push(icon),
            Node::Link(link) => self.links.push(link),
            Node::Locale(locale) => self.locales.push(locale),
            Node::OAuth(oauth) => {
                if self.oauth.is_some() {
                    return Err(GadgetError::duplicate(self.data.local_name(), "OAuth"));
                }
                self.oauth = Some(oauth);
            }
            other => self.data.push_extension(other),
        }
        Ok(())
    }

    fn build(self: Box<Self>, _context: &ParseContext) -> Result<Node> {
        let height = coerce::lenient_integer(&self.data, "height", 0);
        let width = coerce::lenient_integer(&self.data, "width", 0);
        let scrolling = coerce::lenient_boolean(&self.data, "scrolling", false);
        Ok(Node::ModulePrefs(Box::new(ModulePrefs {
            data: self.data,
            height,
            width,
            scrolling,
            features: self.features,
            icons: self.icons,
            links: self.links,
            locales: self.locales,
            oauth: self.oauth,
        })))
    }
}

/// A `<Require>` or `<Optional>` feature declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    data: ElementData,
    params: Vec<FeatureParam>,
}

impl Feature {
    pub(crate) fn builder(name: QName) -> Box<dyn ElementBuilder> {
        Box::new(FeatureBuilder {
            data: ElementData::new(name),
            params: Vec::new(),
        })
    }

    /// Feature name from the `feature` attribute.
    #[must_use]
    pub fn name(&self) -> &str {
        self.data.attribute("feature").unwrap_or_default()
    }

    /// True for `<Require>`, false for `<Optional>`.
    #[must_use]
    pub fn required(&self) -> bool {
        self.data.name().is("Require")
    }

    #[must_use]
    pub fn params(&self) -> &[FeatureParam] {
        &self.params
    }

    /// Value of the last parameter with the given name.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .rev()
            .find(|param| param.name() == name)
            .map(FeatureParam::value)
    }

    fn substitute(&self, substitutions: &Substitutions) -> Feature {
        Feature {
            data: self.data.clone(),
            params: self
                .params
                .iter()
                .map(|param| param.substitute(substitutions))
                .collect(),
        }
    }
}

impl SpecElement for Feature {
    fn data(&self) -> &ElementData {
        &self.data
    }

    fn write_children(&self, writer: &mut XmlWriter) -> Result<()> {
        for param in &self.params {
            param.write_xml(writer)?;
        }
        Ok(())
    }
}

struct FeatureBuilder {
    data: ElementData,
    params: Vec<FeatureParam>,
}

impl ElementBuilder for FeatureBuilder {
    fn data_mut(&mut self) -> &mut ElementData {
        &mut self.data
    }

    fn add_child(&mut self, child: Node) -> Result<()> {
        match child {
            Node::FeatureParam(param) => self.params.push(param),
            other => self.data.push_extension(other),
        }
        Ok(())
    }

    fn build(self: Box<Self>, _context: &ParseContext) -> Result<Node> {
        coerce::required(&self.data, "feature")?;
        Ok(Node::Feature(Feature {
            data: self.data,
            params: self.params,
        }))
    }
}

/// A `<Param>` of a feature declaration; the value is the element text.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureParam {
    data: ElementData,
}

impl FeatureParam {
    pub(crate) fn builder(name: QName) -> Box<dyn ElementBuilder> {
        LeafBuilder::boxed(name, |data, _| {
            coerce::required(&data, "name")?;
            Ok(Node::FeatureParam(FeatureParam { data }))
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.data.attribute("name").unwrap_or_default()
    }

    #[must_use]
    pub fn value(&self) -> &str {
        self.data.text().trim()
    }

    fn substitute(&self, substitutions: &Substitutions) -> FeatureParam {
        FeatureParam {
            data: self.data.substituted_fields(substitutions, true, &[]),
        }
    }
}

impl SpecElement for FeatureParam {
    fn data(&self) -> &ElementData {
        &self.data
    }
}

/// An `<Icon>`, either a URL or inline encoded image data.
#[derive(Debug, Clone, PartialEq)]
pub struct Icon {
    data: ElementData,
}

impl Icon {
    pub(crate) fn builder(name: QName) -> Box<dyn ElementBuilder> {
        LeafBuilder::boxed(name, |data, _| Ok(Node::Icon(Icon { data })))
    }

    /// Encoding mode, e.g. `base64`.
    #[must_use]
    pub fn mode(&self) -> Option<&str> {
        self.data.attribute("mode")
    }

    /// MIME type of inline data.
    #[must_use]
    pub fn mime_type(&self) -> Option<&str> {
        self.data.attribute("type")
    }

    #[must_use]
    pub fn content(&self) -> &str {
        self.data.text().trim()
    }

    fn substitute(&self, substitutions: &Substitutions) -> Icon {
        Icon {
            data: self.data.substituted_fields(substitutions, true, &[]),
        }
    }
}

impl SpecElement for Icon {
    fn data(&self) -> &ElementData {
        &self.data
    }
}

/// A `<Link rel href>` to a related resource.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    data: ElementData,
    href: Url,
}

impl Link {
    pub(crate) fn builder(name: QName) -> Box<dyn ElementBuilder> {
        LeafBuilder::boxed(name, |data, context| {
            Ok(Node::Link(Link::assemble(data, context.spec_url())?))
        })
    }

    fn assemble(data: ElementData, base: &Url) -> Result<Self> {
        coerce::required(&data, "rel")?;
        let raw = coerce::required(&data, "href")?;
        let href = uri::resolve(raw, base).map_err(|reason| {
            GadgetError::invalid_value(data.local_name(), "href", raw, format!("a URI ({reason})"))
        })?;
        Ok(Self { data, href })
    }

    #[must_use]
    pub fn rel(&self) -> &str {
        self.data.attribute("rel").unwrap_or_default()
    }

    /// href resolved against the document URL.
    #[must_use]
    pub fn href(&self) -> &Url {
        &self.href
    }

    fn substitute(&self, substitutions: &Substitutions, base: &Url) -> Result<Link> {
        let data = self.data.substituted_fields(substitutions, false, &["href"]);
        let raw = data.attribute("href").unwrap_or_default();
        let href = uri::resolve(raw, base)
            .map_err(|reason| GadgetError::unresolvable(data.local_name(), "href", raw, reason))?;
        Ok(Link { data, href })
    }
}

impl SpecElement for Link {
    fn data(&self) -> &ElementData {
        &self.data
    }
}

/// Text direction of a locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    #[default]
    Ltr,
    Rtl,
}

impl TextDirection {
    #[must_use]
    pub fn is_rtl(&self) -> bool {
        *self == TextDirection::Rtl
    }
}

impl fmt::Display for TextDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TextDirection::Ltr => "ltr",
            TextDirection::Rtl => "rtl",
        })
    }
}

/// A `<Locale>` supported by the gadget.
#[derive(Debug, Clone, PartialEq)]
pub struct Locale {
    data: ElementData,
    messages: Option<Url>,
    direction: TextDirection,
}

impl Locale {
    pub(crate) fn builder(name: QName) -> Box<dyn ElementBuilder> {
        LeafBuilder::boxed(name, |data, context| {
            Ok(Node::Locale(Locale::assemble(data, context.spec_url())?))
        })
    }

    fn assemble(data: ElementData, base: &Url) -> Result<Self> {
        let direction = coerce::keyword(
            &data,
            "language_direction",
            &[("ltr", TextDirection::Ltr), ("rtl", TextDirection::Rtl)],
            TextDirection::Ltr,
        )?;
        let messages = data
            .attribute("messages")
            .map(|raw| {
                uri::resolve(raw, base).map_err(|reason| {
                    GadgetError::invalid_value(
                        data.local_name(),
                        "messages",
                        raw,
                        format!("a URI ({reason})"),
                    )
                })
            })
            .transpose()?;
        Ok(Self {
            data,
            messages,
            direction,
        })
    }

    /// Language code; `all` when absent.
    #[must_use]
    pub fn language(&self) -> &str {
        self.data.attribute("lang").unwrap_or("all")
    }

    /// Country code; `ALL` when absent.
    #[must_use]
    pub fn country(&self) -> &str {
        self.data.attribute("country").unwrap_or("ALL")
    }

    /// Message bundle location resolved against the document URL.
    #[must_use]
    pub fn messages(&self) -> Option<&Url> {
        self.messages.as_ref()
    }

    #[must_use]
    pub fn direction(&self) -> TextDirection {
        self.direction
    }

    fn substitute(&self, substitutions: &Substitutions, base: &Url) -> Result<Locale> {
        let data = self
            .data
            .substituted_fields(substitutions, false, &["messages"]);
        let messages = data
            .attribute("messages")
            .map(|raw| {
                uri::resolve(raw, base).map_err(|reason| {
                    GadgetError::unresolvable(data.local_name(), "messages", raw, reason)
                })
            })
            .transpose()?;
        Ok(Locale {
            messages,
            direction: self.direction,
            data,
        })
    }
}

impl SpecElement for Locale {
    fn data(&self) -> &ElementData {
        &self.data
    }
}

display_as_xml!(ModulePrefs, Feature, FeatureParam, Icon, Link, Locale);
