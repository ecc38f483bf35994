//! Typed element model of a gadget document.
//!
//! Every node is produced by a mutable builder ([`ElementBuilder`]) that
//! collects attributes, text and children while the document is read, and
//! is frozen into an immutable node once [`ElementBuilder::build`] has
//! validated it. Frozen nodes share the read-only [`SpecElement`] surface
//! and are gathered into the [`Node`] sum type.

mod coerce;
pub mod content;
pub mod gadget;
pub mod module_prefs;
pub mod oauth;
pub mod raw;
pub mod user_pref;
pub mod view;

use std::collections::BTreeMap;
use std::fmt;

use crate::error::Result;
use crate::registry::ParseContext;
use crate::substitution::Substitutions;
use crate::xml::{QName, XmlWriter};

pub use content::{Content, ContentType};
pub use gadget::GadgetSpec;
pub use module_prefs::{Feature, FeatureParam, Icon, Link, Locale, ModulePrefs, TextDirection};
pub use oauth::{
    EndpointKind, HttpMethod, OAuthAuthorization, OAuthEndpoint, OAuthService, OAuthSpec,
    ParamLocation,
};
pub use raw::{RawElement, RawElementParser};
pub use user_pref::{DataType, EnumValue, UserPref};
pub use view::View;

/// Raw attribute values keyed by qualified name.
pub type Attributes = BTreeMap<QName, String>;

/// State shared by every node: tag name, raw attributes, accumulated text
/// and children contributed by extension parsers.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementData {
    name: QName,
    attributes: Attributes,
    text: String,
    extensions: Vec<Node>,
}

impl ElementData {
    #[must_use]
    pub fn new(name: QName) -> Self {
        Self {
            name,
            attributes: Attributes::new(),
            text: String::new(),
            extensions: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &QName {
        &self.name
    }

    #[must_use]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Value of an attribute in no namespace.
    #[must_use]
    pub fn attribute(&self, local: &str) -> Option<&str> {
        self.attributes
            .get(&QName::local(local))
            .map(String::as_str)
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn extensions(&self) -> &[Node] {
        &self.extensions
    }

    pub(crate) fn local_name(&self) -> &str {
        self.name.local_part()
    }

    pub(crate) fn set_attribute(&mut self, name: QName, value: String) {
        self.attributes.insert(name, value);
    }

    pub(crate) fn push_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    pub(crate) fn push_extension(&mut self, node: Node) {
        self.extensions.push(node);
    }

    /// Copy of this data with placeholders replaced in the text (when
    /// `text` is set) and in every attribute accepted by `substitutable`.
    pub(crate) fn substituted(
        &self,
        substitutions: &Substitutions,
        text: bool,
        substitutable: impl Fn(&QName) -> bool,
    ) -> ElementData {
        let mut data = self.clone();
        if text {
            data.text = substitutions.substitute_string(&self.text).into_owned();
        }
        for (name, value) in &mut data.attributes {
            if substitutable(name) {
                *value = substitutions.substitute_string(value).into_owned();
            }
        }
        data
    }

    /// Substituted copy for elements whose substitutable attributes are a
    /// fixed list of unqualified names.
    pub(crate) fn substituted_fields(
        &self,
        substitutions: &Substitutions,
        text: bool,
        fields: &[&str],
    ) -> ElementData {
        self.substituted(substitutions, text, |name| {
            name.namespace().is_none() && fields.contains(&name.local_part())
        })
    }
}

/// Read-only surface shared by every frozen node.
pub trait SpecElement {
    fn data(&self) -> &ElementData;

    fn name(&self) -> &QName {
        self.data().name()
    }

    fn attributes(&self) -> &Attributes {
        self.data().attributes()
    }

    fn attribute(&self, local: &str) -> Option<&str> {
        self.data().attribute(local)
    }

    fn text(&self) -> &str {
        self.data().text()
    }

    fn extensions(&self) -> &[Node] {
        self.data().extensions()
    }

    /// Write typed children. Leaf nodes keep the default.
    fn write_children(&self, _writer: &mut XmlWriter) -> Result<()> {
        Ok(())
    }

    /// Write this element: attributes, text, typed children, then
    /// extension children.
    fn write_xml(&self, writer: &mut XmlWriter) -> Result<()> {
        let data = self.data();
        writer.start_element(
            data.name(),
            data.attributes().iter().map(|(k, v)| (k, v.as_str())),
        )?;
        writer.text(data.text())?;
        self.write_children(writer)?;
        for extension in data.extensions() {
            extension.write_xml(writer)?;
        }
        writer.end_element(data.name())
    }

    fn to_xml_string(&self) -> Result<String> {
        let mut writer = XmlWriter::new();
        self.write_xml(&mut writer)?;
        writer.into_string()
    }
}

/// Mutable form of a node while its element is being read.
pub trait ElementBuilder {
    fn data_mut(&mut self) -> &mut ElementData;

    /// Record an attribute. Coercion to typed values happens in
    /// [`ElementBuilder::build`], where the owning element decides whether
    /// a bad value is fatal or falls back to a default.
    fn set_attribute(&mut self, name: QName, value: String) -> Result<()> {
        self.data_mut().set_attribute(name, value);
        Ok(())
    }

    fn add_text(&mut self, text: &str) {
        self.data_mut().push_text(text);
    }

    /// Accept a parsed child. Children the element has no typed slot for
    /// are kept as extensions.
    fn add_child(&mut self, child: Node) -> Result<()> {
        self.data_mut().push_extension(child);
        Ok(())
    }

    /// Validate and freeze. Called once every child has been built.
    fn build(self: Box<Self>, context: &ParseContext) -> Result<Node>;
}

/// Builder for elements without typed children: the frozen node is
/// derived from the collected data alone.
pub(crate) struct LeafBuilder {
    data: ElementData,
    freeze: fn(ElementData, &ParseContext) -> Result<Node>,
}

impl LeafBuilder {
    pub(crate) fn boxed(
        name: QName,
        freeze: fn(ElementData, &ParseContext) -> Result<Node>,
    ) -> Box<dyn ElementBuilder> {
        Box::new(Self {
            data: ElementData::new(name),
            freeze,
        })
    }
}

impl ElementBuilder for LeafBuilder {
    fn data_mut(&mut self) -> &mut ElementData {
        &mut self.data
    }

    fn build(self: Box<Self>, context: &ParseContext) -> Result<Node> {
        (self.freeze)(self.data, context)
    }
}

/// Any frozen node of the element model.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Module(Box<GadgetSpec>),
    ModulePrefs(Box<ModulePrefs>),
    Feature(Feature),
    FeatureParam(FeatureParam),
    Icon(Icon),
    Link(Link),
    Locale(Locale),
    OAuth(OAuthSpec),
    OAuthService(OAuthService),
    OAuthEndpoint(OAuthEndpoint),
    OAuthAuthorization(OAuthAuthorization),
    UserPref(UserPref),
    EnumValue(EnumValue),
    Content(Content),
    Raw(RawElement),
}

impl Node {
    fn element(&self) -> &dyn SpecElement {
        match self {
            Node::Module(n) => &**n,
            Node::ModulePrefs(n) => &**n,
            Node::Feature(n) => n,
            Node::FeatureParam(n) => n,
            Node::Icon(n) => n,
            Node::Link(n) => n,
            Node::Locale(n) => n,
            Node::OAuth(n) => n,
            Node::OAuthService(n) => n,
            Node::OAuthEndpoint(n) => n,
            Node::OAuthAuthorization(n) => n,
            Node::UserPref(n) => n,
            Node::EnumValue(n) => n,
            Node::Content(n) => n,
            Node::Raw(n) => n,
        }
    }
}

impl SpecElement for Node {
    fn data(&self) -> &ElementData {
        self.element().data()
    }

    fn write_children(&self, writer: &mut XmlWriter) -> Result<()> {
        self.element().write_children(writer)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let xml = self.to_xml_string().map_err(|_| fmt::Error)?;
        f.write_str(&xml)
    }
}

/// `Display` as serialized XML for frozen node types.
macro_rules! display_as_xml {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl std::fmt::Display for $ty {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    let xml = $crate::model::SpecElement::to_xml_string(self)
                        .map_err(|_| std::fmt::Error)?;
                    f.write_str(&xml)
                }
            }
        )+
    };
}
pub(crate) use display_as_xml;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::substitution::SubstitutionType;

    fn data() -> ElementData {
        let mut data = ElementData::new(QName::local("Icon"));
        data.set_attribute(QName::local("mode"), "__MSG_mode__".to_string());
        data.set_attribute(QName::local("title"), "__MSG_mode__".to_string());
        data.push_text("__MSG_mode__");
        data
    }

    #[test]
    fn test_attribute_lookup_ignores_namespaced() {
        let mut data = data();
        data.set_attribute(QName::with_namespace("urn:x", "href"), "a".to_string());
        assert_eq!(data.attribute("mode"), Some("__MSG_mode__"));
        assert_eq!(data.attribute("href"), None);
    }

    #[test]
    fn test_substituted_fields_only_touches_listed() {
        let mut subs = Substitutions::new();
        subs.add_substitution(SubstitutionType::Message, "mode", "base64");

        let out = data().substituted_fields(&subs, true, &["mode"]);
        assert_eq!(out.attribute("mode"), Some("base64"));
        assert_eq!(out.attribute("title"), Some("__MSG_mode__"));
        assert_eq!(out.text(), "base64");

        let untouched = data().substituted_fields(&subs, false, &[]);
        assert_eq!(untouched, data());
    }

    #[test]
    fn test_write_xml_sorted_attributes() {
        let mut data = ElementData::new(QName::local("Raw"));
        data.set_attribute(QName::local("b"), "2".to_string());
        data.set_attribute(QName::local("a"), "1".to_string());
        data.push_text("x");
        let node = Node::Raw(RawElement::from_data(data));
        assert_eq!(node.to_string(), r#"<Raw a="1" b="2">x</Raw>"#);
    }
}
