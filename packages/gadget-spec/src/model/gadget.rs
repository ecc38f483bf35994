//! The `<Module>` root: a complete gadget document.

use std::collections::BTreeMap;

use url::Url;

use super::content::Content;
use super::module_prefs::ModulePrefs;
use super::user_pref::UserPref;
use super::view::View;
use super::{display_as_xml, ElementBuilder, ElementData, Node, SpecElement};
use crate::config::DEFAULT_VIEW;
use crate::error::{GadgetError, Result};
use crate::registry::ParseContext;
use crate::substitution::Substitutions;
use crate::xml::{QName, XmlWriter};

/// A parsed and validated gadget document.
///
/// The tree is immutable; [`GadgetSpec::substitute`] returns a new tree,
/// so one parsed spec can be shared by concurrent renders.
#[derive(Debug, Clone)]
pub struct GadgetSpec {
    data: ElementData,
    url: Url,
    checksum: String,
    module_prefs: ModulePrefs,
    user_prefs: Vec<UserPref>,
    contents: Vec<Content>,
    views: BTreeMap<String, View>,
}

impl GadgetSpec {
    pub(crate) fn builder(name: QName) -> Box<dyn ElementBuilder> {
        Box::new(ModuleBuilder {
            data: ElementData::new(name),
            module_prefs: None,
            user_prefs: Vec::new(),
            contents: Vec::new(),
        })
    }

    pub(crate) fn with_checksum(mut self, checksum: String) -> Self {
        self.checksum = checksum;
        self
    }

    /// Location the document was loaded from.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Hex SHA-256 of the raw document bytes.
    #[must_use]
    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    #[must_use]
    pub fn module_prefs(&self) -> &ModulePrefs {
        &self.module_prefs
    }

    #[must_use]
    pub fn user_prefs(&self) -> &[UserPref] {
        &self.user_prefs
    }

    #[must_use]
    pub fn user_pref(&self, name: &str) -> Option<&UserPref> {
        self.user_prefs.iter().find(|pref| pref.name() == name)
    }

    /// Content blocks in document order.
    #[must_use]
    pub fn contents(&self) -> &[Content] {
        &self.contents
    }

    /// Merged views keyed by name.
    #[must_use]
    pub fn views(&self) -> &BTreeMap<String, View> {
        &self.views
    }

    #[must_use]
    pub fn view(&self, name: &str) -> Option<&View> {
        self.views.get(name)
    }

    /// The named view, or the `default` view when it does not exist.
    #[must_use]
    pub fn view_or_default(&self, name: &str) -> Option<&View> {
        self.view(name).or_else(|| self.view(DEFAULT_VIEW))
    }

    /// Produce a new tree with every placeholder resolved against
    /// `substitutions`. The receiver is left untouched.
    ///
    /// # Errors
    /// Returns `UnresolvableReference` when a substituted href is no longer
    /// a valid URI reference.
    ///
    /// # Examples
    /// ```
    /// use gadget_spec::{parse_gadget_spec, SubstitutionType, Substitutions};
    /// use url::Url;
    ///
    /// let xml = r#"<Module><ModulePrefs title="__MSG_title__"/>
    ///   <Content type="html">Hello, __MSG_world__</Content></Module>"#;
    /// let url = Url::parse("http://example.org/hello.xml").unwrap();
    /// let spec = parse_gadget_spec(xml.as_bytes(), &url).unwrap();
    ///
    /// let mut subs = Substitutions::new();
    /// subs.add_substitution(SubstitutionType::Message, "title", "Greeter");
    /// subs.add_substitution(SubstitutionType::Message, "world", "Earth");
    ///
    /// let rendered = spec.substitute(&subs).unwrap();
    /// assert_eq!(rendered.module_prefs().title(), "Greeter");
    /// assert_eq!(rendered.view("default").unwrap().content(), "Hello, Earth");
    /// assert_eq!(spec.module_prefs().title(), "__MSG_title__");
    /// ```
    pub fn substitute(&self, substitutions: &Substitutions) -> Result<GadgetSpec> {
        let contents = self
            .contents
            .iter()
            .map(|content| content.substitute(substitutions))
            .collect::<Result<Vec<_>>>()?;
        let views = merge_views(&contents, &self.url)?;
        Ok(GadgetSpec {
            data: self.data.clone(),
            url: self.url.clone(),
            checksum: self.checksum.clone(),
            module_prefs: self.module_prefs.substitute(substitutions, &self.url)?,
            user_prefs: self
                .user_prefs
                .iter()
                .map(|pref| pref.substitute(substitutions))
                .collect(),
            contents,
            views,
        })
    }

    /// Serialize the tree back to XML.
    ///
    /// # Errors
    /// Returns `Serialization` if the writer fails.
    pub fn to_xml(&self) -> Result<String> {
        self.to_xml_string()
    }
}

/// Equality of the document trees; the checksum of the bytes a tree was
/// parsed from is not part of it.
impl PartialEq for GadgetSpec {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
            && self.url == other.url
            && self.module_prefs == other.module_prefs
            && self.user_prefs == other.user_prefs
            && self.contents == other.contents
            && self.views == other.views
    }
}

impl SpecElement for GadgetSpec {
    fn data(&self) -> &ElementData {
        &self.data
    }

    fn write_children(&self, writer: &mut XmlWriter) -> Result<()> {
        self.module_prefs.write_xml(writer)?;
        for pref in &self.user_prefs {
            pref.write_xml(writer)?;
        }
        for content in &self.contents {
            content.write_xml(writer)?;
        }
        Ok(())
    }
}

display_as_xml!(GadgetSpec);

/// Group content blocks by view name, keeping document order inside each
/// group, and merge every group.
fn merge_views(contents: &[Content], base: &Url) -> Result<BTreeMap<String, View>> {
    let mut groups: BTreeMap<&str, Vec<&Content>> = BTreeMap::new();
    for content in contents {
        for view in content.views() {
            groups.entry(view.as_str()).or_default().push(content);
        }
    }
    let mut views = BTreeMap::new();
    for (name, blocks) in groups {
        views.insert(name.to_string(), View::merge(name, &blocks, base)?);
    }
    Ok(views)
}

struct ModuleBuilder {
    data: ElementData,
    module_prefs: Option<ModulePrefs>,
    user_prefs: Vec<UserPref>,
    contents: Vec<Content>,
}

impl ElementBuilder for ModuleBuilder {
    fn data_mut(&mut self) -> &mut ElementData {
        &mut self.data
    }

    fn add_child(&mut self, child: Node) -> Result<()> {
        match child {
            Node::ModulePrefs(prefs) => {
                if self.module_prefs.is_some() {
                    return Err(GadgetError::duplicate(self.data.local_name(), "ModulePrefs"));
                }
                self.module_prefs = Some(*prefs);
            }
            Node::UserPref(pref) => self.user_prefs.push(pref),
            Node::Content(content) => self.contents.push(content),
            other => self.data.push_extension(other),
        }
        Ok(())
    }

    fn build(self: Box<Self>, context: &ParseContext) -> Result<Node> {
        let this = *self;
        let element = this.data.local_name();
        let module_prefs = this
            .module_prefs
            .ok_or_else(|| GadgetError::missing_element(element, "ModulePrefs"))?;
        if this.contents.is_empty() {
            return Err(GadgetError::missing_element(element, "Content"));
        }
        let views = merge_views(&this.contents, context.spec_url())?;

        Ok(Node::Module(Box::new(GadgetSpec {
            data: this.data,
            url: context.spec_url().clone(),
            checksum: String::new(),
            module_prefs,
            user_prefs: this.user_prefs,
            contents: this.contents,
            views,
        })))
    }
}
