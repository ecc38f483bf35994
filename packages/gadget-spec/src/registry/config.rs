//! Registry configuration for gadget documents.

use std::collections::HashMap;
use std::sync::Arc;

use super::handler::{BuilderFn, ElementParser, SpecElementParser};
use crate::model::{
    Content, EnumValue, Feature, FeatureParam, GadgetSpec, Icon, Link, Locale, ModulePrefs,
    OAuthAuthorization, OAuthEndpoint, OAuthService, OAuthSpec, UserPref,
};
use crate::xml::QName;

/// Caller-supplied parsers for elements the core does not know about,
/// keyed by the local name of the element they may appear under.
#[derive(Clone, Default)]
pub struct Extensions {
    by_parent: HashMap<String, Vec<Arc<dyn ElementParser>>>,
}

impl Extensions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `parser`'s element below every `parent` element.
    ///
    /// A parser registered under the name of a built-in child replaces it.
    pub fn register(&mut self, parent: impl Into<String>, parser: impl ElementParser + 'static) {
        self.by_parent
            .entry(parent.into())
            .or_default()
            .push(Arc::new(parser));
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_parent.is_empty()
    }

    fn for_parent(&self, parent: &str) -> &[Arc<dyn ElementParser>] {
        self.by_parent
            .get(parent)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Build the parser for `name`: built-in children first, then extensions.
fn element(
    name: &str,
    factory: BuilderFn,
    children: Vec<SpecElementParser>,
    extensions: &Extensions,
) -> SpecElementParser {
    let mut parser = SpecElementParser::new(QName::local(name), factory);
    for child in children {
        parser.children_mut().register(child);
    }
    for extension in extensions.for_parent(name) {
        parser.children_mut().register_shared(Arc::clone(extension));
    }
    parser
}

fn leaf(name: &str, factory: BuilderFn, extensions: &Extensions) -> SpecElementParser {
    element(name, factory, Vec::new(), extensions)
}

/// Create the parser tree for gadget documents.
///
/// The root parser accepts `<Module>` and knows every element of the
/// gadget element model.
#[must_use]
pub fn create_gadget_parser() -> SpecElementParser {
    create_gadget_parser_with(&Extensions::new())
}

/// Create the parser tree for gadget documents with extension parsers.
#[must_use]
pub fn create_gadget_parser_with(extensions: &Extensions) -> SpecElementParser {
    let ext = extensions;

    let service = element(
        "Service",
        OAuthService::builder,
        vec![
            leaf("Request", OAuthEndpoint::request_builder, ext),
            leaf("Access", OAuthEndpoint::access_builder, ext),
            leaf("Authorization", OAuthAuthorization::builder, ext),
        ],
        ext,
    );
    let oauth = element("OAuth", OAuthSpec::builder, vec![service], ext);

    let mut locale = leaf("Locale", Locale::builder, ext);
    // Inline message bundles are resolved by the container, not the parser.
    locale.children_mut().skip(["msg"]);

    let module_prefs = element(
        "ModulePrefs",
        ModulePrefs::builder,
        vec![
            element(
                "Require",
                Feature::builder,
                vec![leaf("Param", FeatureParam::builder, ext)],
                ext,
            ),
            element(
                "Optional",
                Feature::builder,
                vec![leaf("Param", FeatureParam::builder, ext)],
                ext,
            ),
            leaf("Icon", Icon::builder, ext),
            leaf("Link", Link::builder, ext),
            locale,
            oauth,
        ],
        ext,
    );

    let user_pref = element(
        "UserPref",
        UserPref::builder,
        vec![leaf("EnumValue", EnumValue::builder, ext)],
        ext,
    );

    element(
        "Module",
        GadgetSpec::builder,
        vec![module_prefs, user_pref, leaf("Content", Content::builder, ext)],
        ext,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawElementParser;

    fn child<'a>(parser: &'a dyn ElementParser, name: &str) -> &'a dyn ElementParser {
        parser
            .child(&QName::local(name))
            .unwrap_or_else(|| panic!("no parser for {name}"))
    }

    #[test]
    fn test_gadget_parser_tree() {
        let root = create_gadget_parser();
        assert!(root.matches(&QName::local("Module")));

        let prefs = child(&root, "ModulePrefs");
        let service = child(child(prefs, "OAuth"), "Service");
        for name in ["Request", "Access", "Authorization"] {
            assert!(service.children().has_parser(&QName::local(name)));
        }
        assert!(child(prefs, "Require").children().has_parser(&QName::local("Param")));
        assert!(child(prefs, "Locale").children().should_skip(&QName::local("msg")));
        assert!(child(&root, "UserPref").child(&QName::local("EnumValue")).is_some());
        assert!(root.child(&QName::local("Unknown")).is_none());
    }

    #[test]
    fn test_extensions_registered_under_parent() {
        let mut extensions = Extensions::new();
        assert!(extensions.is_empty());
        extensions.register("ModulePrefs", RawElementParser::new("Preload"));
        extensions.register("Content", RawElementParser::new("Template"));

        let root = create_gadget_parser_with(&extensions);
        assert!(child(&root, "ModulePrefs")
            .children()
            .has_parser(&QName::local("Preload")));
        assert!(child(&root, "Content")
            .children()
            .has_parser(&QName::local("Template")));
        assert!(!root.children().has_parser(&QName::local("Preload")));
    }
}
