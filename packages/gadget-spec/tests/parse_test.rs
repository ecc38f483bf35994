//! Integration tests for parsing and validating gadget documents.
//!
//! Uses the fixture gadgets under `tests/fixtures/` plus small inline
//! documents for the failure cases.

use std::fs;
use std::path::Path;

use gadget_spec::model::{
    ContentType, DataType, HttpMethod, ParamLocation, RawElementParser, TextDirection,
};
use gadget_spec::xml::QName;
use gadget_spec::{
    parse_gadget_spec, Extensions, GadgetError, GadgetSpec, GadgetSpecParser, Node, SpecElement,
};
use pretty_assertions::assert_eq;
use url::Url;

/// Load fixture file content.
fn load_fixture(name: &str) -> Vec<u8> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    fs::read(&path).unwrap_or_else(|e| panic!("Failed to load {}: {}", path.display(), e))
}

fn gadget_url() -> Url {
    Url::parse("http://example.org/gadgets/todo.xml").unwrap()
}

fn parse_fixture(name: &str) -> GadgetSpec {
    parse_gadget_spec(&load_fixture(name), &gadget_url())
        .unwrap_or_else(|e| panic!("Failed to parse {name}: {e}"))
}

fn parse_str(xml: &str) -> Result<GadgetSpec, GadgetError> {
    parse_gadget_spec(xml.as_bytes(), &gadget_url())
}

// =============================================================================
// Fixture documents
// =============================================================================

#[test]
fn test_module_prefs_metadata() {
    let spec = parse_fixture("todo.xml");
    let prefs = spec.module_prefs();

    assert_eq!(prefs.title(), "__MSG_title__");
    assert_eq!(prefs.title_url(), "http://example.org/todo");
    assert_eq!(prefs.description(), "A shared todo list");
    assert_eq!(prefs.author(), "Example Team");
    assert_eq!(prefs.author_email(), "");
    assert_eq!(prefs.height(), 200);
    assert_eq!(prefs.width(), 0);
    assert!(prefs.scrolling());
    assert_eq!(prefs.categories(), vec!["tools"]);
}

#[test]
fn test_features_and_params() {
    let spec = parse_fixture("todo.xml");
    let prefs = spec.module_prefs();

    let names: Vec<&str> = prefs.features().iter().map(|f| f.name()).collect();
    assert_eq!(
        names,
        vec!["opensocial-0.8", "views", "dynamic-height", "settitle"]
    );

    let settitle = prefs.feature("settitle").unwrap();
    assert!(settitle.required());
    assert_eq!(settitle.param("max_length"), Some("64"));
    assert!(!prefs.feature("dynamic-height").unwrap().required());
}

#[test]
fn test_icons_links_and_locales() {
    let spec = parse_fixture("todo.xml");
    let prefs = spec.module_prefs();

    assert_eq!(prefs.icons().len(), 1);
    assert_eq!(prefs.icons()[0].mode(), Some("base64"));
    assert_eq!(prefs.icons()[0].mime_type(), Some("image/png"));
    assert_eq!(prefs.icons()[0].content(), "aWNvbg==");

    let help = prefs.link("gadgets.help").unwrap();
    assert_eq!(
        help.href().as_str(),
        "http://example.org/gadgets/help/__MSG_lang__.html"
    );

    assert_eq!(prefs.locales().len(), 2);
    let english = prefs.locale("en", "ALL").unwrap();
    assert_eq!(english.direction(), TextDirection::Ltr);
    let arabic = prefs.locale("ar", "ALL").unwrap();
    assert_eq!(arabic.direction(), TextDirection::Rtl);
    assert_eq!(
        arabic.messages().map(Url::as_str),
        Some("http://example.org/gadgets/messages/ar.xml")
    );
}

#[test]
fn test_user_prefs() {
    let spec = parse_fixture("todo.xml");
    assert_eq!(spec.user_prefs().len(), 2);

    let color = spec.user_pref("color").unwrap();
    assert_eq!(color.display_name(), "__MSG_color__");
    assert_eq!(color.data_type(), DataType::Enum);
    assert_eq!(color.default_value(), "red");
    assert!(!color.required());
    let values: Vec<(&str, &str)> = color
        .enum_values()
        .iter()
        .map(|v| (v.value(), v.display_value()))
        .collect();
    assert_eq!(values, vec![("red", "__MSG_red__"), ("blue", "blue")]);

    let count = spec.user_pref("count").unwrap();
    assert_eq!(count.data_type(), DataType::Hidden);
    assert!(count.required());
    assert_eq!(count.display_name(), "count");
}

#[test]
fn test_views_from_fixture() {
    let spec = parse_fixture("todo.xml");

    let names: Vec<&str> = spec.views().keys().map(String::as_str).collect();
    assert_eq!(names, vec!["canvas", "home", "profile"]);

    let home = spec.view("home").unwrap();
    assert_eq!(home.content_type(), ContentType::Html);
    assert_eq!(
        home.content(),
        "<div dir=\"__BIDI_DIR__\">Hello __UP_color__ &amp; __MSG_title__</div>"
    );
    assert!(!home.is_quirks());
    assert_eq!(home.preferred_height(), 100);
    assert_eq!(
        home.attributes().get("data-theme").map(String::as_str),
        Some("light")
    );

    let profile = spec.view("profile").unwrap();
    assert_eq!(profile.content(), "<div dir=\"__BIDI_DIR__\">");
    assert!(profile.is_quirks());

    let canvas = spec.view("canvas").unwrap();
    assert_eq!(canvas.content_type(), ContentType::Url);
    assert_eq!(
        canvas.href().map(Url::as_str),
        Some("http://example.org/gadgets/canvas.html?lang=__MSG_lang__")
    );
    assert_eq!(canvas.content(), "");
    assert!(canvas.sign_owner());
    assert!(!canvas.sign_viewer());

    assert!(spec.view("default").is_none());
    assert!(spec.view_or_default("default").is_none());
}

#[test]
fn test_oauth_services() {
    let url = Url::parse("http://example.org/gadgets/photos.xml").unwrap();
    let spec = parse_gadget_spec(&load_fixture("oauth.xml"), &url).unwrap();
    let oauth = spec.module_prefs().oauth().unwrap();

    let names: Vec<&str> = oauth.services().iter().map(|s| s.name()).collect();
    assert_eq!(names, vec!["google", "local"]);

    let google = oauth.service("google").unwrap();
    assert_eq!(google.request().method(), HttpMethod::Post);
    assert_eq!(google.request().param_location(), ParamLocation::PostBody);
    assert_eq!(
        google.access().url().as_str(),
        "https://www.google.com/accounts/OAuthGetAccessToken"
    );

    let local = oauth.service("local").unwrap();
    assert_eq!(local.request().method(), HttpMethod::Get);
    assert_eq!(local.request().param_location(), ParamLocation::AuthHeader);
    assert_eq!(
        local.request().url().as_str(),
        "http://example.org/oauth/request"
    );
    assert_eq!(
        local.authorization().url().as_str(),
        "http://example.org/oauth/authorize?cb=__MSG_cb__"
    );
}

#[test]
fn test_checksum_and_url() {
    let bytes = load_fixture("todo.xml");
    let spec = parse_gadget_spec(&bytes, &gadget_url()).unwrap();

    assert_eq!(spec.url(), &gadget_url());
    assert_eq!(spec.checksum(), gadget_spec::checksum(&bytes));
    assert_eq!(spec.checksum().len(), 64);
}

// =============================================================================
// Extensions and unknown elements
// =============================================================================

#[test]
fn test_unknown_elements_are_skipped() {
    let spec = parse_fixture("todo.xml");
    assert!(spec.module_prefs().extensions().is_empty());

    let spec = parse_str(
        r#"<Module>
            <ModulePrefs/>
            <Vendor><Deep><Deeper a="1">text</Deeper></Deep></Vendor>
            <Content>x</Content>
        </Module>"#,
    )
    .unwrap();
    assert!(spec.extensions().is_empty());
    assert_eq!(spec.view("default").unwrap().content(), "x");
}

#[test]
fn test_extension_parser_keeps_vendor_elements() {
    let mut extensions = Extensions::new();
    extensions.register(
        "ModulePrefs",
        RawElementParser::new(QName::with_namespace(
            "http://example.org/tracking",
            "Analytics",
        )),
    );
    let parser = GadgetSpecParser::with_extensions(&extensions);
    let spec = parser
        .parse(&load_fixture("todo.xml"), &gadget_url())
        .unwrap();

    let extensions = spec.module_prefs().extensions();
    assert_eq!(extensions.len(), 1);
    let Node::Raw(analytics) = &extensions[0] else {
        panic!("expected a raw element, got {:?}", extensions[0]);
    };
    assert_eq!(analytics.name().local_part(), "Analytics");
    assert_eq!(analytics.attribute("account"), Some("UA-1"));
    assert_eq!(analytics.children().len(), 1);
    assert_eq!(analytics.children()[0].name().local_part(), "Event");
}

#[test]
fn test_later_feature_declaration_replaces_earlier() {
    let spec = parse_str(
        r#"<Module>
            <ModulePrefs>
                <Optional feature="pubsub"/>
                <Require feature="pubsub"><Param name="topic">news</Param></Require>
            </ModulePrefs>
            <Content>x</Content>
        </Module>"#,
    )
    .unwrap();

    let features = spec.module_prefs().features();
    assert_eq!(features.len(), 1);
    assert!(features[0].required());
    assert_eq!(features[0].param("topic"), Some("news"));
}

// =============================================================================
// Lenient coercion
// =============================================================================

#[test]
fn test_lenient_attributes_fall_back() {
    let spec = parse_str(
        r#"<Module>
            <ModulePrefs height="tall" width="-5" scrolling="maybe"/>
            <UserPref name="mode" datatype="colour" required="sometimes"/>
            <Content>x</Content>
        </Module>"#,
    )
    .unwrap();

    assert_eq!(spec.module_prefs().height(), 0);
    assert_eq!(spec.module_prefs().width(), 0);
    assert!(!spec.module_prefs().scrolling());
    let mode = spec.user_pref("mode").unwrap();
    assert_eq!(mode.data_type(), DataType::String);
    assert!(!mode.required());
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn test_malformed_document() {
    let err = parse_str("<Module><ModulePrefs></Module>").unwrap_err();
    assert!(matches!(err, GadgetError::MalformedDocument(_)), "{err}");

    let err = parse_str("").unwrap_err();
    assert!(matches!(err, GadgetError::MalformedDocument(_)), "{err}");

    let err = parse_str("<Module><ModulePrefs/><Content>&bogus;</Content></Module>").unwrap_err();
    assert!(matches!(err, GadgetError::MalformedDocument(_)), "{err}");
}

#[test]
fn test_unbound_namespace_prefix() {
    let err = parse_str(
        r#"<Module><ModulePrefs/><Content type="html" foo:type="url" foo:href="http://x/">x</Content></Module>"#,
    )
    .unwrap_err();
    assert!(matches!(err, GadgetError::MalformedDocument(_)), "{err}");

    let err = parse_str("<Module><ModulePrefs/><foo:Content>x</foo:Content></Module>").unwrap_err();
    assert!(matches!(err, GadgetError::MalformedDocument(_)), "{err}");
}

#[test]
fn test_line_endings_in_body() {
    let spec = parse_str("<Module><ModulePrefs/><Content>x\r\ny\rz</Content></Module>").unwrap();
    assert_eq!(spec.view("default").unwrap().content(), "x\ny\nz");
}

#[test]
fn test_unresolvable_href() {
    let err = parse_str(r#"<Module><ModulePrefs/><Content type="url" href="http://"/></Module>"#)
        .unwrap_err();
    assert!(
        matches!(&err, GadgetError::InvalidAttributeValue { element, attribute, .. }
            if element == "Content" && attribute == "href"),
        "{err}"
    );
}

#[test]
fn test_unexpected_root() {
    let err = parse_str("<Gadget><Content>x</Content></Gadget>").unwrap_err();
    assert!(
        matches!(&err, GadgetError::UnexpectedRoot { found } if found == "Gadget"),
        "{err}"
    );
}

#[test]
fn test_missing_module_prefs() {
    let err = parse_str("<Module><Content>x</Content></Module>").unwrap_err();
    assert_eq!(err.to_string(), "Module must contain a 'ModulePrefs' element");
}

#[test]
fn test_missing_content() {
    let err = parse_str("<Module><ModulePrefs/></Module>").unwrap_err();
    assert_eq!(err.to_string(), "Module must contain a 'Content' element");
}

#[test]
fn test_duplicate_module_prefs() {
    let err =
        parse_str("<Module><ModulePrefs/><ModulePrefs/><Content>x</Content></Module>").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Module may contain only one 'ModulePrefs' element"
    );
}

#[test]
fn test_missing_user_pref_name() {
    let err = parse_str(
        r#"<Module><ModulePrefs/><UserPref display_name="x"/><Content>x</Content></Module>"#,
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "UserPref@name must be set");
}

#[test]
fn test_invalid_content_integer() {
    let err = parse_str(
        r#"<Module><ModulePrefs/><Content preferred_height="tall">x</Content></Module>"#,
    )
    .unwrap_err();
    assert!(
        matches!(
            &err,
            GadgetError::InvalidAttributeValue { element, attribute, value, .. }
                if element == "Content" && attribute == "preferred_height" && value == "tall"
        ),
        "{err}"
    );
}

#[test]
fn test_invalid_content_boolean() {
    let err = parse_str(
        r#"<Module><ModulePrefs/><Content sign_owner="yes">x</Content></Module>"#,
    )
    .unwrap_err();
    assert!(
        matches!(&err, GadgetError::InvalidAttributeValue { attribute, .. } if attribute == "sign_owner"),
        "{err}"
    );
}

#[test]
fn test_url_content_requires_href() {
    let err =
        parse_str(r#"<Module><ModulePrefs/><Content type="url"/></Module>"#).unwrap_err();
    assert!(
        matches!(&err, GadgetError::ConflictingAttribute { element, .. } if element == "Content"),
        "{err}"
    );
}

#[test]
fn test_html_content_rejects_href() {
    let err = parse_str(
        r#"<Module><ModulePrefs/><Content type="html" href="http://example.org/"/></Module>"#,
    )
    .unwrap_err();
    assert!(
        matches!(err, GadgetError::ConflictingAttribute { .. }),
        "{err}"
    );
}

#[test]
fn test_mixed_view_types() {
    let err = parse_gadget_spec(&load_fixture("mixed_view.xml"), &gadget_url()).unwrap_err();
    assert!(
        matches!(&err, GadgetError::ConflictingAttribute { element, message }
            if element == "Content" && message.contains("canvas")),
        "{err}"
    );
    assert!(err.is_spec_error());
}

#[test]
fn test_oauth_method_mismatch() {
    let err = parse_gadget_spec(&load_fixture("oauth_mismatch.xml"), &gadget_url()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Service: access@method is not equal request@method"
    );
}

#[test]
fn test_oauth_missing_authorization() {
    let err = parse_str(
        r#"<Module>
            <ModulePrefs><OAuth><Service name="s">
                <Request url="http://example.org/r"/>
                <Access url="http://example.org/a"/>
            </Service></OAuth></ModulePrefs>
            <Content>x</Content>
        </Module>"#,
    )
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Service must contain a 'Authorization' element"
    );
}

#[test]
fn test_oauth_duplicate_service_name() {
    let service = r#"<Service name="s">
        <Request url="http://example.org/r"/>
        <Access url="http://example.org/a"/>
        <Authorization url="http://example.org/z"/>
    </Service>"#;
    let xml = format!(
        "<Module><ModulePrefs><OAuth>{service}{service}</OAuth></ModulePrefs><Content>x</Content></Module>"
    );
    let err = parse_str(&xml).unwrap_err();
    assert!(
        matches!(&err, GadgetError::ConflictingAttribute { element, .. } if element == "OAuth"),
        "{err}"
    );
}

#[test]
fn test_locale_invalid_direction() {
    let err = parse_str(
        r#"<Module><ModulePrefs><Locale lang="he" language_direction="up"/></ModulePrefs><Content>x</Content></Module>"#,
    )
    .unwrap_err();
    assert!(
        matches!(&err, GadgetError::InvalidAttributeValue { element, .. } if element == "Locale"),
        "{err}"
    );
}
