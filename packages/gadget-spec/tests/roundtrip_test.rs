//! Serialization round trips and sharing of parsed specs across threads.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::thread;

use gadget_spec::model::RawElementParser;
use gadget_spec::xml::QName;
use gadget_spec::{
    parse_gadget_spec, Extensions, GadgetSpec, GadgetSpecParser, SpecElement, SubstitutionType,
    Substitutions,
};
use pretty_assertions::assert_eq;
use url::Url;

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

/// Serialize, check well-formedness independently, and parse again.
fn reparse(spec: &GadgetSpec, parser: &GadgetSpecParser) -> GadgetSpec {
    let xml = spec.to_xml().unwrap();
    roxmltree::Document::parse(&xml)
        .unwrap_or_else(|e| panic!("Serialized gadget is not well-formed: {e}\n{xml}"));
    parser.parse(xml.as_bytes(), spec.url()).unwrap()
}

#[test]
fn test_round_trip_fixtures() {
    let parser = GadgetSpecParser::new();
    for name in ["todo.xml", "oauth.xml"] {
        let spec = parser.parse(&load_fixture(name), &gadget_url()).unwrap();
        let again = reparse(&spec, &parser);
        assert_eq!(again, spec, "round trip of {name}");
    }
}

#[test]
fn test_round_trip_substituted_spec() {
    let parser = GadgetSpecParser::new();
    let spec = parser.parse(&load_fixture("todo.xml"), &gadget_url()).unwrap();
    let mut subs = Substitutions::with_bidi_direction(true);
    subs.add_substitution(SubstitutionType::Message, "title", "<Todo & \"Done\">");
    let rendered = spec.substitute(&subs).unwrap();

    let again = reparse(&rendered, &parser);

    assert_eq!(again, rendered);
    assert_eq!(again.module_prefs().title(), "<Todo & \"Done\">");
}

#[test]
fn test_round_trip_keeps_extensions() {
    let mut extensions = Extensions::new();
    extensions.register(
        "ModulePrefs",
        RawElementParser::new(QName::with_namespace(
            "http://example.org/tracking",
            "Analytics",
        )),
    );
    let parser = GadgetSpecParser::with_extensions(&extensions);
    let spec = parser.parse(&load_fixture("todo.xml"), &gadget_url()).unwrap();

    let xml = spec.to_xml().unwrap();
    let again = reparse(&spec, &parser);

    assert!(xml.contains("<track:Analytics"), "{xml}");
    assert_eq!(again, spec);
    assert_eq!(again.module_prefs().extensions().len(), 1);
}

#[test]
fn test_serialized_structure() {
    let spec = parse_gadget_spec(&load_fixture("oauth.xml"), &gadget_url()).unwrap();
    let xml = spec.to_xml().unwrap();
    let doc = roxmltree::Document::parse(&xml).unwrap();

    let root = doc.root_element();
    assert_eq!(root.tag_name().name(), "Module");
    let children: Vec<&str> = root
        .children()
        .filter(roxmltree::Node::is_element)
        .map(|n| n.tag_name().name())
        .collect();
    assert_eq!(children, vec!["ModulePrefs", "Content"]);

    let services: Vec<&str> = doc
        .descendants()
        .filter(|n| n.has_tag_name("Service"))
        .filter_map(|n| n.attribute("name"))
        .collect();
    assert_eq!(services, vec!["google", "local"]);
}

#[test]
fn test_display_matches_to_xml() {
    let spec = parse_gadget_spec(&load_fixture("todo.xml"), &gadget_url()).unwrap();
    assert_eq!(spec.to_string(), spec.to_xml().unwrap());
}

#[test]
fn test_shared_spec_across_threads() {
    let spec = Arc::new(parse_gadget_spec(&load_fixture("todo.xml"), &gadget_url()).unwrap());

    let handles: Vec<_> = ["red", "green", "blue", "black"]
        .into_iter()
        .map(|color| {
            let spec = Arc::clone(&spec);
            thread::spawn(move || {
                let mut subs = Substitutions::with_bidi_direction(false);
                subs.add_substitution(SubstitutionType::UserPref, "color", color);
                subs.add_substitution(SubstitutionType::Message, "title", "Todo");
                let rendered = spec.substitute(&subs).unwrap();
                (color, rendered.view("home").unwrap().content().to_string())
            })
        })
        .collect();

    for handle in handles {
        let (color, content) = handle.join().unwrap();
        assert_eq!(
            content,
            format!("<div dir=\"ltr\">Hello {color} &amp; Todo</div>")
        );
    }
    assert_eq!(spec.module_prefs().title(), "__MSG_title__");
}

#[test]
fn test_parser_shared_across_threads() {
    let parser = Arc::new(GadgetSpecParser::new());
    let bytes = Arc::new(load_fixture("todo.xml"));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let parser = Arc::clone(&parser);
            let bytes = Arc::clone(&bytes);
            thread::spawn(move || parser.parse(&bytes, &gadget_url()).unwrap())
        })
        .collect();

    let specs: Vec<GadgetSpec> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for spec in &specs[1..] {
        assert_eq!(spec, &specs[0]);
    }
}
