//! Serializable metadata summary of a parsed gadget.
//!
//! The summary is what a container reports about a gadget without
//! rendering it: module metadata, required features, the user preference
//! schema, the available views and the OAuth services it talks to.

use serde::Serialize;

use crate::model::{ContentType, DataType, GadgetSpec};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GadgetSummary {
    pub url: String,
    pub checksum: String,
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title_url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub author: String,
    pub height: u32,
    pub width: u32,
    pub scrolling: bool,
    pub required_features: Vec<String>,
    pub optional_features: Vec<String>,
    pub user_prefs: Vec<UserPrefSummary>,
    pub views: Vec<ViewSummary>,
    pub oauth_services: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserPrefSummary {
    pub name: String,
    pub display_name: String,
    pub datatype: DataType,
    pub default_value: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<EnumValueSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumValueSummary {
    pub value: String,
    pub display_value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub quirks: bool,
    pub preferred_height: u32,
    pub preferred_width: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

impl GadgetSummary {
    /// Summarize a parsed (optionally substituted) spec.
    #[must_use]
    pub fn from_spec(spec: &GadgetSpec) -> Self {
        let prefs = spec.module_prefs();
        let (required, optional): (Vec<_>, Vec<_>) =
            prefs.features().iter().partition(|feature| feature.required());

        Self {
            url: spec.url().to_string(),
            checksum: spec.checksum().to_string(),
            title: prefs.title().to_string(),
            title_url: prefs.title_url().to_string(),
            description: prefs.description().to_string(),
            author: prefs.author().to_string(),
            height: prefs.height(),
            width: prefs.width(),
            scrolling: prefs.scrolling(),
            required_features: required.iter().map(|f| f.name().to_string()).collect(),
            optional_features: optional.iter().map(|f| f.name().to_string()).collect(),
            user_prefs: spec
                .user_prefs()
                .iter()
                .map(|pref| UserPrefSummary {
                    name: pref.name().to_string(),
                    display_name: pref.display_name().to_string(),
                    datatype: pref.data_type(),
                    default_value: pref.default_value().to_string(),
                    required: pref.required(),
                    enum_values: pref
                        .enum_values()
                        .iter()
                        .map(|value| EnumValueSummary {
                            value: value.value().to_string(),
                            display_value: value.display_value().to_string(),
                        })
                        .collect(),
                })
                .collect(),
            views: spec
                .views()
                .values()
                .map(|view| ViewSummary {
                    name: view.name().to_string(),
                    content_type: view.content_type(),
                    quirks: view.is_quirks(),
                    preferred_height: view.preferred_height(),
                    preferred_width: view.preferred_width(),
                    href: view.href().map(ToString::to_string),
                })
                .collect(),
            oauth_services: prefs
                .oauth()
                .map(|oauth| {
                    oauth
                        .services()
                        .iter()
                        .map(|service| service.name().to_string())
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}
