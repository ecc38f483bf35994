//! `<UserPref>` declarations and their `<EnumValue>` options.

use std::fmt;

use serde::Serialize;
use tracing::warn;

use super::coerce;
use super::{display_as_xml, ElementBuilder, ElementData, LeafBuilder, Node, SpecElement};
use crate::error::Result;
use crate::registry::ParseContext;
use crate::substitution::Substitutions;
use crate::xml::{QName, XmlWriter};

/// Declared type of a user preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    #[default]
    String,
    Hidden,
    Bool,
    Enum,
    List,
    Location,
}

impl DataType {
    /// Parse a `datatype` attribute; unknown values read as `string`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "string" => Some(DataType::String),
            "hidden" => Some(DataType::Hidden),
            "bool" => Some(DataType::Bool),
            "enum" => Some(DataType::Enum),
            "list" => Some(DataType::List),
            "location" => Some(DataType::Location),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::String => "string",
            DataType::Hidden => "hidden",
            DataType::Bool => "bool",
            DataType::Enum => "enum",
            DataType::List => "list",
            DataType::Location => "location",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user preference declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct UserPref {
    data: ElementData,
    data_type: DataType,
    required: bool,
    enum_values: Vec<EnumValue>,
}

impl UserPref {
    pub(crate) fn builder(name: QName) -> Box<dyn ElementBuilder> {
        Box::new(UserPrefBuilder {
            data: ElementData::new(name),
            enum_values: Vec::new(),
        })
    }

    fn assemble(data: ElementData, enum_values: Vec<EnumValue>) -> Result<Self> {
        coerce::required(&data, "name")?;
        let data_type = match data.attribute("datatype") {
            None => DataType::default(),
            Some(raw) => DataType::parse(raw).unwrap_or_else(|| {
                warn!(
                    name = data.attribute("name"),
                    datatype = raw,
                    "Unknown UserPref datatype, using string"
                );
                DataType::String
            }),
        };
        let required = coerce::lenient_boolean(&data, "required", false);
        Ok(Self {
            data,
            data_type,
            required,
            enum_values,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.data.attribute("name").unwrap_or_default()
    }

    /// Display name, falling back to the name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.data
            .attribute("display_name")
            .unwrap_or_else(|| self.name())
    }

    #[must_use]
    pub fn default_value(&self) -> &str {
        self.data.attribute("default_value").unwrap_or_default()
    }

    #[must_use]
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    #[must_use]
    pub fn required(&self) -> bool {
        self.required
    }

    #[must_use]
    pub fn enum_values(&self) -> &[EnumValue] {
        &self.enum_values
    }

    /// Copy with placeholders replaced in the display name, the default
    /// value and every enum display value.
    #[must_use]
    pub fn substitute(&self, substitutions: &Substitutions) -> UserPref {
        UserPref {
            data: self.data.substituted_fields(
                substitutions,
                false,
                &["display_name", "default_value"],
            ),
            data_type: self.data_type,
            required: self.required,
            enum_values: self
                .enum_values
                .iter()
                .map(|value| value.substitute(substitutions))
                .collect(),
        }
    }
}

impl SpecElement for UserPref {
    fn data(&self) -> &ElementData {
        &self.data
    }

    fn write_children(&self, writer: &mut XmlWriter) -> Result<()> {
        for value in &self.enum_values {
            value.write_xml(writer)?;
        }
        Ok(())
    }
}

struct UserPrefBuilder {
    data: ElementData,
    enum_values: Vec<EnumValue>,
}

impl ElementBuilder for UserPrefBuilder {
    fn data_mut(&mut self) -> &mut ElementData {
        &mut self.data
    }

    fn add_child(&mut self, child: Node) -> Result<()> {
        match child {
            Node::EnumValue(value) => self.enum_values.push(value),
            other => self.data.push_extension(other),
        }
        Ok(())
    }

    fn build(self: Box<Self>, _context: &ParseContext) -> Result<Node> {
        let pref = UserPref::assemble(self.data, self.enum_values)?;
        Ok(Node::UserPref(pref))
    }
}

/// One allowed value of an `enum` user preference.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    data: ElementData,
}

impl EnumValue {
    pub(crate) fn builder(name: QName) -> Box<dyn ElementBuilder> {
        LeafBuilder::boxed(name, |data, _| {
            coerce::required(&data, "value")?;
            Ok(Node::EnumValue(EnumValue { data }))
        })
    }

    #[must_use]
    pub fn value(&self) -> &str {
        self.data.attribute("value").unwrap_or_default()
    }

    /// Display value, falling back to the value.
    #[must_use]
    pub fn display_value(&self) -> &str {
        self.data
            .attribute("display_value")
            .unwrap_or_else(|| self.value())
    }

    fn substitute(&self, substitutions: &Substitutions) -> EnumValue {
        EnumValue {
            data: self
                .data
                .substituted_fields(substitutions, false, &["display_value"]),
        }
    }
}

impl SpecElement for EnumValue {
    fn data(&self) -> &ElementData {
        &self.data
    }
}

display_as_xml!(UserPref, EnumValue);
