//! Attribute coercion shared by the element builders.
//!
//! Strict helpers fail with `InvalidAttributeValue`; lenient ones log a
//! warning and fall back to the default.

use std::str::FromStr;

use tracing::warn;

use super::ElementData;
use crate::error::{GadgetError, Result};

fn parse_bool(value: &str) -> Option<bool> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Required, non-empty attribute.
pub(crate) fn required<'a>(data: &'a ElementData, attribute: &str) -> Result<&'a str> {
    match data.attribute(attribute) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(GadgetError::missing_attribute(data.local_name(), attribute)),
    }
}

/// Optional boolean attribute; absent gives `None`.
pub(crate) fn boolean(data: &ElementData, attribute: &str) -> Result<Option<bool>> {
    let Some(value) = data.attribute(attribute) else {
        return Ok(None);
    };
    parse_bool(value).map(Some).ok_or_else(|| {
        GadgetError::invalid_value(data.local_name(), attribute, value, "'true' or 'false'")
    })
}

pub(crate) fn lenient_boolean(data: &ElementData, attribute: &str, default: bool) -> bool {
    let Some(value) = data.attribute(attribute) else {
        return default;
    };
    parse_bool(value).unwrap_or_else(|| {
        warn!(
            element = data.local_name(),
            attribute,
            value,
            "Ignoring non-boolean attribute value"
        );
        default
    })
}

/// Optional integer attribute; absent gives `None`.
pub(crate) fn integer<T: FromStr>(data: &ElementData, attribute: &str) -> Result<Option<T>> {
    let Some(value) = data.attribute(attribute) else {
        return Ok(None);
    };
    value.trim().parse::<T>().map(Some).map_err(|_| {
        GadgetError::invalid_value(data.local_name(), attribute, value, "a non-negative integer")
    })
}

pub(crate) fn lenient_integer<T: FromStr>(data: &ElementData, attribute: &str, default: T) -> T {
    let Some(value) = data.attribute(attribute) else {
        return default;
    };
    value.trim().parse::<T>().unwrap_or_else(|_| {
        warn!(
            element = data.local_name(),
            attribute,
            value,
            "Ignoring non-integer attribute value"
        );
        default
    })
}

/// Attribute restricted to a fixed set of (case-insensitive) keywords.
pub(crate) fn keyword<T: Copy>(
    data: &ElementData,
    attribute: &str,
    options: &[(&str, T)],
    default: T,
) -> Result<T> {
    let Some(value) = data.attribute(attribute) else {
        return Ok(default);
    };
    let trimmed = value.trim();
    options
        .iter()
        .find(|(keyword, _)| keyword.eq_ignore_ascii_case(trimmed))
        .map(|(_, parsed)| *parsed)
        .ok_or_else(|| {
            let expected = options
                .iter()
                .map(|(keyword, _)| format!("'{keyword}'"))
                .collect::<Vec<_>>()
                .join(" or ");
            GadgetError::invalid_value(data.local_name(), attribute, value, expected)
        })
}
