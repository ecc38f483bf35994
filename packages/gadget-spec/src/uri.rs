//! href syntax validation and base-URI resolution.
//!
//! The `url` crate accepts many strings that are not URI references (it
//! percent-encodes them instead), so references are checked against the
//! RFC 3986 character set before being joined to the document URL.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// Characters allowed anywhere in a URI reference.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static URI_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9\-._~:/?#\[\]@!$&'()*+,;=%]*$").expect("valid regex")
});

/// Percent sign not followed by two hex digits.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static BAD_ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"%([^0-9A-Fa-f]|[0-9A-Fa-f][^0-9A-Fa-f]|[0-9A-Fa-f]?$)").expect("valid regex")
});

/// Check that `reference` is syntactically a URI reference.
///
/// Surrounding whitespace is ignored.
///
/// # Errors
/// Returns a human-readable reason when the reference is invalid.
///
/// # Examples
/// ```
/// use gadget_spec::uri::validate_reference;
///
/// assert!(validate_reference("/gadgets/hello.html?x=1").is_ok());
/// assert!(validate_reference("fobad@$%!fdf").is_err());
/// ```
pub fn validate_reference(reference: &str) -> Result<(), String> {
    let reference = reference.trim();
    if !URI_CHARS.is_match(reference) {
        return Err("contains characters not allowed in a URI".to_string());
    }
    if BAD_ESCAPE.is_match(reference) {
        return Err("contains an invalid percent-escape".to_string());
    }
    Ok(())
}

/// Validate `reference` and resolve it against `base`.
///
/// Absolute references are returned as parsed; relative ones are joined
/// to the base URL.
///
/// # Errors
/// Returns a human-readable reason when the reference is invalid or
/// cannot be resolved.
pub fn resolve(reference: &str, base: &Url) -> Result<Url, String> {
    validate_reference(reference)?;
    base.join(reference.trim()).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("http://example.org/gadgets/foo.xml").unwrap()
    }

    #[test]
    fn test_relative_resolved_against_base() {
        assert_eq!(
            resolve("bar.html", &base()).unwrap().as_str(),
            "http://example.org/gadgets/bar.html"
        );
        assert_eq!(
            resolve("/bar", &base()).unwrap().as_str(),
            "http://example.org/bar"
        );
    }

    #[test]
    fn test_absolute_kept() {
        assert_eq!(
            resolve(" https://other.example/x?y=%20 ", &base()).unwrap().as_str(),
            "https://other.example/x?y=%20"
        );
    }

    #[test]
    fn test_invalid_characters() {
        assert!(resolve("fobad@$%!fdf", &base()).is_err());
        assert!(resolve("has space", &base()).is_err());
        assert!(resolve("<script>", &base()).is_err());
    }

    #[test]
    fn test_bad_percent_escape() {
        assert!(validate_reference("a%2").is_err());
        assert!(validate_reference("a%zz").is_err());
        assert!(validate_reference("a%").is_err());
        assert!(validate_reference("a%2Fb").is_ok());
    }

    #[test]
    fn test_unresolved_placeholder_is_valid_relative_reference() {
        assert_eq!(
            resolve("__MSG_foo__", &base()).unwrap().as_str(),
            "http://example.org/gadgets/__MSG_foo__"
        );
    }
}
