//! Placeholder substitution for `__NAMESPACE_key__` tokens.
//!
//! A [`Substitutions`] set holds four independent variable namespaces.
//! [`Substitutions::substitute_string`] replaces every resolvable token in
//! a single left-to-right pass: replacement values are inserted verbatim
//! and never re-scanned, and tokens naming an unknown namespace or key are
//! left in place.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

/// Variable namespace of a placeholder token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SubstitutionType {
    /// `__MSG_key__`, localized message bundles.
    Message,
    /// `__UP_key__`, user preference values.
    UserPref,
    /// `__BIDI_key__`, text direction helpers.
    Bidi,
    /// `__MODULE_key__`, per-render module values such as `ID`.
    Module,
}

impl SubstitutionType {
    pub const ALL: [SubstitutionType; 4] = [
        SubstitutionType::Message,
        SubstitutionType::UserPref,
        SubstitutionType::Bidi,
        SubstitutionType::Module,
    ];

    /// Token prefix written between the leading `__` and the key.
    #[must_use]
    pub fn prefix(&self) -> &'static str {
        match self {
            SubstitutionType::Message => "MSG",
            SubstitutionType::UserPref => "UP",
            SubstitutionType::Bidi => "BIDI",
            SubstitutionType::Module => "MODULE",
        }
    }
}

impl fmt::Display for SubstitutionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Caller-supplied variable bindings for one render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitutions {
    values: HashMap<SubstitutionType, HashMap<String, String>>,
}

impl Substitutions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bindings for the standard `BIDI` keys of the given text direction.
    ///
    /// # Examples
    /// ```
    /// use gadget_spec::{SubstitutionType, Substitutions};
    ///
    /// let subs = Substitutions::with_bidi_direction(true);
    /// assert_eq!(subs.get(SubstitutionType::Bidi, "START_EDGE"), Some("right"));
    /// assert_eq!(subs.substitute_string("dir=__BIDI_DIR__"), "dir=rtl");
    /// ```
    #[must_use]
    pub fn with_bidi_direction(rtl: bool) -> Self {
        let (start, end, dir, reverse) = if rtl {
            ("right", "left", "rtl", "ltr")
        } else {
            ("left", "right", "ltr", "rtl")
        };
        let mut subs = Self::new();
        subs.add_substitution(SubstitutionType::Bidi, "START_EDGE", start);
        subs.add_substitution(SubstitutionType::Bidi, "END_EDGE", end);
        subs.add_substitution(SubstitutionType::Bidi, "DIR", dir);
        subs.add_substitution(SubstitutionType::Bidi, "REVERSE_DIR", reverse);
        subs
    }

    /// Bind one key, replacing any previous value.
    pub fn add_substitution(
        &mut self,
        kind: SubstitutionType,
        key: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.values
            .entry(kind)
            .or_default()
            .insert(key.into(), value.into());
    }

    /// Bind every pair of `entries` in one namespace.
    pub fn add_substitutions<K, V>(
        &mut self,
        kind: SubstitutionType,
        entries: impl IntoIterator<Item = (K, V)>,
    ) where
        K: Into<String>,
        V: Into<String>,
    {
        let map = self.values.entry(kind).or_default();
        for (key, value) in entries {
            map.insert(key.into(), value.into());
        }
    }

    #[must_use]
    pub fn get(&self, kind: SubstitutionType, key: &str) -> Option<&str> {
        self.values
            .get(&kind)
            .and_then(|map| map.get(key))
            .map(String::as_str)
    }

    /// True when no namespace holds any binding.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.values().all(HashMap::is_empty)
    }

    /// Replace every resolvable placeholder in `input`.
    ///
    /// Returns the input unchanged (borrowed) when nothing was replaced.
    ///
    /// # Examples
    /// ```
    /// use gadget_spec::{SubstitutionType, Substitutions};
    ///
    /// let mut subs = Substitutions::new();
    /// subs.add_substitution(SubstitutionType::Message, "world", "Earth");
    /// assert_eq!(subs.substitute_string("Hello, __MSG_world__"), "Hello, Earth");
    /// assert_eq!(subs.substitute_string("Hello, __MSG_moon__"), "Hello, __MSG_moon__");
    /// ```
    #[must_use]
    pub fn substitute_string<'a>(&self, input: &'a str) -> Cow<'a, str> {
        if self.is_empty() || !input.contains("__") {
            return Cow::Borrowed(input);
        }

        let mut output = String::with_capacity(input.len());
        let mut rest = input;
        let mut changed = false;

        while let Some(start) = rest.find("__") {
            output.push_str(&rest[..start]);
            let token = &rest[start + 2..];
            match self.resolve_token(token) {
                Some((value, consumed)) => {
                    output.push_str(value);
                    rest = &token[consumed..];
                    changed = true;
                }
                None => {
                    // Not a token start; retry one character later.
                    output.push('_');
                    rest = &rest[start + 1..];
                }
            }
        }
        output.push_str(rest);

        if changed {
            Cow::Owned(output)
        } else {
            Cow::Borrowed(input)
        }
    }

    /// Resolve the token starting right after a `__` marker, returning the
    /// value and the number of bytes of `token` it spans (closing `__`
    /// included).
    fn resolve_token(&self, token: &str) -> Option<(&str, usize)> {
        for kind in SubstitutionType::ALL {
            let prefix = kind.prefix();
            let Some(body) = token
                .strip_prefix(prefix)
                .and_then(|rest| rest.strip_prefix('_'))
            else {
                continue;
            };
            let end = body.find("__")?;
            if end == 0 {
                return None;
            }
            let value = self.get(kind, &body[..end])?;
            return Some((value, prefix.len() + 1 + end + 2));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn subs() -> Substitutions {
        let mut subs = Substitutions::new();
        subs.add_substitution(SubstitutionType::Message, "world", "Earth");
        subs.add_substitution(SubstitutionType::Message, "greeting_text", "Hi");
        subs.add_substitution(SubstitutionType::UserPref, "color", "red");
        subs.add_substitution(SubstitutionType::Module, "ID", "7");
        subs
    }

    #[test]
    fn test_replaces_each_namespace() {
        assert_eq!(
            subs().substitute_string("__MSG_greeting_text__ __UP_color__ #__MODULE_ID__"),
            "Hi red #7"
        );
    }

    #[test]
    fn test_empty_set_borrows_input() {
        let input = "Hello, __MSG_world__";
        let out = Substitutions::new().substitute_string(input);
        assert!(matches!(out, Cow::Borrowed(_)));
        assert_eq!(out, input);
    }

    #[test]
    fn test_unresolved_left_verbatim() {
        let s = subs();
        assert_eq!(s.substitute_string("__MSG_unknown__"), "__MSG_unknown__");
        assert_eq!(s.substitute_string("__FOO_world__"), "__FOO_world__");
        assert_eq!(s.substitute_string("__MSG___"), "__MSG___");
        assert_eq!(s.substitute_string("__MSG_world"), "__MSG_world");
    }

    #[test]
    fn test_namespaces_are_independent() {
        assert_eq!(subs().substitute_string("__UP_world__"), "__UP_world__");
    }

    #[test]
    fn test_unresolved_token_does_not_hide_next_one() {
        assert_eq!(
            subs().substitute_string("__MSG_nope____MSG_world__"),
            "__MSG_nope__Earth"
        );
        assert_eq!(subs().substitute_string("___MSG_world__"), "_Earth");
    }

    #[test]
    fn test_values_not_rescanned() {
        let mut s = Substitutions::new();
        s.add_substitution(SubstitutionType::Message, "a", "__MSG_b__");
        s.add_substitution(SubstitutionType::Message, "b", "deep");
        assert_eq!(s.substitute_string("__MSG_a__"), "__MSG_b__");
    }

    #[test]
    fn test_idempotent_on_resolved_text() {
        let s = subs();
        let once = s.substitute_string("Hello, __MSG_world__").into_owned();
        assert_eq!(s.substitute_string(&once), once);
    }

    #[test]
    fn test_add_substitutions_and_is_empty() {
        let mut s = Substitutions::new();
        assert!(s.is_empty());
        s.add_substitutions(SubstitutionType::UserPref, [("a", "1"), ("b", "2")]);
        assert!(!s.is_empty());
        assert_eq!(s.get(SubstitutionType::UserPref, "b"), Some("2"));
        assert_eq!(s.get(SubstitutionType::Message, "b"), None);
    }

    #[test]
    fn test_bidi_ltr() {
        let s = Substitutions::with_bidi_direction(false);
        assert_eq!(
            s.substitute_string("__BIDI_START_EDGE__/__BIDI_END_EDGE__/__BIDI_REVERSE_DIR__"),
            "left/right/rtl"
        );
    }
}
