//! Qualified-name helpers and prefix rewriting.
//!
//! Names are handled as written (`prefix:local`); nothing here resolves a
//! prefix to its URI.

use std::borrow::Cow;

/// Characters after which a `prefix:Type` reference may start inside an
/// attribute value, besides whitespace.
const VALUE_TOKEN_BOUNDARIES: &[char] = &['{', '(', ',', '=', '['];

/// Split a qualified name into its prefix and local part.
///
/// ```
/// use rdmerge_doc::names::split_qualified;
///
/// assert_eq!(split_qualified("x:Key"), (Some("x"), "Key"));
/// assert_eq!(split_qualified("Style"), (None, "Style"));
/// ```
pub fn split_qualified(name: &str) -> (Option<&str>, &str) {
    match name.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, name),
    }
}

/// Join a prefix and a local name. The empty prefix yields the bare name.
pub fn join_qualified(prefix: &str, local: &str) -> String {
    if prefix.is_empty() {
        local.to_string()
    } else {
        format!("{prefix}:{local}")
    }
}

/// Unescape an attribute value for comparison. Values with malformed
/// entity references are returned as written.
pub fn unescape_value(raw: &str) -> Cow<'_, str> {
    quick_xml::escape::unescape(raw).unwrap_or(Cow::Borrowed(raw))
}

/// Rename the prefix of `name` from `old` to `new`.
///
/// An empty `old` stands for the default namespace, which only applies to
/// element names: unprefixed attributes are in no namespace. Returns `None`
/// when the name does not use `old`.
pub fn rename_qualified(name: &str, old: &str, new: &str, is_element: bool) -> Option<String> {
    match split_qualified(name) {
        (Some(prefix), local) if prefix == old => Some(join_qualified(new, local)),
        (None, local) if old.is_empty() && is_element => Some(join_qualified(new, local)),
        _ => None,
    }
}

/// Rewrite `old:Name` references inside an attribute value to `new:Name`.
///
/// Only occurrences that start a token (beginning of the value, after
/// whitespace or one of `{ ( , = [`) and are followed by a name character
/// are rewritten, so URIs such as `http://...` are left alone. Returns
/// `None` when nothing changed.
pub fn rewrite_value_prefixes(value: &str, old: &str, new: &str) -> Option<String> {
    if old.is_empty() || new.is_empty() || old == new {
        return None;
    }
    let needle = format!("{old}:");
    let mut out = String::with_capacity(value.len());
    let mut last = 0;

    for (idx, _) in value.match_indices(&needle) {
        let before = value[..idx].chars().next_back();
        let after = value[idx + needle.len()..].chars().next();
        let at_boundary =
            before.map_or(true, |c| c.is_whitespace() || VALUE_TOKEN_BOUNDARIES.contains(&c));
        let names_type = after.is_some_and(|c| c.is_alphabetic() || c == '_');
        if at_boundary && names_type {
            out.push_str(&value[last..idx]);
            out.push_str(new);
            out.push(':');
            last = idx + needle.len();
        }
    }

    if last == 0 {
        return None;
    }
    out.push_str(&value[last..]);
    Some(out)
}
