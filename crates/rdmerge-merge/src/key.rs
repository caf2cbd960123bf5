//! Leaf selection and key extraction.

use rdmerge_doc::names::unescape_value;
use rdmerge_doc::Element;
use rdmerge_types::xaml::{KEY_ATTRIBUTE, MERGED_DICTIONARIES_PROPERTY, XAML_LANGUAGE_NAMESPACE};
use rdmerge_types::ElementKey;

/// Returns `true` if `child`, a direct child of `root`, is a resource entry
/// that belongs in the merged output.
///
/// Nested dictionaries (same local name as the root) and the
/// `{Root}.MergedDictionaries` property element are structure, not entries.
pub fn is_leaf(child: &Element, root: &Element) -> bool {
    let local = child.local_name();
    let root_local = root.local_name();
    if local == root_local {
        return false;
    }
    match local.strip_prefix(root_local) {
        Some(rest) => rest != format!(".{MERGED_DICTIONARIES_PROPERTY}"),
        None => true,
    }
}

/// The key of a leaf element, if it has one.
///
/// The key attribute is the one with local name `Key` whose prefix is bound
/// to the XAML language namespace, on the element itself or on its
/// document root. The value is unescaped so `A&amp;B` and `A&#38;B` match.
pub fn element_key(element: &Element, root: &Element) -> Option<ElementKey> {
    element.attributes().iter().find_map(|attr| {
        if attr.local_name() != KEY_ATTRIBUTE {
            return None;
        }
        let prefix = attr.prefix()?;
        let uri = element
            .lookup_namespace(prefix)
            .or_else(|| root.lookup_namespace(prefix))?;
        (uri == XAML_LANGUAGE_NAMESPACE)
            .then(|| ElementKey::new(unescape_value(&attr.value).into_owned()))
    })
}
