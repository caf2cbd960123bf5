//! Well-known names of the resource-dictionary document format.

/// The XAML language namespace. The `Key` attribute is looked up in it.
pub const XAML_LANGUAGE_NAMESPACE: &str = "http://schemas.microsoft.com/winfx/2006/xaml";

/// Local name of the resource key attribute (`x:Key`).
pub const KEY_ATTRIBUTE: &str = "Key";

/// Attribute carrying the locator of a merged dictionary.
pub const SOURCE_ATTRIBUTE: &str = "Source";

/// Property element that wraps merged-dictionary references.
pub const MERGED_DICTIONARIES_PROPERTY: &str = "MergedDictionaries";

/// Locator scheme for cross-package references, which are not followed.
pub const PACK_SCHEME: &str = "pack:";

/// Extension every source and output document must carry.
pub const DOCUMENT_EXTENSION: &str = "xaml";

/// Entry document used when none is configured.
pub const DEFAULT_SOURCE: &str = "/LookAndFeel.xaml";

/// Output document used when none is configured.
pub const DEFAULT_OUTPUT: &str = "/FullLookAndFeel.xaml";

/// Prefix base used when the default namespace has to be renamed.
pub const DEFAULT_NAMESPACE_ALIAS: &str = "ns";

/// Returns `true` if `path` ends with the `.xaml` extension (any case).
pub fn has_document_extension(path: &str) -> bool {
    path.rsplit_once('.')
        .map(|(stem, ext)| !stem.is_empty() && ext.eq_ignore_ascii_case(DOCUMENT_EXTENSION))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_extension() {
        assert!(has_document_extension("/LookAndFeel.xaml"));
        assert!(has_document_extension("Themes/Dark.XAML"));
        assert!(!has_document_extension("/LookAndFeel.xml"));
        assert!(!has_document_extension("xaml"));
        assert!(!has_document_extension(".xaml"));
        assert!(!has_document_extension(""));
    }
}
