//! Run-wide namespace registry and per-document prefix disambiguation.
//!
//! Documents are combined into one output root, so a prefix may only mean
//! one URI across the whole run. When a document binds a prefix the
//! registry already holds for a different URI, the document is rewritten:
//! either onto the prefix the registry already uses for that URI, or onto
//! a fresh `prefix1`, `prefix2`, ... alias.

use serde::Serialize;
use tracing::debug;

use rdmerge_doc::DocumentTree;
use rdmerge_types::xaml::DEFAULT_NAMESPACE_ALIAS;
use rdmerge_types::NamespaceBinding;

/// Ordered set of namespace bindings, unique by prefix.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct NamespaceRegistry {
    bindings: Vec<NamespaceBinding>,
}

impl NamespaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Bindings in registration order.
    pub fn bindings(&self) -> &[NamespaceBinding] {
        &self.bindings
    }

    pub fn iter(&self) -> impl Iterator<Item = &NamespaceBinding> {
        self.bindings.iter()
    }

    /// URI bound to `prefix`.
    pub fn uri_for(&self, prefix: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|b| b.prefix == prefix)
            .map(|b| b.uri.as_str())
    }

    /// First non-default prefix bound to `uri`.
    ///
    /// The default namespace is never offered: renaming a prefixed
    /// attribute onto it would drop the attribute's namespace.
    pub fn prefix_for(&self, uri: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|b| !b.is_default() && b.uri == uri)
            .map(|b| b.prefix.as_str())
    }

    pub fn contains_prefix(&self, prefix: &str) -> bool {
        self.bindings.iter().any(|b| b.prefix == prefix)
    }

    /// Add a binding unless its prefix is already registered.
    /// Returns `true` if the binding was added.
    pub fn register(&mut self, binding: NamespaceBinding) -> bool {
        if self.contains_prefix(&binding.prefix) {
            return false;
        }
        self.bindings.push(binding);
        true
    }
}

/// A prefix replacement applied to one document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PrefixRename {
    /// Prefix as declared by the document (`""` = default namespace).
    pub from: String,
    /// Prefix the document now uses.
    pub to: String,
    pub uri: String,
    /// `true` when `to` was an existing registry prefix for `uri`.
    pub canonical: bool,
}

/// Settings for [`disambiguate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisambiguateOptions {
    /// Also rewrite `prefix:Type` references inside attribute values.
    pub rewrite_attribute_values: bool,
}

impl Default for DisambiguateOptions {
    fn default() -> Self {
        Self {
            rewrite_attribute_values: true,
        }
    }
}

/// Resolve the document's prefix collisions against `registry`, rewrite
/// the document accordingly, and register its bindings.
///
/// Only the root element's declarations take part. Returns the renames
/// that were applied, in declaration order.
pub fn disambiguate(
    doc: &mut DocumentTree,
    registry: &mut NamespaceRegistry,
    options: &DisambiguateOptions,
) -> Vec<PrefixRename> {
    let declared = doc.namespace_declarations();
    let mut renames: Vec<PrefixRename> = Vec::new();

    for binding in &declared {
        let collides = registry
            .uri_for(&binding.prefix)
            .is_some_and(|uri| uri != binding.uri);
        if !collides {
            continue;
        }

        let rename = match registry.prefix_for(&binding.uri) {
            Some(existing) => PrefixRename {
                from: binding.prefix.clone(),
                to: existing.to_string(),
                uri: binding.uri.clone(),
                canonical: true,
            },
            None => PrefixRename {
                from: binding.prefix.clone(),
                to: fresh_prefix(&binding.prefix, registry, &declared, &renames),
                uri: binding.uri.clone(),
                canonical: false,
            },
        };
        renames.push(rename);
    }

    if !renames.is_empty() {
        apply_renames(doc, &renames, options);
    }

    for binding in doc.namespace_declarations() {
        registry.register(binding);
    }

    renames
}

/// First of `base1`, `base2`, ... not bound in the registry, not declared
/// by the document, and not chosen by another pending rename.
fn fresh_prefix(
    base: &str,
    registry: &NamespaceRegistry,
    declared: &[NamespaceBinding],
    pending: &[PrefixRename],
) -> String {
    let base = if base.is_empty() {
        DEFAULT_NAMESPACE_ALIAS
    } else {
        base
    };
    let taken = |candidate: &str| {
        registry.contains_prefix(candidate)
            || declared.iter().any(|b| b.prefix == candidate)
            || pending.iter().any(|r| r.to == candidate)
    };

    // Terminates: only finitely many prefixes are taken.
    let mut n: u64 = 1;
    loop {
        let candidate = format!("{base}{n}");
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Apply all renames as one simultaneous substitution.
///
/// Names first move to placeholder prefixes and only then to their targets,
/// so a rename onto a prefix that another rename vacates (or a swap of two
/// prefixes) cannot capture the wrong names.
fn apply_renames(doc: &mut DocumentTree, renames: &[PrefixRename], options: &DisambiguateOptions) {
    let values = options.rewrite_attribute_values;
    let root = doc.root_mut();
    let placeholder = |i: usize| format!("rdmerge-pending-{i}");

    for (i, rename) in renames.iter().enumerate() {
        root.remove_namespace_declaration(&rename.from);
        root.rename_prefix(&rename.from, &placeholder(i), values);
    }

    for (i, rename) in renames.iter().enumerate() {
        let changed = root.rename_prefix(&placeholder(i), &rename.to, values);
        if root.lookup_namespace(&rename.to) != Some(rename.uri.as_str()) {
            root.declare_namespace(&NamespaceBinding::new(rename.to.clone(), rename.uri.clone()));
        }
        debug!(
            from = %rename.from,
            to = %rename.to,
            uri = %rename.uri,
            canonical = rename.canonical,
            changed,
            "renamed namespace prefix"
        );
    }
}
