//! The merge engine.
//!
//! Documents are folded into one output root in descending priority, ties
//! in discovery order. For each document:
//!
//! 1. Its non-namespace root attributes are copied onto the output root,
//!    overwriting attributes of the same name.
//! 2. Its leaf entries are appended. An entry whose key was already merged
//!    from an earlier document is handed to the [`ConflictPolicy`].
//! 3. Its keys join the merged key set. Duplicates inside one document are
//!    therefore not conflicts.

use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info, warn};

use rdmerge_doc::{DocumentTree, Element};
use rdmerge_graph::DependencyGraph;
use rdmerge_types::ElementKey;

use crate::error::MergeResult;
use crate::key::{element_key, is_leaf};
use crate::policy::{ConflictPolicy, ConflictResolution, ConflictStrategy, KeyConflict};

/// Counters describing one merge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    /// Documents folded in.
    pub documents: usize,
    /// Leaf entries in the output.
    pub elements: usize,
    /// Incoming entries dropped because their key was already merged.
    pub duplicates_dropped: usize,
    /// Merged entries replaced by an incoming entry with the same key.
    pub duplicates_replaced: usize,
    /// Root attributes whose value was changed by a later document.
    pub attributes_overwritten: usize,
}

/// The merged document and its statistics.
#[derive(Clone, Debug)]
pub struct MergeOutcome {
    pub document: DocumentTree,
    pub stats: MergeStats,
}

/// Where a merged key lives in the output.
struct KeptEntry<'g> {
    index: usize,
    from: &'g Path,
}

/// Flattens a [`DependencyGraph`] into a single document.
pub struct MergeEngine {
    policy: Box<dyn ConflictPolicy>,
}

impl Default for MergeEngine {
    fn default() -> Self {
        Self::with_strategy(ConflictStrategy::default())
    }
}

impl MergeEngine {
    pub fn new(policy: Box<dyn ConflictPolicy>) -> Self {
        Self { policy }
    }

    pub fn with_strategy(strategy: ConflictStrategy) -> Self {
        Self::new(strategy.into_policy())
    }

    pub fn policy(&self) -> &dyn ConflictPolicy {
        self.policy.as_ref()
    }

    /// Merge every document of `graph` under a root named `root_name`.
    ///
    /// The output root declares every namespace binding of the run.
    pub fn merge(&self, graph: &DependencyGraph, root_name: &str) -> MergeResult<MergeOutcome> {
        let mut root = Element::new(root_name);
        for binding in graph.namespaces().iter() {
            root.declare_namespace(binding);
        }

        let mut stats = MergeStats::default();
        let mut leaves: Vec<Element> = Vec::new();
        let mut kept: HashMap<ElementKey, KeptEntry<'_>> = HashMap::new();

        for record in graph.merge_order() {
            stats.documents += 1;
            let doc_root = record.document.root();
            let from = record.location.as_path();

            for attr in doc_root.attributes() {
                if attr.is_namespace_declaration() {
                    continue;
                }
                let previous = root.set_attribute(attr.name.clone(), attr.value.clone());
                if previous.is_some_and(|old| old != attr.value) {
                    debug!(attribute = %attr.name, path = %from.display(), "root attribute overwritten");
                    stats.attributes_overwritten += 1;
                }
            }

            let mut document_keys: Vec<(ElementKey, usize)> = Vec::new();
            for leaf in doc_root.child_elements().filter(|c| is_leaf(c, doc_root)) {
                let Some(key) = element_key(leaf, doc_root) else {
                    leaves.push(leaf.clone());
                    continue;
                };

                let Some(existing) = kept.get_mut(&key) else {
                    document_keys.push((key, leaves.len()));
                    leaves.push(leaf.clone());
                    continue;
                };

                let conflict = KeyConflict {
                    key: &key,
                    kept_from: existing.from,
                    incoming_from: from,
                };
                match self.policy.resolve(&conflict)? {
                    ConflictResolution::KeepExisting => {
                        debug!(
                            key = %key,
                            kept_from = %existing.from.display(),
                            dropped_from = %from.display(),
                            "duplicate key dropped"
                        );
                        stats.duplicates_dropped += 1;
                    }
                    ConflictResolution::Replace => {
                        warn!(
                            key = %key,
                            replaced_from = %existing.from.display(),
                            kept_from = %from.display(),
                            "duplicate key replaced"
                        );
                        leaves[existing.index] = leaf.clone();
                        existing.from = from;
                        stats.duplicates_replaced += 1;
                    }
                }
            }

            for (key, index) in document_keys {
                kept.entry(key).or_insert(KeptEntry { index, from });
            }
        }

        stats.elements = leaves.len();
        for leaf in leaves {
            root.push_element(leaf);
        }

        info!(
            policy = self.policy.name(),
            documents = stats.documents,
            elements = stats.elements,
            dropped = stats.duplicates_dropped,
            replaced = stats.duplicates_replaced,
            "documents merged"
        );

        Ok(MergeOutcome {
            document: DocumentTree::new(root),
            stats,
        })
    }
}
