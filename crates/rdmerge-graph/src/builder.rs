//! Dependency Graph Builder.
//!
//! [`GraphBuilder::build`] walks merged-dictionary references depth-first,
//! in document order, starting at the entry document. The walk is driven
//! by an explicit stack of frames rather than native recursion; the
//! locations on that stack form the active reference path.
//!
//! # Invariants
//!
//! - Every location is loaded and parsed at most once.
//! - The entry document holds [`Priority::Root`].
//! - A document reached again gets `max(existing + 1, parent + 1)` and its
//!   references are walked again, so its dependencies keep ranking above it.
//! - Reaching a location that is on the active path is a cycle and fails.

use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use rdmerge_doc::names::unescape_value;
use rdmerge_doc::DocumentTree;
use rdmerge_types::xaml::SOURCE_ATTRIBUTE;
use rdmerge_types::Priority;

use crate::error::{GraphError, GraphResult};
use crate::loader::DocumentLoader;
use crate::locator::{normalize, LocatorResolver, Resolution};
use crate::namespace::{disambiguate, DisambiguateOptions, NamespaceRegistry, PrefixRename};
use crate::source::DocumentSource;

/// One loaded document and its merge priority.
#[derive(Clone, Debug)]
pub struct DependencyRecord {
    /// Normalized absolute location.
    pub location: PathBuf,
    /// The document after namespace disambiguation.
    pub document: DocumentTree,
    pub priority: Priority,
    /// Discovery index; breaks priority ties.
    pub order: usize,
}

/// A prefix rename applied to a specific document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AppliedRename {
    pub location: PathBuf,
    #[serde(flatten)]
    pub rename: PrefixRename,
}

/// A reference that was not followed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SkippedReference {
    /// Document containing the reference.
    pub referrer: PathBuf,
    pub locator: String,
}

/// The result of a build: every reachable document plus the run-wide
/// namespace registry.
///
/// This is also the mutable context threaded through the walk; only
/// [`GraphBuilder`] mutates it.
#[derive(Clone, Debug, Default)]
pub struct DependencyGraph {
    records: IndexMap<PathBuf, DependencyRecord>,
    namespaces: NamespaceRegistry,
    renames: Vec<AppliedRename>,
    skipped: Vec<SkippedReference>,
}

impl DependencyGraph {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, location: &Path) -> Option<&DependencyRecord> {
        self.records.get(location)
    }

    /// Records in discovery order.
    pub fn records(&self) -> impl Iterator<Item = &DependencyRecord> {
        self.records.values()
    }

    /// The entry document's record.
    pub fn entry(&self) -> Option<&DependencyRecord> {
        self.records.values().next()
    }

    pub fn namespaces(&self) -> &NamespaceRegistry {
        &self.namespaces
    }

    pub fn renames(&self) -> &[AppliedRename] {
        &self.renames
    }

    pub fn skipped(&self) -> &[SkippedReference] {
        &self.skipped
    }

    /// Records by descending priority; ties keep discovery order.
    pub fn merge_order(&self) -> Vec<&DependencyRecord> {
        let mut ordered: Vec<&DependencyRecord> = self.records.values().collect();
        ordered.sort_by_key(|record| std::cmp::Reverse(record.priority));
        ordered
    }
}

/// Settings for a build.
#[derive(Clone, Debug)]
pub struct BuildOptions {
    pub project_root: PathBuf,
    /// Assembly name used in `/{name};component/` qualifiers.
    pub project_name: String,
    pub namespaces: DisambiguateOptions,
}

/// A document on the active reference path with the references it still
/// has to walk.
struct Frame {
    location: PathBuf,
    priority: Priority,
    pending: VecDeque<PathBuf>,
}

/// Walks the reference graph from an entry document.
pub struct GraphBuilder<S> {
    loader: DocumentLoader<S>,
    resolver: LocatorResolver,
    namespace_options: DisambiguateOptions,
}

impl<S: DocumentSource> GraphBuilder<S> {
    pub fn new(source: S, options: BuildOptions) -> Self {
        Self {
            loader: DocumentLoader::new(source),
            resolver: LocatorResolver::new(options.project_root, &options.project_name),
            namespace_options: options.namespaces,
        }
    }

    /// Build the graph reachable from `entry`.
    pub fn build(&self, entry: &Path) -> GraphResult<DependencyGraph> {
        let mut graph = DependencyGraph::default();
        let mut stack: Vec<Frame> = Vec::new();
        let mut active: HashSet<PathBuf> = HashSet::new();

        self.enter(&mut graph, &mut stack, &mut active, normalize(entry), None)?;

        loop {
            let next = match stack.last_mut() {
                None => break,
                Some(frame) => frame
                    .pending
                    .pop_front()
                    .map(|child| (child, frame.priority)),
            };
            match next {
                Some((child, parent)) => {
                    self.enter(&mut graph, &mut stack, &mut active, child, Some(parent))?;
                }
                None => {
                    if let Some(done) = stack.pop() {
                        active.remove(&done.location);
                    }
                }
            }
        }

        debug!(
            documents = graph.len(),
            namespaces = graph.namespaces.len(),
            skipped = graph.skipped.len(),
            "dependency graph built"
        );
        Ok(graph)
    }

    /// Reach `location` from a document with priority `parent` (`None` for
    /// the entry) and push a frame for its references.
    fn enter(
        &self,
        graph: &mut DependencyGraph,
        stack: &mut Vec<Frame>,
        active: &mut HashSet<PathBuf>,
        location: PathBuf,
        parent: Option<Priority>,
    ) -> GraphResult<()> {
        if active.contains(&location) {
            let mut chain: Vec<PathBuf> = stack.iter().map(|f| f.location.clone()).collect();
            chain.push(location.clone());
            return Err(GraphError::CyclicReference {
                path: location,
                chain,
            });
        }

        let first_visit = !graph.records.contains_key(&location);
        if first_visit {
            let mut document = self.loader.load(&location)?;
            let renames = disambiguate(&mut document, &mut graph.namespaces, &self.namespace_options);
            graph.renames.extend(renames.into_iter().map(|rename| AppliedRename {
                location: location.clone(),
                rename,
            }));

            let priority = parent.map_or(Priority::Root, Priority::child_of);
            let order = graph.records.len();
            debug!(path = %location.display(), %priority, "discovered document");
            graph.records.insert(
                location.clone(),
                DependencyRecord {
                    location: location.clone(),
                    document,
                    priority,
                    order,
                },
            );
        } else if let (Some(record), Some(parent)) = (graph.records.get_mut(&location), parent) {
            let before = record.priority;
            record.priority = before.revisit(parent);
            debug!(
                path = %location.display(),
                from = %before,
                to = %record.priority,
                "document reached again"
            );
        }

        let Some(record) = graph.records.get(&location) else {
            return Ok(());
        };
        let priority = record.priority;
        let (pending, skipped) = self.references(&record.document, &location);
        if first_visit {
            graph.skipped.extend(skipped);
        }

        active.insert(location.clone());
        stack.push(Frame {
            location,
            priority,
            pending,
        });
        Ok(())
    }

    /// Resolved references of a document, in document order, plus the
    /// references that are not followed.
    ///
    /// A reference is any element below the root whose local name equals
    /// the root's and which carries a non-empty `Source` attribute.
    fn references(
        &self,
        document: &DocumentTree,
        location: &Path,
    ) -> (VecDeque<PathBuf>, Vec<SkippedReference>) {
        let root = document.root();
        let mut resolved = VecDeque::new();
        let mut skipped = Vec::new();

        for element in root.descendants() {
            if element.local_name() != root.local_name() {
                continue;
            }
            let Some(raw) = element.attribute(SOURCE_ATTRIBUTE) else {
                continue;
            };
            let locator = unescape_value(raw);
            if locator.trim().is_empty() {
                continue;
            }
            match self.resolver.resolve(location, &locator) {
                Resolution::Document(target) => resolved.push_back(target),
                Resolution::Unsupported => {
                    debug!(referrer = %location.display(), locator = %locator, "skipping unsupported reference");
                    skipped.push(SkippedReference {
                        referrer: location.to_path_buf(),
                        locator: locator.into_owned(),
                    });
                }
            }
        }

        (resolved, skipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemorySource;
    use rdmerge_types::ErrorCode;

    const ROOT: &str = "/work/Demo";

    fn dictionary(sources: &[&str]) -> String {
        let refs: String = sources
            .iter()
            .map(|s| format!(r#"<ResourceDictionary Source="{s}"/>"#))
            .collect();
        format!(
            r#"<ResourceDictionary xmlns="urn:presentation" xmlns:x="http://schemas.microsoft.com/winfx/2006/xaml">
                <ResourceDictionary.MergedDictionaries>{refs}</ResourceDictionary.MergedDictionaries>
            </ResourceDictionary>"#
        )
    }

    fn path(name: &str) -> PathBuf {
        PathBuf::from(format!("{ROOT}/{name}"))
    }

    fn builder(source: MemorySource) -> GraphBuilder<MemorySource> {
        GraphBuilder::new(
            source,
            BuildOptions {
                project_root: PathBuf::from(ROOT),
                project_name: "Demo".into(),
                namespaces: DisambiguateOptions::default(),
            },
        )
    }

    fn order_names(graph: &DependencyGraph) -> Vec<String> {
        graph
            .merge_order()
            .iter()
            .map(|r| r.location.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn single_document_is_root() {
        let source = MemorySource::new().with(path("E.xaml"), dictionary(&[]));
        let graph = builder(source).build(&path("E.xaml")).unwrap();
        assert_eq!(graph.len(), 1);
        let entry = graph.entry().unwrap();
        assert_eq!(entry.priority, Priority::Root);
        assert_eq!(entry.order, 0);
    }

    #[test]
    fn shared_dependency_climbs_above_its_dependents() {
        let c = "/Demo;component/C.xaml";
        let source = MemorySource::new()
            .with(path("E.xaml"), dictionary(&["/Demo;component/A.xaml", "/Demo;component/B.xaml"]))
            .with(path("A.xaml"), dictionary(&[c]))
            .with(path("B.xaml"), dictionary(&[c]))
            .with(path("C.xaml"), dictionary(&[]));

        let graph = builder(source).build(&path("E.xaml")).unwrap();

        assert_eq!(graph.len(), 4);
        assert_eq!(graph.get(&path("E.xaml")).unwrap().priority, Priority::Root);
        assert_eq!(graph.get(&path("A.xaml")).unwrap().priority, Priority::Level(1));
        assert_eq!(graph.get(&path("B.xaml")).unwrap().priority, Priority::Level(1));
        assert_eq!(graph.get(&path("C.xaml")).unwrap().priority, Priority::Level(3));
        assert_eq!(order_names(&graph), vec!["C.xaml", "A.xaml", "B.xaml", "E.xaml"]);
    }

    #[test]
    fn revisits_propagate_to_transitive_dependencies() {
        let source = MemorySource::new()
            .with(path("E.xaml"), dictionary(&["A.xaml", "B.xaml"]))
            .with(path("A.xaml"), dictionary(&["C.xaml"]))
            .with(path("B.xaml"), dictionary(&["C.xaml"]))
            .with(path("C.xaml"), dictionary(&["D.xaml"]))
            .with(path("D.xaml"), dictionary(&[]));

        let graph = builder(source).build(&path("E.xaml")).unwrap();

        assert_eq!(graph.get(&path("C.xaml")).unwrap().priority, Priority::Level(3));
        assert_eq!(graph.get(&path("D.xaml")).unwrap().priority, Priority::Level(4));
        assert_eq!(order_names(&graph), vec!["D.xaml", "C.xaml", "A.xaml", "B.xaml", "E.xaml"]);
    }

    #[test]
    fn each_location_is_loaded_once() {
        let source = MemorySource::new()
            .with(path("E.xaml"), dictionary(&["Shared.xaml", "./Shared.xaml", "/Shared.xaml"]))
            .with(path("Shared.xaml"), dictionary(&[]));
        let graph = builder(source).build(&path("E.xaml")).unwrap();
        assert_eq!(graph.len(), 2);
        // Reached three times from the root: 1, then 2, then 3.
        assert_eq!(graph.get(&path("Shared.xaml")).unwrap().priority, Priority::Level(3));
    }

    #[test]
    fn pack_references_are_skipped() {
        let source = MemorySource::new()
            .with(
                path("E.xaml"),
                dictionary(&["pack://application:,,,/Other;component/Theme.xaml", "A.xaml"]),
            )
            .with(path("A.xaml"), dictionary(&[]));
        let graph = builder(source).build(&path("E.xaml")).unwrap();
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.skipped().len(), 1);
        assert_eq!(graph.skipped()[0].referrer, path("E.xaml"));
    }

    #[test]
    fn missing_nested_document_is_fatal() {
        let source = MemorySource::new()
            .with(path("E.xaml"), dictionary(&["A.xaml"]))
            .with(path("A.xaml"), dictionary(&["Gone.xaml"]));
        let err = builder(source).build(&path("E.xaml")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::SourceFileMissing);
        assert_eq!(err.path(), path("Gone.xaml"));
    }

    #[test]
    fn cycle_is_detected() {
        let source = MemorySource::new()
            .with(path("E.xaml"), dictionary(&["A.xaml"]))
            .with(path("A.xaml"), dictionary(&["B.xaml"]))
            .with(path("B.xaml"), dictionary(&["A.xaml"]));
        let err = builder(source).build(&path("E.xaml")).unwrap_err();
        match err {
            GraphError::CyclicReference { path: at, chain } => {
                assert_eq!(at, path("A.xaml"));
                assert_eq!(chain, vec![path("E.xaml"), path("A.xaml"), path("B.xaml"), path("A.xaml")]);
            }
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn self_reference_to_entry_is_a_cycle() {
        let source = MemorySource::new().with(path("E.xaml"), dictionary(&["E.xaml"]));
        let err = builder(source).build(&path("E.xaml")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::CyclicReference);
    }

    #[test]
    fn diamond_is_not_a_cycle() {
        let source = MemorySource::new()
            .with(path("E.xaml"), dictionary(&["A.xaml", "B.xaml"]))
            .with(path("A.xaml"), dictionary(&["C.xaml"]))
            .with(path("B.xaml"), dictionary(&["C.xaml"]))
            .with(path("C.xaml"), dictionary(&[]));
        assert!(builder(source).build(&path("E.xaml")).is_ok());
    }

    #[test]
    fn namespaces_are_disambiguated_during_the_walk() {
        let source = MemorySource::new()
            .with(
                path("E.xaml"),
                r#"<ResourceDictionary xmlns:ns0="urn:a"><ResourceDictionary Source="A.xaml"/></ResourceDictionary>"#,
            )
            .with(
                path("A.xaml"),
                r#"<ResourceDictionary xmlns:ns0="urn:b"><ns0:Brush/></ResourceDictionary>"#,
            );
        let graph = builder(source).build(&path("E.xaml")).unwrap();

        assert_eq!(graph.renames().len(), 1);
        assert_eq!(graph.renames()[0].location, path("A.xaml"));
        assert_eq!(graph.renames()[0].rename.to, "ns01");
        let a = graph.get(&path("A.xaml")).unwrap();
        assert_eq!(a.document.root().child_elements().next().unwrap().name(), "ns01:Brush");
        assert_eq!(graph.namespaces().uri_for("ns0"), Some("urn:a"));
        assert_eq!(graph.namespaces().uri_for("ns01"), Some("urn:b"));
    }

    #[test]
    fn references_inside_nested_dictionaries_are_followed() {
        let source = MemorySource::new()
            .with(
                path("E.xaml"),
                r#"<ResourceDictionary>
                    <ResourceDictionary x:Key="Inline">
                        <ResourceDictionary.MergedDictionaries>
                            <ResourceDictionary Source="A.xaml"/>
                        </ResourceDictionary.MergedDictionaries>
                    </ResourceDictionary>
                    <Style Source="NotAReference.xaml"/>
                </ResourceDictionary>"#,
            )
            .with(path("A.xaml"), dictionary(&[]));
        let graph = builder(source).build(&path("E.xaml")).unwrap();
        assert_eq!(graph.len(), 2);
    }
}
