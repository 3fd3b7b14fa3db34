//! Directed module dependency graph.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::debug;

use crate::extractor::ImportInfo;
use crate::resolver::ModuleResolver;

/// Imports of one analyzed module, the graph builder's per-file input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleImports {
    /// Dotted module identifier.
    pub module: String,
    /// Whether the module is a package `__init__.py`.
    pub is_package: bool,
    /// Imports in source order. Empty for files that failed to parse.
    pub imports: Vec<ImportInfo>,
}

impl ModuleImports {
    /// Creates the record for a module.
    #[must_use]
    pub fn new(module: impl Into<String>, is_package: bool, imports: Vec<ImportInfo>) -> Self {
        Self {
            module: module.into(),
            is_package,
            imports,
        }
    }
}

/// One edge of the graph: `source` imports `target`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct DependencyEdge {
    /// Importing module.
    pub source: String,
    /// Imported module.
    pub target: String,
}

/// Module identifier to outgoing edges.
///
/// Every analyzed module is a node, even one without edges. Built once and
/// never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DependencyGraph {
    edges: BTreeMap<String, BTreeSet<String>>,
}

impl DependencyGraph {
    /// Builds the graph from every module's imports.
    ///
    /// Imports resolving outside the module set are dropped. Imports under
    /// `if TYPE_CHECKING:` are only kept with `include_type_checking`.
    #[must_use]
    pub fn build(files: &[ModuleImports], include_type_checking: bool) -> Self {
        let resolver = ModuleResolver::new(files.iter().map(|f| f.module.clone()));
        let mut edges: BTreeMap<String, BTreeSet<String>> = files
            .iter()
            .map(|f| (f.module.clone(), BTreeSet::new()))
            .collect();

        for file in files {
            let targets = edges.entry(file.module.clone()).or_default();
            for import in &file.imports {
                if import.type_checking && !include_type_checking {
                    continue;
                }
                targets.extend(resolver.resolve(&file.module, file.is_package, import));
            }
        }

        let graph = Self { edges };
        debug!(
            modules = graph.module_count(),
            edges = graph.edge_count(),
            "Dependency graph built"
        );
        graph
    }

    /// Builds a graph from explicit edges; endpoints become nodes.
    #[must_use]
    pub fn from_edges<'a, I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut map: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (source, target) in edges {
            map.entry(target.to_string()).or_default();
            map.entry(source.to_string())
                .or_default()
                .insert(target.to_string());
        }
        Self { edges: map }
    }

    /// Modules in lexicographic order.
    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.edges.keys().map(String::as_str)
    }

    /// Outgoing neighbors of `module` in lexicographic order.
    pub fn neighbors(&self, module: &str) -> impl Iterator<Item = &str> {
        self.edges
            .get(module)
            .into_iter()
            .flat_map(|targets| targets.iter().map(String::as_str))
    }

    /// Whether `source` imports `target`.
    #[must_use]
    pub fn has_edge(&self, source: &str, target: &str) -> bool {
        self.edges.get(source).is_some_and(|t| t.contains(target))
    }

    /// All edges, sorted.
    #[must_use]
    pub fn edges(&self) -> Vec<DependencyEdge> {
        self.edges
            .iter()
            .flat_map(|(source, targets)| {
                targets.iter().map(move |target| DependencyEdge {
                    source: source.clone(),
                    target: target.clone(),
                })
            })
            .collect()
    }

    /// Number of modules.
    #[must_use]
    pub fn module_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeSet::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_import(module: &str, names: &[&str], type_checking: bool) -> ImportInfo {
        ImportInfo {
            line: 1,
            column: 1,
            module: module.to_string(),
            level: 0,
            names: names.iter().map(|s| (*s).to_string()).collect(),
            type_checking,
        }
    }

    #[test]
    fn drops_external_edges() {
        let files = vec![
            ModuleImports::new(
                "pkg.a",
                false,
                vec![
                    from_import("typing", &["Protocol"], false),
                    from_import("pkg.b", &["ProtocolB"], false),
                ],
            ),
            ModuleImports::new("pkg.b", false, Vec::new()),
        ];
        let graph = DependencyGraph::build(&files, false);
        assert_eq!(graph.module_count(), 2);
        assert_eq!(
            graph.edges(),
            vec![DependencyEdge {
                source: "pkg.a".into(),
                target: "pkg.b".into()
            }]
        );
    }

    #[test]
    fn type_checking_edges_are_opt_in() {
        let files = vec![
            ModuleImports::new("a", false, vec![from_import("b", &["B"], true)]),
            ModuleImports::new("b", false, Vec::new()),
        ];
        assert_eq!(DependencyGraph::build(&files, false).edge_count(), 0);
        assert!(DependencyGraph::build(&files, true).has_edge("a", "b"));
    }

    #[test]
    fn unparsed_modules_are_still_nodes() {
        let files = vec![ModuleImports::new("broken", false, Vec::new())];
        let graph = DependencyGraph::build(&files, false);
        assert_eq!(graph.modules().collect::<Vec<_>>(), vec!["broken"]);
        assert_eq!(graph.neighbors("broken").count(), 0);
    }

    #[test]
    fn from_edges_registers_both_endpoints() {
        let graph = DependencyGraph::from_edges([("a", "b")]);
        assert_eq!(graph.modules().collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(graph.has_edge("a", "b"));
        assert!(!graph.has_edge("b", "a"));
    }
}
