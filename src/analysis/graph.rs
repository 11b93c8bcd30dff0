//! Name-based dependency graph.
//!
//! Resolution is a heuristic, not a namespace resolver: a file's base name and
//! every directory name above it are registered as "internal" module names, and
//! an import counts as internal when its root segment matches one of them.
//! Two files sharing a base name, or a third-party package that happens to share
//! a name with a local directory, produce false edges; imports of an internal
//! module under an alias the registry never saw are missed. Both are accepted
//! limitations of the approach.

use crate::model::SourceFile;
use crate::parser::ExtractorRegistry;
use petgraph::graph::{DiGraph, NodeIndex};
use rayon::prelude::*;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{info, warn};

/// Mapping of file path -> internal names it imports, in discovery order.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    edges: Vec<(String, Vec<String>)>,
    node_indices: HashMap<String, usize>,
    /// internal name -> files that registered it
    modules: HashMap<String, Vec<String>>,
    files_scanned: usize,
    truncated: bool,
}

/// Names a file contributes to the internal-name registry: its base name and
/// the name of every directory between it and the repository root.
fn internal_names(path: &Path) -> Vec<String> {
    let mut names: Vec<String> = path
        .parent()
        .into_iter()
        .flat_map(|p| p.components())
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .filter(|c| !c.is_empty() && c != ".")
        .collect();

    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
        names.push(stem.to_string());
    }
    names
}

fn register(modules: &mut HashMap<String, Vec<String>>, path: &Path, id: &str) {
    for name in internal_names(path) {
        let files = modules.entry(name).or_default();
        if !files.iter().any(|f| f == id) {
            files.push(id.to_string());
        }
    }
}

impl DependencyGraph {
    /// Build the graph for one scan.
    ///
    /// Only files with a registered extractor take part. At most `max_files`
    /// of them are resolved; the rest are dropped and the graph is flagged as
    /// truncated.
    pub fn build(files: &[SourceFile], registry: &ExtractorRegistry, max_files: usize) -> Self {
        let candidates: Vec<&SourceFile> = files
            .iter()
            .filter(|f| registry.supports(&f.path))
            .collect();

        // Step 1: internal-name registry
        let mut modules = HashMap::new();
        for file in &candidates {
            register(&mut modules, &file.path, &file.id());
        }

        let truncated = candidates.len() > max_files;
        if truncated {
            warn!(
                limit = max_files,
                candidates = candidates.len(),
                "file limit reached, dependency graph is partial"
            );
        }
        let processed = &candidates[..candidates.len().min(max_files)];

        // Step 2: per-file resolution
        let resolved: Vec<(String, Vec<String>)> = processed
            .par_iter()
            .map(|file| {
                let internal = registry
                    .extract_imports(&file.path, &file.content)
                    .into_iter()
                    .filter(|name| modules.contains_key(name))
                    .collect();
                (file.id(), internal)
            })
            .collect();

        let mut graph = Self {
            modules,
            files_scanned: processed.len(),
            truncated,
            ..Self::default()
        };
        for (path, deps) in resolved {
            graph.insert(path, deps);
        }

        info!(
            modules = graph.len(),
            edges = graph.edge_count(),
            "dependency graph built"
        );
        graph
    }

    /// Build a graph from explicit edges. Target names resolve against the
    /// base and directory names of the given node paths.
    pub fn from_edges<I, P, N>(edges: I) -> Self
    where
        I: IntoIterator<Item = (P, Vec<N>)>,
        P: Into<String>,
        N: Into<String>,
    {
        let mut graph = Self::default();
        for (path, deps) in edges {
            let path: String = path.into();
            register(&mut graph.modules, Path::new(&path), &path);
            graph.files_scanned += 1;
            graph.insert(path, deps.into_iter().map(Into::into).collect());
        }
        graph
    }

    fn insert(&mut self, path: String, deps: Vec<String>) {
        // files without internal dependencies are not stored
        if deps.is_empty() {
            return;
        }
        match self.node_indices.get(&path) {
            Some(&idx) => self.edges[idx].1 = deps,
            None => {
                self.node_indices.insert(path.clone(), self.edges.len());
                self.edges.push((path, deps));
            }
        }
    }

    /// Nodes with at least one internal dependency, in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.edges.iter().map(|(path, _)| path.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.edges
            .iter()
            .map(|(path, deps)| (path.as_str(), deps.as_slice()))
    }

    /// Internal names imported by `path`, as extracted.
    pub fn imports_of(&self, path: &str) -> &[String] {
        self.node_indices
            .get(path)
            .map(|&idx| self.edges[idx].1.as_slice())
            .unwrap_or(&[])
    }

    /// Files registered under an internal name.
    pub fn files_for(&self, name: &str) -> &[String] {
        self.modules.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Files `path` depends on, with each imported name resolved to the files
    /// that registered it. Order follows the import list; a file never
    /// depends on itself.
    pub fn dependencies_of(&self, path: &str) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut deps = Vec::new();
        for name in self.imports_of(path) {
            for target in self.files_for(name) {
                if target != path && seen.insert(target.as_str()) {
                    deps.push(target.as_str());
                }
            }
        }
        deps
    }

    pub fn contains(&self, path: &str) -> bool {
        self.node_indices.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.iter().map(|(_, deps)| deps.len()).sum()
    }

    /// Number of source files resolved while building the graph.
    pub fn files_scanned(&self) -> usize {
        self.files_scanned
    }

    /// True when the file ceiling cut the build short.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// File-level petgraph view with names resolved to files.
    pub fn to_digraph(&self) -> DiGraph<String, ()> {
        let mut graph = DiGraph::new();
        let mut indices: HashMap<&str, NodeIndex> = HashMap::new();

        for from in self.nodes() {
            let from_idx = node_index(&mut graph, &mut indices, from);
            for to in self.dependencies_of(from) {
                let to_idx = node_index(&mut graph, &mut indices, to);
                graph.update_edge(from_idx, to_idx, ());
            }
        }
        graph
    }
}

impl Serialize for DependencyGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.edges.len()))?;
        for (path, deps) in &self.edges {
            map.serialize_entry(path, deps)?;
        }
        map.end()
    }
}

fn node_index<'a>(
    graph: &mut DiGraph<String, ()>,
    indices: &mut HashMap<&'a str, NodeIndex>,
    path: &'a str,
) -> NodeIndex {
    *indices
        .entry(path)
        .or_insert_with(|| graph.add_node(path.to_string()))
}
