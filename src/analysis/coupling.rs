use crate::analysis::DependencyGraph;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A dependency target and the number of distinct files importing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouplingEntry {
    pub name: String,
    pub in_degree: usize,
}

/// In-degree of every imported name, in order of first appearance.
pub fn in_degrees(graph: &DependencyGraph) -> Vec<CouplingEntry> {
    let mut entries: Vec<CouplingEntry> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for (_, deps) in graph.iter() {
        let mut counted = HashSet::new();
        for dep in deps {
            if !counted.insert(dep.as_str()) {
                continue;
            }
            match index.get(dep.as_str()) {
                Some(&i) => entries[i].in_degree += 1,
                None => {
                    index.insert(dep.as_str(), entries.len());
                    entries.push(CouplingEntry {
                        name: dep.clone(),
                        in_degree: 1,
                    });
                }
            }
        }
    }

    entries
}

/// Names whose in-degree meets `threshold`, highest first. Ties keep the
/// order in which the names were first referenced.
pub fn rank_coupling(graph: &DependencyGraph, threshold: usize) -> Vec<CouplingEntry> {
    let mut ranked: Vec<CouplingEntry> = in_degrees(graph)
        .into_iter()
        .filter(|e| e.in_degree >= threshold)
        .collect();
    ranked.sort_by(|a, b| b.in_degree.cmp(&a.in_degree));
    ranked
}
