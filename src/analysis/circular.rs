use crate::analysis::DependencyGraph;
use petgraph::algo::tarjan_scc;
use std::collections::HashSet;
use tracing::debug;

/// Closed walk through the graph; first and last entries are the same node.
pub type Cycle = Vec<String>;

struct Frame<'a> {
    node: &'a str,
    neighbours: Vec<&'a str>,
    next: usize,
}

/// Find cycles with a depth-first traversal started from every unvisited node.
///
/// Node and neighbour order follow graph insertion order, so output is
/// reproducible. The same logical cycle can be reported more than once, for
/// example rotated, when it is reached from different starting points; the
/// list is returned as discovered. See [`find_cycle_groups`] for a
/// deduplicated view.
pub fn find_cycles(graph: &DependencyGraph) -> Vec<Cycle> {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut on_stack: HashSet<&str> = HashSet::new();
    let mut path: Vec<&str> = Vec::new();
    let mut cycles = Vec::new();

    for root in graph.nodes() {
        if visited.contains(root) {
            continue;
        }

        visited.insert(root);
        on_stack.insert(root);
        path.push(root);
        let mut stack = vec![Frame {
            node: root,
            neighbours: graph.dependencies_of(root),
            next: 0,
        }];

        while let Some(frame) = stack.last_mut() {
            let Some(&neighbour) = frame.neighbours.get(frame.next) else {
                // backtrack: leave the recursion stack, stay visited
                on_stack.remove(frame.node);
                path.pop();
                stack.pop();
                continue;
            };
            frame.next += 1;

            if !visited.contains(neighbour) {
                visited.insert(neighbour);
                on_stack.insert(neighbour);
                path.push(neighbour);
                stack.push(Frame {
                    node: neighbour,
                    neighbours: graph.dependencies_of(neighbour),
                    next: 0,
                });
            } else if on_stack.contains(neighbour) {
                if let Some(start) = path.iter().position(|p| *p == neighbour) {
                    let mut cycle: Cycle = path[start..].iter().map(|p| p.to_string()).collect();
                    cycle.push(neighbour.to_string());
                    debug!(cycle = %cycle.join(" -> "), "circular dependency");
                    cycles.push(cycle);
                }
            }
        }
    }

    cycles
}

/// Strongly connected components with more than one file, each sorted by
/// path. Every file taking part in some cycle appears in exactly one group.
pub fn find_cycle_groups(graph: &DependencyGraph) -> Vec<Vec<String>> {
    let digraph = graph.to_digraph();

    let mut groups: Vec<Vec<String>> = tarjan_scc(&digraph)
        .into_iter()
        .filter(|scc| scc.len() > 1)
        .map(|scc| {
            let mut members: Vec<String> = scc
                .iter()
                .filter_map(|idx| digraph.node_weight(*idx).cloned())
                .collect();
            members.sort();
            members
        })
        .collect();

    groups.sort();
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acyclic_graph_has_no_cycles() {
        let graph = DependencyGraph::from_edges([
            ("a.py", vec!["b", "c"]),
            ("b.py", vec!["c"]),
            ("c.py", vec!["d"]),
        ]);
        assert!(find_cycles(&graph).is_empty());
        assert!(find_cycle_groups(&graph).is_empty());
    }

    #[test]
    fn test_two_node_cycle() {
        let graph = DependencyGraph::from_edges([("a.py", vec!["b"]), ("b.py", vec!["a"])]);
        let cycles = find_cycles(&graph);

        assert_eq!(cycles, vec![vec!["a.py", "b.py", "a.py"]]);
        assert_eq!(find_cycle_groups(&graph), vec![vec!["a.py", "b.py"]]);
    }

    #[test]
    fn test_cycle_slice_starts_at_reentry_point() {
        // entry -> a -> b -> c -> a
        let graph = DependencyGraph::from_edges([
            ("entry.py", vec!["a"]),
            ("a.py", vec!["b"]),
            ("b.py", vec!["c"]),
            ("c.py", vec!["a"]),
        ]);
        let cycles = find_cycles(&graph);
        assert_eq!(cycles, vec![vec!["a.py", "b.py", "c.py", "a.py"]]);
    }

    #[test]
    fn test_overlapping_cycles_are_all_reported() {
        // a <-> b and b <-> c share b
        let graph = DependencyGraph::from_edges([
            ("a.py", vec!["b"]),
            ("b.py", vec!["a", "c"]),
            ("c.py", vec!["b"]),
        ]);
        let cycles = find_cycles(&graph);

        assert_eq!(cycles.len(), 2);
        for cycle in &cycles {
            assert_eq!(cycle.first(), cycle.last());
        }
        assert_eq!(find_cycle_groups(&graph), vec![vec!["a.py", "b.py", "c.py"]]);
    }

    #[test]
    fn test_traversal_is_reproducible() {
        let graph = DependencyGraph::from_edges([
            ("x.py", vec!["y"]),
            ("y.py", vec!["z", "x"]),
            ("z.py", vec!["x"]),
        ]);
        assert_eq!(find_cycles(&graph), find_cycles(&graph));
    }
}
