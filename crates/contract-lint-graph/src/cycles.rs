//! Cycle detection over the module dependency graph.
//!
//! Dependency cycles between interface modules are reported with their full
//! path. The first pass is a depth-first search that records a cycle on every
//! back edge. Because a node closed on an earlier branch is never re-explored,
//! that pass can miss nodes whose only cycles run through such a node; a second
//! pass finds strongly-connected components and adds a shortest cycle through
//! every cyclic node the first pass did not cover.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use contract_lint_core::Cycle;
use tracing::debug;

use crate::graph::DependencyGraph;

/// Finds cycles so that every module taking part in one is reported.
///
/// Start nodes and neighbors are visited in lexicographic order, making the
/// output deterministic. A self-import is a one-node cycle `[a, a]`. The
/// same cycle reached from different entry points is reported once.
#[must_use]
pub fn find_cycles(graph: &DependencyGraph) -> Vec<Cycle> {
    let mut state = DfsState::default();
    for node in graph.modules() {
        if !state.visited.contains(node) {
            dfs(node, graph, &mut state);
        }
    }

    for component in strongly_connected(graph) {
        let cyclic = component.len() > 1
            || component
                .iter()
                .next()
                .is_some_and(|n| graph.has_edge(n, n));
        if !cyclic {
            continue;
        }
        for &node in &component {
            if state.cycles.iter().flatten().any(|n| *n == node) {
                continue;
            }
            if let Some(path) = shortest_cycle_through(node, &component, graph) {
                state.record(path);
            }
        }
    }

    debug!(cycles = state.cycles.len(), "Cycle detection finished");
    state
        .cycles
        .into_iter()
        .map(|path| Cycle::new(path.into_iter().map(str::to_string).collect()))
        .collect()
}

#[derive(Default)]
struct DfsState<'g> {
    visited: BTreeSet<&'g str>,
    recursion_stack: BTreeSet<&'g str>,
    path_stack: Vec<&'g str>,
    cycles: Vec<Vec<&'g str>>,
    seen: BTreeSet<Vec<&'g str>>,
}

impl<'g> DfsState<'g> {
    /// Records a closed path unless a rotation of it is already known.
    fn record(&mut self, path: Vec<&'g str>) {
        if self.seen.insert(canonical(&path)) {
            self.cycles.push(path);
        }
    }

    fn record_back_edge(&mut self, node: &'g str) {
        if let Some(pos) = self.path_stack.iter().position(|n| *n == node) {
            let mut cycle: Vec<&str> = self.path_stack.iter().skip(pos).copied().collect();
            cycle.push(node);
            self.record(cycle);
        }
    }
}

fn dfs<'g>(node: &'g str, graph: &'g DependencyGraph, state: &mut DfsState<'g>) {
    state.visited.insert(node);
    state.recursion_stack.insert(node);
    state.path_stack.push(node);

    for neighbor in graph.neighbors(node) {
        if !state.visited.contains(neighbor) {
            dfs(neighbor, graph, state);
        } else if state.recursion_stack.contains(neighbor) {
            state.record_back_edge(neighbor);
        }
    }

    state.recursion_stack.remove(node);
    state.path_stack.pop();
}

/// Rotation-independent key of a closed path: nodes without the closing
/// repeat, rotated to start at the smallest.
fn canonical<'g>(path: &[&'g str]) -> Vec<&'g str> {
    let open = path.split_last().map_or(path, |(_, rest)| rest);
    let start = open
        .iter()
        .enumerate()
        .min_by_key(|(_, n)| **n)
        .map_or(0, |(i, _)| i);
    open.iter().cycle().skip(start).take(open.len()).copied().collect()
}

/// Breadth-first search for the shortest closed path through `start` that stays
/// inside its component.
fn shortest_cycle_through<'g>(
    start: &'g str,
    component: &BTreeSet<&'g str>,
    graph: &'g DependencyGraph,
) -> Option<Vec<&'g str>> {
    let mut parent: BTreeMap<&str, &str> = BTreeMap::new();
    let mut seen = BTreeSet::from([start]);
    let mut queue = VecDeque::from([start]);

    while let Some(current) = queue.pop_front() {
        for next in graph.neighbors(current) {
            if next == start {
                let mut path = vec![current];
                let mut cursor = current;
                while let Some(&prev) = parent.get(cursor) {
                    path.push(prev);
                    cursor = prev;
                }
                path.reverse();
                path.push(start);
                return Some(path);
            }
            if component.contains(next) && seen.insert(next) {
                parent.insert(next, current);
                queue.push_back(next);
            }
        }
    }
    None
}

/// Tarjan's algorithm; components come out in reverse topological order.
fn strongly_connected(graph: &DependencyGraph) -> Vec<BTreeSet<&str>> {
    let mut tarjan = Tarjan {
        graph,
        next_index: 0,
        index: BTreeMap::new(),
        lowlink: BTreeMap::new(),
        stack: Vec::new(),
        on_stack: BTreeSet::new(),
        components: Vec::new(),
    };
    for node in graph.modules() {
        if !tarjan.index.contains_key(node) {
            tarjan.connect(node);
        }
    }
    tarjan.components
}

struct Tarjan<'g> {
    graph: &'g DependencyGraph,
    next_index: usize,
    index: BTreeMap<&'g str, usize>,
    lowlink: BTreeMap<&'g str, usize>,
    stack: Vec<&'g str>,
    on_stack: BTreeSet<&'g str>,
    components: Vec<BTreeSet<&'g str>>,
}

impl<'g> Tarjan<'g> {
    fn low(&self, node: &str) -> usize {
        self.lowlink.get(node).copied().unwrap_or(usize::MAX)
    }

    fn connect(&mut self, node: &'g str) {
        self.index.insert(node, self.next_index);
        self.lowlink.insert(node, self.next_index);
        self.next_index += 1;
        self.stack.push(node);
        self.on_stack.insert(node);

        let graph = self.graph;
        for neighbor in graph.neighbors(node) {
            let reached = if let Some(&index) = self.index.get(neighbor) {
                self.on_stack.contains(neighbor).then_some(index)
            } else {
                self.connect(neighbor);
                Some(self.low(neighbor))
            };
            if let Some(reached) = reached {
                let low = self.low(node).min(reached);
                self.lowlink.insert(node, low);
            }
        }

        if self.index.get(node) == self.lowlink.get(node) {
            let mut component = BTreeSet::new();
            while let Some(member) = self.stack.pop() {
                self.on_stack.remove(member);
                component.insert(member);
                if member == node {
                    break;
                }
            }
            self.components.push(component);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cycles_of(edges: &[(&str, &str)]) -> Vec<Cycle> {
        find_cycles(&DependencyGraph::from_edges(edges.iter().copied()))
    }

    fn path(cycle: &Cycle) -> Vec<&str> {
        cycle.modules.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_cycle_detection_logic() {
        let cases: Vec<(Vec<(&str, &str)>, usize, &str)> = vec![
            (vec![("a", "b"), ("b", "c")], 0, "No cycles"),
            (vec![("a", "b"), ("b", "a")], 1, "Simple cycle"),
            (
                vec![("a", "b"), ("a", "c"), ("b", "d"), ("c", "d")],
                0,
                "Diamond DAG (no cycle)",
            ),
            (vec![("a", "a")], 1, "Self loop"),
            (vec![("a", "b"), ("b", "c"), ("c", "a")], 1, "Three node cycle"),
            (
                vec![("a", "b"), ("b", "a"), ("c", "d"), ("d", "c")],
                2,
                "Disjoint cycles",
            ),
            (
                vec![("a", "b"), ("b", "a"), ("b", "c"), ("c", "b")],
                2,
                "Figure-8 (shared node)",
            ),
            (
                vec![("a", "b"), ("b", "c"), ("c", "d"), ("d", "e"), ("e", "a")],
                1,
                "Long cycle (5 nodes)",
            ),
            (vec![], 0, "Empty graph"),
            (vec![("a", "b")], 0, "Single edge"),
        ];

        for (edge_list, expected_count, desc) in cases {
            let cycles = cycles_of(&edge_list);
            assert_eq!(cycles.len(), expected_count, "Failed: {desc}");

            if desc == "Simple cycle" {
                assert_eq!(cycles[0].modules.len(), 3, "a->b->a length");
            }
            if desc == "Self loop" {
                assert_eq!(path(&cycles[0]), vec!["a", "a"]);
            }
        }
    }

    #[test]
    fn three_module_cycle_has_full_path() {
        let cycles = cycles_of(&[("a", "b"), ("b", "c"), ("c", "a")]);
        assert_eq!(cycles.len(), 1);
        assert_eq!(path(&cycles[0]), vec!["a", "b", "c", "a"]);
        assert_eq!(cycles[0].len(), 3);
    }

    #[test]
    fn cycle_found_regardless_of_entry_point() {
        // Same 4-cycle under every rotation of the labels, plus a lead-in node.
        let labels = ["p", "q", "r", "s"];
        for shift in 0..labels.len() {
            let node = |i: usize| labels[(i + shift) % labels.len()];
            let edges = [
                ("a", node(2)),
                (node(0), node(1)),
                (node(1), node(2)),
                (node(2), node(3)),
                (node(3), node(0)),
            ];
            let cycles = cycles_of(&edges);
            assert_eq!(cycles.len(), 1, "shift {shift}");
            let members: BTreeSet<_> = cycles[0].modules.iter().map(String::as_str).collect();
            assert_eq!(members, labels.iter().copied().collect(), "shift {shift}");
            assert_eq!(cycles[0].len(), 4);
        }
    }

    #[test]
    fn reports_nodes_closed_by_an_earlier_branch() {
        // DFS from `a` closes `b` before reaching `c`, so `c -> b -> a -> c`
        // is never a back edge.
        let cycles = cycles_of(&[("a", "b"), ("b", "a"), ("a", "c"), ("c", "b")]);
        assert_eq!(cycles.len(), 2);
        assert_eq!(path(&cycles[0]), vec!["a", "b", "a"]);
        assert_eq!(path(&cycles[1]), vec!["c", "b", "a", "c"]);
    }

    #[test]
    fn no_module_repeats_inside_a_cycle() {
        let cycles = cycles_of(&[
            ("a", "b"),
            ("b", "c"),
            ("c", "a"),
            ("c", "d"),
            ("d", "b"),
            ("d", "e"),
        ]);
        assert!(!cycles.is_empty());
        for cycle in &cycles {
            let open = &cycle.modules[..cycle.modules.len() - 1];
            let distinct: BTreeSet<_> = open.iter().collect();
            assert_eq!(distinct.len(), open.len(), "{cycle}");
            assert_eq!(cycle.modules.first(), cycle.modules.last());
        }
        assert!(!cycles.iter().any(|c| c.contains("e")));
    }

    #[test]
    fn canonical_ignores_rotation() {
        assert_eq!(canonical(&["b", "c", "a", "b"]), vec!["a", "b", "c"]);
        assert_eq!(canonical(&["a", "b", "c", "a"]), vec!["a", "b", "c"]);
        assert_eq!(canonical(&["a", "a"]), vec!["a"]);
    }
}
