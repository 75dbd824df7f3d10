//! A generic directed graph with cycle detection and forward reachability
//! (`spec.md` §4.1).
//!
//! Used both for the header include graph (nodes are project-relative,
//! forward-slash-normalized path strings) and for the configuration
//! parent graph (nodes are configuration names); see `rls/src/build/plan.rs`'s
//! `BuildGraph` trait for the precedent of reusing one graph shape across
//! domains.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::hash::Hash;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// A directed graph over any clonable, totally-ordered, hashable node type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph<T: Ord + Clone + Hash + Eq> {
    edges: BTreeMap<T, BTreeSet<T>>,
}

impl<T: Ord + Clone + Hash + Eq> Graph<T> {
    pub fn new() -> Self {
        Graph { edges: BTreeMap::new() }
    }

    /// Adds `node` as a key with no neighbors, if it isn't present already.
    pub fn add_node(&mut self, node: T) {
        self.edges.entry(node).or_default();
    }

    /// Adds the edge `from -> to`, ensuring both endpoints exist as keys.
    pub fn add_edge(&mut self, from: T, to: T) {
        self.edges.entry(from).or_default().insert(to.clone());
        self.add_node(to);
    }

    pub fn contains_node(&self, node: &T) -> bool {
        self.edges.contains_key(node)
    }

    pub fn neighbors(&self, node: &T) -> Option<&BTreeSet<T>> {
        self.edges.get(node)
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// All keys of the graph, in sorted order.
    pub fn nodes(&self) -> impl Iterator<Item = &T> {
        self.edges.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&T, &BTreeSet<T>)> {
        self.edges.iter()
    }

    /// Returns the set of nodes reachable by forward traversal from any of
    /// `seeds`, including the seeds themselves; even a seed absent from the
    /// graph or with no outgoing edges is included.
    pub fn reachable_from(&self, seeds: impl IntoIterator<Item = T>) -> BTreeSet<T> {
        let mut reached: BTreeSet<T> = BTreeSet::new();
        let mut queue: Vec<T> = Vec::new();

        for seed in seeds {
            if reached.insert(seed.clone()) {
                queue.push(seed);
            }
        }

        let mut head = 0;
        while head < queue.len() {
            let node = queue[head].clone();
            head += 1;

            if let Some(neighbors) = self.edges.get(&node) {
                for neighbor in neighbors {
                    if reached.insert(neighbor.clone()) {
                        queue.push(neighbor.clone());
                    }
                }
            }
        }

        reached
    }
}

impl<T: Ord + Clone + Hash + Eq + fmt::Display> Graph<T> {
    /// If the graph is acyclic, returns `None`. Otherwise returns a canonical
    /// string `"n1 -> n2 -> ... -> n1"`, rotated so the lexicographically
    /// smallest node in the discovered cycle comes first, closing the loop
    /// by repeating that node at the end.
    pub fn find_cycle(&self) -> Option<String> {
        let mut color: BTreeMap<T, Color> = self.edges.keys().map(|n| (n.clone(), Color::White)).collect();
        let mut parent: BTreeMap<T, T> = BTreeMap::new();

        let keys: Vec<T> = self.edges.keys().cloned().collect();
        for node in &keys {
            if color.get(node).copied() == Some(Color::White) {
                if let Some((u, v)) = Self::dfs(node, &self.edges, &mut color, &mut parent) {
                    return Some(Self::reconstruct_cycle(&u, &v, &parent));
                }
            }
        }
        None
    }

    fn dfs(
        node: &T,
        edges: &BTreeMap<T, BTreeSet<T>>,
        color: &mut BTreeMap<T, Color>,
        parent: &mut BTreeMap<T, T>,
    ) -> Option<(T, T)> {
        color.insert(node.clone(), Color::Gray);

        if let Some(neighbors) = edges.get(node) {
            for neighbor in neighbors {
                match color.get(neighbor).copied().unwrap_or(Color::White) {
                    Color::White => {
                        parent.insert(neighbor.clone(), node.clone());
                        if let Some(edge) = Self::dfs(neighbor, edges, color, parent) {
                            return Some(edge);
                        }
                    }
                    Color::Gray => return Some((node.clone(), neighbor.clone())),
                    Color::Black => {}
                }
            }
        }

        color.insert(node.clone(), Color::Black);
        None
    }

    /// `u`'s neighbor `v` is gray (in-progress); walk the DFS parent chain
    /// from `u` back to `v` to recover the cycle, then rotate to the minimum
    /// node and close the loop.
    fn reconstruct_cycle(u: &T, v: &T, parent: &BTreeMap<T, T>) -> String {
        let mut nodes = vec![u.clone()];
        let mut current = u.clone();

        while current != *v {
            current = parent
                .get(&current)
                .expect("DFS parent chain must reach the back-edge target")
                .clone();
            nodes.push(current.clone());
        }

        nodes.reverse(); // now v, ..., u

        let min_pos = nodes
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.cmp(b))
            .map(|(i, _)| i)
            .unwrap_or(0);

        let mut rotated: Vec<T> = Vec::with_capacity(nodes.len() + 1);
        rotated.extend_from_slice(&nodes[min_pos..]);
        rotated.extend_from_slice(&nodes[..min_pos]);
        rotated.push(rotated[0].clone());

        rotated.iter().map(|n| n.to_string()).collect::<Vec<_>>().join(" -> ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(s: &str) -> String {
        s.to_string()
    }

    #[test]
    fn acyclic_graph_has_no_cycle() {
        let mut g: Graph<String> = Graph::new();
        g.add_edge(s("a"), s("b"));
        g.add_edge(s("b"), s("c"));
        assert_eq!(g.find_cycle(), None);
    }

    #[test]
    fn simple_two_node_cycle_is_reported_with_min_node_first_and_closed() {
        let mut g: Graph<String> = Graph::new();
        g.add_edge(s("x.hpp"), s("y.hpp"));
        g.add_edge(s("y.hpp"), s("x.hpp"));
        assert_eq!(g.find_cycle(), Some("x.hpp -> y.hpp -> x.hpp".to_string()));
    }

    #[test]
    fn three_node_cycle_rotates_to_minimum() {
        let mut g: Graph<String> = Graph::new();
        g.add_edge(s("C"), s("A"));
        g.add_edge(s("A"), s("B"));
        g.add_edge(s("B"), s("C"));
        assert_eq!(g.find_cycle(), Some("A -> B -> C -> A".to_string()));
    }

    #[test]
    fn reachable_from_includes_seeds_even_if_absent_or_leaf() {
        let mut g: Graph<String> = Graph::new();
        g.add_edge(s("a"), s("b"));
        let reached = g.reachable_from(vec![s("b"), s("missing")]);
        assert!(reached.contains("b"));
        assert!(reached.contains("missing"));
        assert!(!reached.contains("a"));
    }

    #[test]
    fn reachable_from_follows_forward_edges_transitively() {
        let mut g: Graph<String> = Graph::new();
        g.add_edge(s("a.hpp"), s("b.cpp"));
        g.add_edge(s("a.hpp"), s("main.cpp"));
        g.add_edge(s("unrelated"), s("c.cpp"));
        let reached = g.reachable_from(vec![s("a.hpp")]);
        assert_eq!(reached, ["a.hpp", "b.cpp", "main.cpp"].iter().map(|s| s.to_string()).collect());
    }

    #[test]
    fn add_edge_creates_both_endpoints_as_keys() {
        let mut g: Graph<String> = Graph::new();
        g.add_edge(s("a"), s("b"));
        assert!(g.contains_node(&s("a")));
        assert!(g.contains_node(&s("b")));
    }

    #[test]
    fn add_edge_is_idempotent() {
        let mut g: Graph<String> = Graph::new();
        g.add_edge(s("a"), s("b"));
        g.add_edge(s("a"), s("b"));
        assert_eq!(g.neighbors(&s("a")).unwrap().len(), 1);
    }
}
