//! petgraph-based view of pipeline topology.
//!
//! Built either from a live `PipelineGraph` or from the dependency list of a
//! canonical spec, so the generator can order steps without the canvas.

use std::collections::{HashMap, HashSet};

use petgraph::algo::{is_cyclic_directed, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Bfs;

pub struct DependencyGraph {
    pub graph: DiGraph<String, ()>,
    pub node_indices: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    /// Edges whose endpoints are not in `nodes` are ignored.
    pub fn from_edges<'a>(
        nodes: impl IntoIterator<Item = &'a str>,
        edges: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        let mut graph = DiGraph::new();
        let mut node_indices = HashMap::new();

        for id in nodes {
            if node_indices.contains_key(id) {
                continue;
            }
            let idx = graph.add_node(id.to_string());
            node_indices.insert(id.to_string(), idx);
        }

        for (source, target) in edges {
            if let (Some(&s), Some(&t)) = (node_indices.get(source), node_indices.get(target)) {
                graph.update_edge(s, t, ());
            }
        }

        DependencyGraph {
            graph,
            node_indices,
        }
    }

    pub fn is_cyclic(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// Node ids in dependency order. On a cycle, returns the id of a node on it.
    pub fn topo_order(&self) -> Result<Vec<String>, String> {
        toposort(&self.graph, None)
            .map(|indices| {
                indices
                    .into_iter()
                    .map(|idx| self.graph[idx].clone())
                    .collect()
            })
            .map_err(|cycle| self.graph[cycle.node_id()].clone())
    }

    /// Every node reachable from any of `roots`, roots included.
    pub fn reachable_from<'a>(&self, roots: impl IntoIterator<Item = &'a str>) -> HashSet<String> {
        let mut reachable = HashSet::new();
        for root in roots {
            let Some(&idx) = self.node_indices.get(root) else {
                continue;
            };
            let mut bfs = Bfs::new(&self.graph, idx);
            while let Some(nx) = bfs.next(&self.graph) {
                reachable.insert(self.graph[nx].clone());
            }
        }
        reachable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topo_order_respects_edges() {
        let dg = DependencyGraph::from_edges(
            ["c", "b", "a"],
            [("a", "b"), ("b", "c")],
        );
        assert_eq!(dg.topo_order().unwrap(), vec!["a", "b", "c"]);
        assert!(!dg.is_cyclic());
    }

    #[test]
    fn cycle_is_reported() {
        let dg = DependencyGraph::from_edges(["a", "b"], [("a", "b"), ("b", "a")]);
        assert!(dg.is_cyclic());
        assert!(dg.topo_order().is_err());
    }

    #[test]
    fn unknown_endpoints_are_ignored() {
        let dg = DependencyGraph::from_edges(["a"], [("a", "ghost")]);
        assert_eq!(dg.graph.edge_count(), 0);
    }

    #[test]
    fn reachability() {
        let dg = DependencyGraph::from_edges(["a", "b", "c"], [("a", "b")]);
        let r = dg.reachable_from(["a"]);
        assert!(r.contains("a") && r.contains("b"));
        assert!(!r.contains("c"));
    }
}
