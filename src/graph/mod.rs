//! Pipeline graph model: the node/edge DAG edited on the canvas.
//!
//! Every mutation keeps the graph structurally valid: edge endpoints always
//! exist, targets never originate edges, sources never receive them, and
//! removing a node removes its edges. Rejected mutations leave the graph as it
//! was.

pub mod catalog;
pub mod dependency;
pub mod types;

use std::collections::{BTreeMap, HashSet};

pub use dependency::DependencyGraph;
pub use types::*;

use crate::error::{CompilerError, EndpointReason, GraphError};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PipelineGraph {
    /// Nodes in creation order.
    nodes: Vec<PipelineNode>,
    edges: Vec<PipelineEdge>,
    next_seq: u64,
}

impl PipelineGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a graph from stored nodes and edges, enforcing the same
    /// invariants as interactive editing.
    pub fn from_parts(
        nodes: Vec<PipelineNode>,
        edges: Vec<PipelineEdge>,
    ) -> Result<Self, Vec<CompilerError>> {
        let mut graph = PipelineGraph::new();
        let mut errors = Vec::new();

        for node in nodes {
            if graph.contains_node(&node.id) {
                errors.push(CompilerError::parse(
                    "P003",
                    format!("Duplicate node id '{}'", node.id),
                ));
                continue;
            }
            graph.nodes.push(node);
        }
        graph.next_seq = graph.nodes.len() as u64 + 1;

        for edge in edges {
            if let Err(reason) = graph.check_endpoints(&edge.source, &edge.target) {
                errors.push(CompilerError::parse(
                    "P002",
                    format!(
                        "Edge '{}' from '{}' to '{}' is invalid: {}",
                        edge.id, edge.source, edge.target, reason
                    ),
                ));
                continue;
            }
            if graph.find_edge(&edge.source, &edge.target).is_some() {
                continue;
            }
            if graph.edges.iter().any(|e| e.id == edge.id) {
                errors.push(CompilerError::parse(
                    "P006",
                    format!(
                        "Duplicate edge id '{}' (from '{}' to '{}')",
                        edge.id, edge.source, edge.target
                    ),
                ));
                continue;
            }
            graph.edges.push(edge);
        }

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(graph)
    }

    pub fn nodes(&self) -> &[PipelineNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[PipelineEdge] {
        &self.edges
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&PipelineNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &PipelineNode> {
        self.nodes.iter().filter(move |n| n.kind == kind)
    }

    /// Ids of nodes with an edge into `id`.
    pub fn incoming(&self, id: &str) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|e| e.target == id)
            .map(|e| e.source.as_str())
            .collect()
    }

    /// Ids of nodes `id` has an edge to.
    pub fn outgoing(&self, id: &str) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|e| e.source == id)
            .map(|e| e.target.as_str())
            .collect()
    }

    pub fn find_edge(&self, source: &str, target: &str) -> Option<&PipelineEdge> {
        self.edges
            .iter()
            .find(|e| e.source == source && e.target == target)
    }

    /// Place a new node. Always succeeds; subtype membership is checked by
    /// validation, not here.
    pub fn add_node(&mut self, kind: NodeKind, subtype: &str, position: Position) -> NodeId {
        let id = self.fresh_node_id(kind);
        let label = catalog::default_label(kind, subtype).to_string();
        tracing::debug!(node_id = %id, %kind, subtype, "adding node");
        self.nodes.push(PipelineNode {
            id: id.clone(),
            kind,
            subtype: subtype.to_string(),
            label,
            config: BTreeMap::new(),
            position,
        });
        id
    }

    /// Insert a node as-is, keeping its id. Used when rebuilding a graph from
    /// the form. Returns false, leaving the graph unchanged, when the id is
    /// already taken.
    pub(crate) fn insert_node(&mut self, node: PipelineNode) -> bool {
        if self.contains_node(&node.id) {
            return false;
        }
        self.nodes.push(node);
        true
    }

    /// Fresh id for a node of `kind`, reserved against later `add_node` calls.
    pub(crate) fn reserve_node_id(&mut self, kind: NodeKind) -> NodeId {
        self.fresh_node_id(kind)
    }

    /// Connect two nodes. Connecting an already connected pair returns the
    /// existing edge id.
    pub fn add_edge(&mut self, source: &str, target: &str) -> Result<EdgeId, GraphError> {
        if let Err(reason) = self.check_endpoints(source, target) {
            tracing::debug!(source, target, %reason, "rejecting edge");
            return Err(GraphError::InvalidEndpoint {
                source_id: source.to_string(),
                target_id: target.to_string(),
                reason,
            });
        }
        if let Some(existing) = self.find_edge(source, target) {
            return Ok(existing.id.clone());
        }

        let id = self.fresh_edge_id(source, target);
        self.edges.push(PipelineEdge {
            id: id.clone(),
            source: source.to_string(),
            target: target.to_string(),
        });
        Ok(id)
    }

    pub fn remove_edge(&mut self, edge_id: &str) -> Option<PipelineEdge> {
        let idx = self.edges.iter().position(|e| e.id == edge_id)?;
        Some(self.edges.remove(idx))
    }

    /// Remove a node together with every edge that touches it.
    pub fn remove_node(&mut self, id: &str) -> Option<PipelineNode> {
        let idx = self.nodes.iter().position(|n| n.id == id)?;
        let node = self.nodes.remove(idx);
        let before = self.edges.len();
        self.edges.retain(|e| e.source != id && e.target != id);
        tracing::debug!(
            node_id = id,
            edges_removed = before - self.edges.len(),
            "removed node"
        );
        Some(node)
    }

    /// Merge one config entry into a node. Values are not interpreted.
    pub fn update_node_config(
        &mut self,
        id: &str,
        key: &str,
        value: &str,
    ) -> Result<(), GraphError> {
        let node = self.node_mut(id)?;
        node.config.insert(key.to_string(), value.to_string());
        Ok(())
    }

    pub fn rename_node(&mut self, id: &str, label: &str) -> Result<(), GraphError> {
        self.node_mut(id)?.label = label.to_string();
        Ok(())
    }

    pub fn move_node(&mut self, id: &str, position: Position) -> Result<(), GraphError> {
        self.node_mut(id)?.position = position;
        Ok(())
    }

    /// Petgraph view of the current topology.
    pub fn dependency_graph(&self) -> DependencyGraph {
        DependencyGraph::from_edges(
            self.nodes.iter().map(|n| n.id.as_str()),
            self.edges.iter().map(|e| (e.source.as_str(), e.target.as_str())),
        )
    }

    fn node_mut(&mut self, id: &str) -> Result<&mut PipelineNode, GraphError> {
        self.nodes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| GraphError::UnknownNode(id.to_string()))
    }

    fn check_endpoints(&self, source: &str, target: &str) -> Result<(), EndpointReason> {
        let Some(from) = self.node(source) else {
            return Err(EndpointReason::UnknownSource);
        };
        let Some(to) = self.node(target) else {
            return Err(EndpointReason::UnknownTarget);
        };
        if source == target {
            return Err(EndpointReason::SelfLoop);
        }
        if from.kind == NodeKind::Target {
            return Err(EndpointReason::TargetAsOrigin);
        }
        if to.kind == NodeKind::Source {
            return Err(EndpointReason::SourceAsDestination);
        }
        Ok(())
    }

    fn fresh_node_id(&mut self, kind: NodeKind) -> NodeId {
        loop {
            self.next_seq += 1;
            let candidate = format!("{}-{}", kind.as_str(), self.next_seq);
            if !self.contains_node(&candidate) {
                return candidate;
            }
        }
    }

    fn fresh_edge_id(&self, source: &str, target: &str) -> EdgeId {
        let taken: HashSet<&str> = self.edges.iter().map(|e| e.id.as_str()).collect();
        let base = format!("e-{}-{}", source, target);
        if !taken.contains(base.as_str()) {
            return base;
        }
        (1..)
            .map(|n| format!("{}-{}", base, n))
            .find(|candidate| !taken.contains(candidate.as_str()))
            .unwrap_or(base)
    }
}
