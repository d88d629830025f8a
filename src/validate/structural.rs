//! Graph-level structural rules (V003–V004).
//!
//! Endpoint rules are enforced by the graph itself on every mutation, so only
//! whole-graph properties are checked here.

use crate::error::CompilerError;
use crate::graph::{NodeKind, PipelineGraph};

pub fn validate_structural(graph: &PipelineGraph) -> Vec<CompilerError> {
    let mut errors = Vec::new();

    v003_no_cycles(graph, &mut errors);
    v004_reachable_from_source(graph, &mut errors);

    errors
}

fn v003_no_cycles(graph: &PipelineGraph, errors: &mut Vec<CompilerError>) {
    if let Err(node_id) = graph.dependency_graph().topo_order() {
        errors.push(CompilerError::validate(
            "V003",
            "Pipeline graph contains a cycle",
            Some(node_id),
        ));
    }
}

fn v004_reachable_from_source(graph: &PipelineGraph, errors: &mut Vec<CompilerError>) {
    let sources: Vec<&str> = graph
        .nodes_of_kind(NodeKind::Source)
        .map(|n| n.id.as_str())
        .collect();
    if sources.is_empty() {
        return;
    }

    let reachable = graph.dependency_graph().reachable_from(sources);
    for node in graph.nodes() {
        // Cloud services describe where the pipeline runs, not a data hop.
        if node.kind == NodeKind::CloudService {
            continue;
        }
        if !reachable.contains(&node.id) {
            errors.push(CompilerError::validate(
                "V004",
                format!("Node '{}' is not reachable from any source", node.id),
                Some(node.id.clone()),
            ));
        }
    }
}
