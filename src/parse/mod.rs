//! Parse phase: canvas JSON → pipeline graph.

pub mod types;

pub use types::*;

use crate::error::CompilerError;
use crate::graph::PipelineGraph;

/// Deserialize a `workflow_data` JSON string.
pub fn parse(json: &str) -> Result<WorkflowData, Vec<CompilerError>> {
    serde_json::from_str::<WorkflowData>(json).map_err(|e| {
        vec![CompilerError::parse(
            "P001",
            format!("Failed to parse workflow JSON: {}", e),
        )]
    })
}

/// Rebuild a graph from wire data, applying the graph invariants.
pub fn build_graph(data: WorkflowData) -> Result<PipelineGraph, Vec<CompilerError>> {
    let nodes = data.nodes.into_iter().map(WireNode::into_node).collect();
    let edges = data.edges.into_iter().map(WireEdge::into_edge).collect();
    PipelineGraph::from_parts(nodes, edges)
}

/// Parse JSON and build the graph in one step.
pub fn parse_and_build(json: &str) -> Result<PipelineGraph, Vec<CompilerError>> {
    build_graph(parse(json)?)
}

pub fn to_workflow_data(graph: &PipelineGraph) -> WorkflowData {
    WorkflowData {
        nodes: graph.nodes().iter().map(WireNode::from).collect(),
        edges: graph.edges().iter().map(WireEdge::from).collect(),
    }
}

pub fn to_workflow_json(graph: &PipelineGraph) -> String {
    // Plain structs with string keys cannot fail to serialize.
    serde_json::to_string_pretty(&to_workflow_data(graph)).unwrap_or_default()
}
