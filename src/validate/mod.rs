//! Advisory validation over a graph or a canonical spec.
//!
//! Nothing here mutates or blocks editing; the results feed the canvas
//! warnings and the browser `validate_pipeline` entry point.

pub mod component_rules;
pub mod structural;

use crate::error::CompilerError;
use crate::graph::PipelineGraph;
use crate::reconcile::CanonicalPipelineSpec;

/// Validate the whole graph (node subtypes + structure).
pub fn validate_graph(graph: &PipelineGraph) -> Vec<CompilerError> {
    let mut errors: Vec<CompilerError> = graph
        .nodes()
        .iter()
        .flat_map(component_rules::validate_node)
        .collect();
    errors.extend(structural::validate_structural(graph));
    errors
}

pub fn validate_spec(spec: &CanonicalPipelineSpec) -> Vec<CompilerError> {
    component_rules::validate_components(spec)
}
