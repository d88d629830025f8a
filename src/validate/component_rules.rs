//! Per-node and per-component rules.

use std::collections::HashSet;

use crate::error::CompilerError;
use crate::graph::catalog;
use crate::graph::{NodeKind, PipelineNode};
use crate::reconcile::CanonicalPipelineSpec;

/// V001 unknown subtype for the node's kind, V002 empty subtype.
pub fn validate_node(node: &PipelineNode) -> Vec<CompilerError> {
    let mut errors = Vec::new();
    let node_id = Some(node.id.clone());

    if node.subtype.trim().is_empty() {
        errors.push(CompilerError::validate(
            "V002",
            format!("{} node has no subtype", node.kind),
            node_id,
        ));
    } else if !catalog::is_valid_subtype(node.kind, &node.subtype) {
        errors.push(CompilerError::validate(
            "V001",
            format!("'{}' is not a known {} type", node.subtype, node.kind),
            node_id,
        ));
    }

    errors
}

/// C001 empty component type, C002 dependency on an unknown node id.
pub fn validate_components(spec: &CanonicalPipelineSpec) -> Vec<CompilerError> {
    let mut errors = Vec::new();
    let mut known_ids = HashSet::new();

    for kind in NodeKind::ALL {
        for (index, component) in spec.components(kind).iter().enumerate() {
            if let Some(id) = &component.node_id {
                known_ids.insert(id.as_str());
            }
            if component.component_type.trim().is_empty() {
                errors.push(CompilerError::validate(
                    "C001",
                    format!("{} #{} ('{}') has no type", kind, index + 1, component.label),
                    component.node_id.clone(),
                ));
            }
        }
    }

    for dep in &spec.dependencies {
        for end in [&dep.from, &dep.to] {
            if !known_ids.contains(end.as_str()) {
                errors.push(CompilerError::validate(
                    "C002",
                    format!("Dependency '{}' -> '{}' references unknown node '{}'", dep.from, dep.to, end),
                    Some(end.clone()),
                ));
            }
        }
    }

    errors
}
