//! Dual-representation reconciler.
//!
//! A pipeline is authored either on the canvas (`PipelineGraph`) or in the
//! form builder (`FormState`). Both derive the same `CanonicalPipelineSpec`.
//! When the user switches modes, the representation edited last overwrites
//! the other one wholesale; divergent edits are never merged.

pub mod form;
pub mod spec;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub use form::{FormField, FormState, default_row};
pub use spec::{CanonicalPipelineSpec, ComponentRef, Dependency};

use crate::error::CompilerError;
use crate::graph::{NodeKind, PipelineGraph, PipelineNode, Position};

/// Which builder the user is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Visual,
    Form,
}

/// Which representation holds edits the other has not seen yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DirtyRepresentation {
    Graph,
    Form,
    /// Neither side has been edited since the last reconciliation.
    #[default]
    Unknown,
}

/// Partition nodes by kind, preserving creation order. Edges become the
/// dependency list.
pub fn from_graph(graph: &PipelineGraph) -> CanonicalPipelineSpec {
    let mut spec = CanonicalPipelineSpec::default();
    for node in graph.nodes() {
        spec.components_mut(node.kind).push(component_from_node(node));
    }
    spec.dependencies = graph
        .edges()
        .iter()
        .map(|e| Dependency {
            from: e.source.clone(),
            to: e.target.clone(),
        })
        .collect();
    spec
}

fn component_from_node(node: &PipelineNode) -> ComponentRef {
    ComponentRef {
        component_type: node.subtype.clone(),
        label: node.label.clone(),
        config: node.config.clone(),
        node_id: Some(node.id.clone()),
    }
    .normalized(node.kind)
}

/// The form edits canonical rows directly; only blank labels are filled.
pub fn from_form(form: &FormState) -> CanonicalPipelineSpec {
    let mut spec = CanonicalPipelineSpec {
        dependencies: form.dependencies.clone(),
        ..Default::default()
    };
    for kind in NodeKind::ALL {
        *spec.components_mut(kind) = form
            .rows(kind)
            .iter()
            .cloned()
            .map(|c| c.normalized(kind))
            .collect();
    }
    spec
}

pub fn to_form(spec: &CanonicalPipelineSpec) -> FormState {
    FormState {
        sources: spec.sources.clone(),
        transformations: spec.transformations.clone(),
        targets: spec.targets.clone(),
        cloud_services: spec.cloud_services.clone(),
        dependencies: spec.dependencies.clone(),
    }
}

const COLUMN_X: [f64; 4] = [100.0, 350.0, 600.0, 850.0];
const ROW_START_Y: f64 = 100.0;
const ROW_SPACING: f64 = 120.0;

fn column(kind: NodeKind) -> f64 {
    match kind {
        NodeKind::Source => COLUMN_X[0],
        NodeKind::Transform => COLUMN_X[1],
        NodeKind::Target => COLUMN_X[2],
        NodeKind::CloudService => COLUMN_X[3],
    }
}

/// Rebuild a canvas graph from a canonical spec.
///
/// Rows that remember a node id keep it, and keep their position when
/// `layout` has a node with that id. Other rows get fresh ids and are laid
/// out one column per kind. Dependencies are restored when both endpoints
/// survive and the edge is legal; the rest are reported as warnings.
pub fn to_graph(
    spec: &CanonicalPipelineSpec,
    layout: Option<&PipelineGraph>,
) -> (PipelineGraph, Vec<CompilerError>) {
    let mut graph = PipelineGraph::new();
    let mut warnings = Vec::new();
    let mut reserved: HashMap<&str, NodeKind> = HashMap::new();

    // Claim remembered ids first so fresh ids never collide with them.
    for kind in NodeKind::ALL {
        for row in spec.components(kind) {
            if let Some(id) = row.node_id.as_deref() {
                reserved.entry(id).or_insert(kind);
            }
        }
    }

    for kind in NodeKind::ALL {
        for (row_index, row) in spec.components(kind).iter().enumerate() {
            let default_position =
                Position::new(column(kind), ROW_START_Y + row_index as f64 * ROW_SPACING);

            let remembered = row
                .node_id
                .as_deref()
                .filter(|id| !graph.contains_node(id) && reserved.get(id) == Some(&kind));
            let id = match remembered {
                Some(id) => id.to_string(),
                None => {
                    if let Some(dup) = row.node_id.as_deref() {
                        warnings.push(CompilerError::reconcile(
                            "R001",
                            format!("Node id '{}' is used by more than one row; assigning a new id", dup),
                            Some(dup.to_string()),
                        ));
                    }
                    loop {
                        let fresh = graph.reserve_node_id(kind);
                        if !reserved.contains_key(fresh.as_str()) {
                            break fresh;
                        }
                    }
                }
            };

            let position = layout
                .and_then(|g| g.node(&id))
                .filter(|n| n.kind == kind)
                .map(|n| n.position)
                .unwrap_or(default_position);

            let row = row.clone().normalized(kind);
            let inserted = graph.insert_node(PipelineNode {
                id,
                kind,
                subtype: row.component_type,
                label: row.label,
                config: row.config,
                position,
            });
            debug_assert!(inserted, "reconciled node ids are unique");
        }
    }

    for dep in &spec.dependencies {
        if let Err(e) = graph.add_edge(&dep.from, &dep.to) {
            warnings.push(CompilerError::reconcile(
                "R002",
                format!("Dropped dependency: {}", e),
                Some(dep.from.clone()),
            ));
        }
    }

    (graph, warnings)
}
