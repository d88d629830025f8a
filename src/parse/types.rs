//! Serde types for the canvas `workflow_data` JSON.
//!
//! Mirrors what the canvas stores per node: a `type` tag naming the kind and a
//! `data` object whose subtype key depends on that kind (`sourceType`,
//! `transformType`, `targetType`, `serviceType`). Unknown keys the canvas adds
//! (sizes, selection flags, handles) are ignored.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::graph::catalog;
use crate::graph::{NodeKind, PipelineEdge, PipelineNode, Position};

// =============================================================================
// TOP-LEVEL
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowData {
    #[serde(default)]
    pub nodes: Vec<WireNode>,
    #[serde(default)]
    pub edges: Vec<WireEdge>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireEdge {
    #[serde(default)]
    pub id: String,
    pub source: String,
    pub target: String,
}

// =============================================================================
// NODES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WireNode {
    #[serde(rename = "source")]
    Source(NodeBase<SourceData>),
    #[serde(rename = "transform")]
    Transform(NodeBase<TransformData>),
    #[serde(rename = "target")]
    Target(NodeBase<TargetData>),
    #[serde(rename = "cloudService")]
    CloudService(NodeBase<ServiceData>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeBase<D> {
    pub id: String,
    #[serde(default)]
    pub position: Position,
    pub data: D,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceData {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub source_type: String,
    #[serde(default, deserialize_with = "string_map")]
    pub config: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformData {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub transform_type: String,
    #[serde(default, deserialize_with = "string_map")]
    pub config: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetData {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub target_type: String,
    #[serde(default, deserialize_with = "string_map")]
    pub config: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceData {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub service_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, deserialize_with = "string_map")]
    pub config: BTreeMap<String, String>,
}

/// Config values typed into the canvas may arrive as numbers or booleans;
/// the model keeps them as text.
fn string_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, serde_json::Value>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(k, v)| match v {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some((k, s)),
            other => Some((k, other.to_string())),
        })
        .collect())
}

// =============================================================================
// CONVERSIONS
// =============================================================================

impl WireNode {
    pub fn id(&self) -> &str {
        match self {
            WireNode::Source(n) => &n.id,
            WireNode::Transform(n) => &n.id,
            WireNode::Target(n) => &n.id,
            WireNode::CloudService(n) => &n.id,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            WireNode::Source(_) => NodeKind::Source,
            WireNode::Transform(_) => NodeKind::Transform,
            WireNode::Target(_) => NodeKind::Target,
            WireNode::CloudService(_) => NodeKind::CloudService,
        }
    }

    pub fn into_node(self) -> PipelineNode {
        let kind = self.kind();
        let (id, position, label, subtype, config) = match self {
            WireNode::Source(n) => (n.id, n.position, n.data.label, n.data.source_type, n.data.config),
            WireNode::Transform(n) => {
                (n.id, n.position, n.data.label, n.data.transform_type, n.data.config)
            }
            WireNode::Target(n) => (n.id, n.position, n.data.label, n.data.target_type, n.data.config),
            WireNode::CloudService(n) => {
                (n.id, n.position, n.data.label, n.data.service_type, n.data.config)
            }
        };
        let label = if label.trim().is_empty() {
            catalog::default_label(kind, &subtype).to_string()
        } else {
            label
        };
        PipelineNode {
            id,
            kind,
            subtype,
            label,
            config,
            position,
        }
    }
}

impl From<&PipelineNode> for WireNode {
    fn from(node: &PipelineNode) -> Self {
        let id = node.id.clone();
        let position = node.position;
        let label = node.label.clone();
        let config = node.config.clone();
        match node.kind {
            NodeKind::Source => WireNode::Source(NodeBase {
                id,
                position,
                data: SourceData {
                    label,
                    source_type: node.subtype.clone(),
                    config,
                },
            }),
            NodeKind::Transform => WireNode::Transform(NodeBase {
                id,
                position,
                data: TransformData {
                    label,
                    transform_type: node.subtype.clone(),
                    config,
                },
            }),
            NodeKind::Target => WireNode::Target(NodeBase {
                id,
                position,
                data: TargetData {
                    label,
                    target_type: node.subtype.clone(),
                    config,
                },
            }),
            NodeKind::CloudService => WireNode::CloudService(NodeBase {
                id,
                position,
                data: ServiceData {
                    label,
                    service_type: node.subtype.clone(),
                    provider: catalog::lookup(NodeKind::CloudService, &node.subtype)
                        .and_then(|e| e.provider)
                        .map(str::to_string),
                    config,
                },
            }),
        }
    }
}

impl WireEdge {
    pub fn into_edge(self) -> PipelineEdge {
        let id = if self.id.is_empty() {
            format!("e-{}-{}", self.source, self.target)
        } else {
            self.id
        };
        PipelineEdge {
            id,
            source: self.source,
            target: self.target,
        }
    }
}

impl From<&PipelineEdge> for WireEdge {
    fn from(edge: &PipelineEdge) -> Self {
        WireEdge {
            id: edge.id.clone(),
            source: edge.source.clone(),
            target: edge.target.clone(),
        }
    }
}
