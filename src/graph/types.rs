//! Node and edge types of the pipeline canvas.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub type NodeId = String;
pub type EdgeId = String;

/// The four families of canvas nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    Source,
    Transform,
    Target,
    CloudService,
}

impl NodeKind {
    pub const ALL: [NodeKind; 4] = [
        NodeKind::Source,
        NodeKind::Transform,
        NodeKind::Target,
        NodeKind::CloudService,
    ];

    /// Wire name, also used as the node id prefix.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Source => "source",
            NodeKind::Transform => "transform",
            NodeKind::Target => "target",
            NodeKind::CloudService => "cloudService",
        }
    }

    /// Label given to a component whose label is missing or blank.
    pub fn placeholder_label(&self) -> &'static str {
        match self {
            NodeKind::Source => "New Source",
            NodeKind::Transform => "New Transformation",
            NodeKind::Target => "New Target",
            NodeKind::CloudService => "New Cloud Service",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "source" => Some(NodeKind::Source),
            "transform" => Some(NodeKind::Transform),
            "target" => Some(NodeKind::Target),
            "cloudService" => Some(NodeKind::CloudService),
            _ => None,
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineNode {
    pub id: NodeId,
    pub kind: NodeKind,
    /// Connector or operation id, e.g. `postgresql`, `filter`, `glue`.
    pub subtype: String,
    pub label: String,
    pub config: BTreeMap<String, String>,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineEdge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
}
