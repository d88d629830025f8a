//! The stored pipeline record and its JSON shape.
//!
//! In memory a record holds the graph and the canonical spec side by side.
//! On the wire the graph travels as `workflow_data` and the spec is spread
//! over flat top-level arrays.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::graph::PipelineGraph;
use crate::parse::{self, WorkflowData};
use crate::reconcile::{CanonicalPipelineSpec, ComponentRef, Dependency, Mode};
use crate::stage::Stage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStatus {
    #[default]
    Draft,
    Active,
    Paused,
    Failed,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PersistedPipeline", into = "PersistedPipeline")]
pub struct PipelineRecord {
    /// Empty until the store assigns one.
    pub id: String,
    pub name: String,
    pub description: String,
    pub mode: Mode,
    pub graph: PipelineGraph,
    pub spec: CanonicalPipelineSpec,
    pub stage: Stage,
    pub status: PipelineStatus,
    /// Starts at 1 on create and increases by one on every update.
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_run_at: Option<DateTime<Utc>>,
}

impl PipelineRecord {
    /// A fresh, unsaved draft.
    pub fn draft(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            name: name.into(),
            description: String::new(),
            mode: Mode::Visual,
            graph: PipelineGraph::new(),
            spec: CanonicalPipelineSpec::default(),
            stage: Stage::Configure,
            status: PipelineStatus::Draft,
            version: 0,
            created_at: now,
            updated_at: now,
            last_run_at: None,
        }
    }

    pub fn is_persisted(&self) -> bool {
        !self.id.is_empty()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Wire shape of a stored pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedPipeline {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub mode: Mode,
    /// Empty when `mode` is `form`.
    #[serde(default)]
    pub workflow_data: WorkflowData,
    #[serde(default)]
    pub sources: Vec<ComponentRef>,
    #[serde(default)]
    pub targets: Vec<ComponentRef>,
    #[serde(default)]
    pub transformations: Vec<ComponentRef>,
    #[serde(default)]
    pub cloud_services: Vec<ComponentRef>,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
    #[serde(default)]
    pub stage: Stage,
    #[serde(default)]
    pub status: PipelineStatus,
    #[serde(default)]
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub last_run_at: Option<DateTime<Utc>>,
}

impl From<PipelineRecord> for PersistedPipeline {
    fn from(r: PipelineRecord) -> Self {
        let workflow_data = match r.mode {
            Mode::Visual => parse::to_workflow_data(&r.graph),
            Mode::Form => WorkflowData::default(),
        };
        let CanonicalPipelineSpec {
            sources,
            transformations,
            targets,
            cloud_services,
            dependencies,
        } = r.spec;
        Self {
            id: r.id,
            name: r.name,
            description: r.description,
            mode: r.mode,
            workflow_data,
            sources,
            targets,
            transformations,
            cloud_services,
            dependencies,
            stage: r.stage,
            status: r.status,
            version: r.version,
            created_at: r.created_at,
            updated_at: r.updated_at,
            last_run_at: r.last_run_at,
        }
    }
}

impl TryFrom<PersistedPipeline> for PipelineRecord {
    type Error = String;

    fn try_from(p: PersistedPipeline) -> Result<Self, Self::Error> {
        let graph = parse::build_graph(p.workflow_data).map_err(|errors| {
            errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ")
        })?;
        Ok(Self {
            id: p.id,
            name: p.name,
            description: p.description,
            mode: p.mode,
            graph,
            spec: CanonicalPipelineSpec {
                sources: p.sources,
                transformations: p.transformations,
                targets: p.targets,
                cloud_services: p.cloud_services,
                dependencies: p.dependencies,
            },
            stage: p.stage,
            status: p.status,
            version: p.version,
            created_at: p.created_at,
            updated_at: p.updated_at,
            last_run_at: p.last_run_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{NodeKind, Position};
    use crate::reconcile;

    fn visual_record() -> PipelineRecord {
        let mut r = PipelineRecord::draft("Demo");
        let s = r.graph.add_node(NodeKind::Source, "postgresql", Position::new(100.0, 100.0));
        let t = r.graph.add_node(NodeKind::Target, "snowflake", Position::new(600.0, 100.0));
        r.graph.add_edge(&s, &t).unwrap();
        r.spec = reconcile::from_graph(&r.graph);
        r
    }

    #[test]
    fn wire_keys_are_snake_case() {
        let json: serde_json::Value = serde_json::from_str(&visual_record().to_json().unwrap()).unwrap();
        for key in ["workflow_data", "cloud_services", "created_at", "last_run_at"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert_eq!(json["mode"], "visual");
        assert_eq!(json["stage"], "configure");
        assert_eq!(json["status"], "draft");
        assert_eq!(json["workflow_data"]["nodes"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn form_mode_empties_workflow_data() {
        let mut r = visual_record();
        r.mode = Mode::Form;
        let json: serde_json::Value = serde_json::from_str(&r.to_json().unwrap()).unwrap();
        assert!(json["workflow_data"]["nodes"].as_array().unwrap().is_empty());
        assert_eq!(json["sources"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn json_round_trip_keeps_graph_and_spec() {
        let r = visual_record();
        let back = PipelineRecord::from_json(&r.to_json().unwrap()).unwrap();
        assert_eq!(back.graph.nodes(), r.graph.nodes());
        assert_eq!(back.graph.edges(), r.graph.edges());
        assert_eq!(back.spec, r.spec);
        assert_eq!(back.created_at, r.created_at);
    }

    #[test]
    fn invalid_stored_graph_is_rejected() {
        let json = r#"{
            "name": "Broken",
            "workflow_data": {
                "nodes": [{"id": "t", "type": "target", "position": {"x": 0, "y": 0},
                           "data": {"label": "T", "targetType": "s3"}}],
                "edges": [{"id": "e", "source": "t", "target": "missing"}]
            },
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        }"#;
        let err = PipelineRecord::from_json(json).unwrap_err();
        assert!(err.to_string().contains("P002"));
    }
}
