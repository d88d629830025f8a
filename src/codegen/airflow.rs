//! Airflow DAG export and the plain-text flow preview.
//!
//! One task per node in creation order; `depends_on` lists the sources of
//! the node's incoming edges.

use std::collections::{BTreeMap, HashSet};

use chrono::{NaiveDate, Utc};
use serde::Serialize;

use super::snake_name;
use crate::error::CompilerError;
use crate::graph::{NodeKind, PipelineGraph, PipelineNode};

/// Task keys a node config entry may not shadow.
const RESERVED_TASK_KEYS: &[&str] = &["task_id", "operator", "job_arguments", "depends_on"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirflowDag {
    pub dag_id: String,
    pub description: String,
    pub schedule_interval: Option<String>,
    pub start_date: NaiveDate,
    pub catchup: bool,
    pub default_args: DefaultArgs,
    pub tasks: Vec<AirflowTask>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefaultArgs {
    pub owner: String,
    pub retries: u32,
    pub retry_delay: String,
}

impl Default for DefaultArgs {
    fn default() -> Self {
        DefaultArgs {
            owner: "icecube".into(),
            retries: 1,
            retry_delay: "5m".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirflowTask {
    pub task_id: String,
    pub operator: &'static str,
    /// Non-empty node config entries, inlined next to the fixed keys.
    #[serde(flatten)]
    pub config: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub job_arguments: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
}

impl AirflowTask {
    fn from_node(graph: &PipelineGraph, node: &PipelineNode) -> Self {
        let mut config = BTreeMap::new();
        let mut job_args = BTreeMap::new();
        for (key, value) in &node.config {
            if value.is_empty() {
                continue;
            }
            match key.as_str() {
                "jobParameters" => job_args = job_arguments(value),
                "useGitRepo" => {
                    config.insert("use_git_repo".to_string(), value.clone());
                }
                k if RESERVED_TASK_KEYS.contains(&k) => {
                    tracing::debug!(node_id = %node.id, key = k, "dropping reserved config key from DAG task");
                }
                _ => {
                    config.insert(key.clone(), value.clone());
                }
            }
        }
        AirflowTask {
            task_id: node.id.clone(),
            operator: operator_for(node),
            config,
            job_arguments: job_args,
            depends_on: graph.incoming(&node.id).into_iter().map(str::to_string).collect(),
        }
    }
}

impl AirflowDag {
    pub fn to_yaml(&self) -> Result<String, CompilerError> {
        serde_yaml::to_string(self).map_err(|e| {
            CompilerError::codegen("G001", format!("Failed to serialize DAG '{}': {}", self.dag_id, e))
        })
    }
}

pub fn airflow_dag(graph: &PipelineGraph, pipeline_name: &str, start_date: NaiveDate) -> AirflowDag {
    AirflowDag {
        dag_id: snake_name(pipeline_name),
        description: format!("Auto-generated pipeline: {}", pipeline_name),
        schedule_interval: None,
        start_date,
        catchup: false,
        default_args: DefaultArgs::default(),
        tasks: graph
            .nodes()
            .iter()
            .map(|node| AirflowTask::from_node(graph, node))
            .collect(),
    }
}

/// DAG YAML dated today (UTC).
pub fn airflow_dag_yaml(graph: &PipelineGraph, pipeline_name: &str) -> Result<String, CompilerError> {
    airflow_dag_yaml_at(graph, pipeline_name, Utc::now().date_naive())
}

pub fn airflow_dag_yaml_at(
    graph: &PipelineGraph,
    pipeline_name: &str,
    start_date: NaiveDate,
) -> Result<String, CompilerError> {
    airflow_dag(graph, pipeline_name, start_date).to_yaml()
}

/// Operator class for a node, `BaseOperator` when nothing specific fits.
pub fn operator_for(node: &PipelineNode) -> &'static str {
    match (node.kind, node.subtype.as_str()) {
        (NodeKind::Source, "s3") => "S3ToDataFrameOperator",
        (NodeKind::Source, "gcs") => "GCSToDataFrameOperator",
        (NodeKind::Source, "azure-blob") => "BlobToDataFrameOperator",
        (NodeKind::Source, "postgresql" | "mysql") => "RDSToDataFrameOperator",
        (NodeKind::Source, "redshift") => "RedshiftToDataFrameOperator",
        (NodeKind::Source, "bigquery") => "BigQueryToDataFrameOperator",
        (NodeKind::Target, "s3") => "DataFrameToS3Operator",
        (NodeKind::Target, "gcs") => "DataFrameToGCSOperator",
        (NodeKind::Target, "azure-blob") => "DataFrameToBlobOperator",
        (NodeKind::Target, "redshift") => "DataFrameToRedshiftOperator",
        (NodeKind::Target, "bigquery") => "DataFrameToBigQueryOperator",
        (NodeKind::Transform, "filter") => "FilterOperator",
        (NodeKind::Transform, "aggregate") => "AggregateOperator",
        (NodeKind::Transform, "join") => "JoinOperator",
        (NodeKind::Transform, "map") => "SelectOperator",
        (NodeKind::CloudService, "glue") => "GlueJobOperator",
        (NodeKind::CloudService, "data-factory") => "DataFactoryPipelineRunOperator",
        (NodeKind::CloudService, "dataflow") => "DataflowTemplatedJobStartOperator",
        _ => "BaseOperator",
    }
}

/// `jobParameters` lines of the form `--k=v`; anything else is ignored.
fn job_arguments(raw: &str) -> BTreeMap<String, String> {
    raw.lines()
        .map(str::trim)
        .filter_map(|line| line.strip_prefix("--"))
        .filter_map(|rest| {
            let mut parts = rest.split('=');
            match (parts.next(), parts.next(), parts.next()) {
                (Some(k), Some(v), None) => Some((format!("--{}", k.trim()), v.trim().to_string())),
                _ => None,
            }
        })
        .collect()
}

/// Indented tree of node labels starting from nodes with no incoming edge.
/// A node reached a second time is marked `(see above)` and not expanded.
pub fn pipeline_preview(graph: &PipelineGraph) -> String {
    if graph.is_empty() {
        return "No nodes in pipeline".to_string();
    }
    let mut out = String::from("Pipeline Flow:\n\n");
    let mut seen = HashSet::new();
    for root in graph.nodes().iter().filter(|n| graph.incoming(&n.id).is_empty()) {
        preview_node(graph, root, 0, &mut seen, &mut out);
    }
    // Nodes only reachable through a cycle.
    for node in graph.nodes() {
        if !seen.contains(node.id.as_str()) {
            preview_node(graph, node, 0, &mut seen, &mut out);
        }
    }
    out
}

fn preview_node<'a>(
    graph: &'a PipelineGraph,
    node: &'a PipelineNode,
    depth: usize,
    seen: &mut HashSet<&'a str>,
    out: &mut String,
) {
    out.push_str(&"  ".repeat(depth));
    out.push_str("└─ ");
    out.push_str(&node.label);
    if !seen.insert(node.id.as_str()) {
        out.push_str(" (see above)\n");
        return;
    }
    out.push('\n');
    for child in graph.outgoing(&node.id) {
        if let Some(child) = graph.node(child) {
            preview_node(graph, child, depth + 1, seen, out);
        }
    }
}
