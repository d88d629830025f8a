#![allow(dead_code)]

use std::cell::Cell;

use etl_compiler::error::StoreError;
use etl_compiler::graph::{NodeKind, PipelineGraph, Position};
use etl_compiler::parse;
use etl_compiler::persist::{PipelineRecord, PipelineStore};
use etl_compiler::reconcile::{CanonicalPipelineSpec, ComponentRef};
use etl_compiler::stage::{Deployer, DeploymentConfig, DeploymentReceipt};

// =============================================================================
// Graph / spec builders
// =============================================================================

pub const DEMO_PIPELINE: &str = include_str!("../fixtures/demo_pipeline.json");

/// The demo fixture as a graph: postgresql → filter → dedupe → snowflake,
/// plus an unconnected Glue service.
pub fn demo_graph() -> PipelineGraph {
    parse::parse_and_build(DEMO_PIPELINE).expect("demo fixture should build")
}

/// source → target, built through the editing API.
pub fn linear_graph(source: &str, target: &str) -> PipelineGraph {
    let mut g = PipelineGraph::new();
    let s = g.add_node(NodeKind::Source, source, Position::new(100.0, 100.0));
    let t = g.add_node(NodeKind::Target, target, Position::new(600.0, 100.0));
    g.add_edge(&s, &t).expect("source → target is legal");
    g
}

/// Spec with one source and one target and the given transformations.
pub fn spec_with(source: &str, target: &str, transforms: Vec<ComponentRef>) -> CanonicalPipelineSpec {
    CanonicalPipelineSpec {
        sources: vec![ComponentRef::new(source, "Source")],
        targets: vec![ComponentRef::new(target, "Target")],
        transformations: transforms,
        ..Default::default()
    }
}

pub fn demo_spec() -> CanonicalPipelineSpec {
    spec_with("postgresql", "snowflake", vec![])
}

// =============================================================================
// Collaborator doubles
// =============================================================================

/// Deployer that records how often it ran and succeeds.
#[derive(Default)]
pub struct RecordingDeployer {
    pub calls: Cell<usize>,
}

impl Deployer for RecordingDeployer {
    fn deploy(
        &self,
        pipeline_name: &str,
        _spec: &CanonicalPipelineSpec,
        config: &DeploymentConfig,
    ) -> Result<DeploymentReceipt, String> {
        self.calls.set(self.calls.get() + 1);
        Ok(DeploymentReceipt {
            deployment_id: format!("dep-{}-{}", pipeline_name.to_lowercase(), self.calls.get()),
            provider: config.provider,
            region: config.region.clone(),
            cron: config.schedule.cron().map(str::to_string),
        })
    }
}

/// Deployer that always fails with the given message.
pub struct FailingDeployer(pub &'static str);

impl Deployer for FailingDeployer {
    fn deploy(
        &self,
        _pipeline_name: &str,
        _spec: &CanonicalPipelineSpec,
        _config: &DeploymentConfig,
    ) -> Result<DeploymentReceipt, String> {
        Err(self.0.to_string())
    }
}

/// Store whose every call fails with a backend error.
pub struct OfflineStore;

impl PipelineStore for OfflineStore {
    fn create(&mut self, _record: PipelineRecord) -> Result<String, StoreError> {
        Err(StoreError::Backend("offline".into()))
    }

    fn update(&mut self, _id: &str, _record: PipelineRecord) -> Result<u64, StoreError> {
        Err(StoreError::Backend("offline".into()))
    }

    fn delete(&mut self, _id: &str) -> Result<(), StoreError> {
        Err(StoreError::Backend("offline".into()))
    }

    fn get_all(&self) -> Result<Vec<PipelineRecord>, StoreError> {
        Err(StoreError::Backend("offline".into()))
    }

    fn get_by_id(&self, _id: &str) -> Result<Option<PipelineRecord>, StoreError> {
        Err(StoreError::Backend("offline".into()))
    }
}

// =============================================================================
// Assertions
// =============================================================================

pub fn codes(errors: &[etl_compiler::error::CompilerError]) -> Vec<&str> {
    errors.iter().map(|e| e.code.as_str()).collect()
}
