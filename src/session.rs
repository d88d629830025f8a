//! One user's editing session over one pipeline.
//!
//! The session owns both representations, the dirty tag, the stage
//! controller and the save bookkeeping. Every edit goes through it so the
//! dirty tag always names the side holding unseen changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::codegen::{self, Dialect, GeneratedCode, GenerationRequest, GeneratorOptions};
use crate::error::{CompilerError, SessionError, StoreError};
use crate::graph::{EdgeId, NodeId, NodeKind, PipelineGraph, PipelineNode, Position};
use crate::persist::{PipelineRecord, PipelineStatus, PipelineStore};
use crate::reconcile::{
    self, CanonicalPipelineSpec, ComponentRef, DirtyRepresentation, FormField, FormState, Mode,
};
use crate::stage::{Deployer, DeploymentConfig, DeploymentReceipt, Stage, StageAction, StageController};

/// What started a save. Both kinds take the same path; the trigger is only
/// recorded in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveTrigger {
    Manual,
    Auto,
}

#[derive(Debug, Clone)]
pub struct AuthoringSession {
    name: String,
    description: String,
    mode: Mode,
    graph: PipelineGraph,
    form: FormState,
    dirty: DirtyRepresentation,
    stage: StageController,
    status: PipelineStatus,
    record_id: Option<String>,
    version: u64,
    created_at: DateTime<Utc>,
    last_run_at: Option<DateTime<Utc>>,
    generated: Option<GeneratedCode>,
    options: GeneratorOptions,
    save_in_flight: bool,
}

impl AuthoringSession {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            mode: Mode::Visual,
            graph: PipelineGraph::new(),
            form: FormState::default(),
            dirty: DirtyRepresentation::Unknown,
            stage: StageController::new(),
            status: PipelineStatus::Draft,
            record_id: None,
            version: 0,
            created_at: Utc::now(),
            last_run_at: None,
            generated: None,
            options: GeneratorOptions::default(),
            save_in_flight: false,
        }
    }

    /// Restore a stored pipeline. The representation matching the stored
    /// mode is authoritative; the other one is rebuilt on the next switch.
    pub fn open(record: PipelineRecord) -> Self {
        let (graph, form, dirty) = match record.mode {
            Mode::Visual => (
                record.graph,
                reconcile::to_form(&record.spec),
                DirtyRepresentation::Graph,
            ),
            Mode::Form => (
                PipelineGraph::new(),
                reconcile::to_form(&record.spec),
                DirtyRepresentation::Form,
            ),
        };
        tracing::debug!(pipeline_id = %record.id, mode = ?record.mode, "opened pipeline");
        Self {
            name: record.name,
            description: record.description,
            mode: record.mode,
            graph,
            form,
            dirty,
            stage: StageController::resume(record.stage),
            status: record.status,
            record_id: Some(record.id).filter(|id| !id.is_empty()),
            version: record.version,
            created_at: record.created_at,
            last_run_at: record.last_run_at,
            generated: None,
            options: GeneratorOptions::default(),
            save_in_flight: false,
        }
    }

    pub fn with_options(mut self, options: GeneratorOptions) -> Self {
        self.options = options;
        self
    }

    // -- accessors ----------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn graph(&self) -> &PipelineGraph {
        &self.graph
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn dirty(&self) -> DirtyRepresentation {
        self.dirty
    }

    pub fn stage(&self) -> Stage {
        self.stage.stage()
    }

    pub fn status(&self) -> PipelineStatus {
        self.status
    }

    pub fn record_id(&self) -> Option<&str> {
        self.record_id.as_deref()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn generated_code(&self) -> Option<&GeneratedCode> {
        self.generated.as_ref()
    }

    pub fn is_saving(&self) -> bool {
        self.save_in_flight
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn set_status(&mut self, status: PipelineStatus) {
        self.status = status;
    }

    // -- canvas edits -------------------------------------------------------

    pub fn add_node(&mut self, kind: NodeKind, subtype: &str, position: Position) -> NodeId {
        let id = self.graph.add_node(kind, subtype, position);
        self.dirty = DirtyRepresentation::Graph;
        id
    }

    pub fn add_edge(&mut self, source: &str, target: &str) -> Result<EdgeId, SessionError> {
        let id = self.graph.add_edge(source, target)?;
        self.dirty = DirtyRepresentation::Graph;
        Ok(id)
    }

    pub fn remove_edge(&mut self, edge_id: &str) -> bool {
        let removed = self.graph.remove_edge(edge_id).is_some();
        if removed {
            self.dirty = DirtyRepresentation::Graph;
        }
        removed
    }

    pub fn remove_node(&mut self, id: &str) -> Option<PipelineNode> {
        let removed = self.graph.remove_node(id);
        if removed.is_some() {
            self.dirty = DirtyRepresentation::Graph;
        }
        removed
    }

    pub fn update_node_config(&mut self, id: &str, key: &str, value: &str) -> Result<(), SessionError> {
        self.graph.update_node_config(id, key, value)?;
        self.dirty = DirtyRepresentation::Graph;
        Ok(())
    }

    pub fn rename_node(&mut self, id: &str, label: &str) -> Result<(), SessionError> {
        self.graph.rename_node(id, label)?;
        self.dirty = DirtyRepresentation::Graph;
        Ok(())
    }

    /// Moving a node changes layout only; the spec is unaffected, so the
    /// dirty tag is left alone.
    pub fn move_node(&mut self, id: &str, position: Position) -> Result<(), SessionError> {
        self.graph.move_node(id, position)?;
        Ok(())
    }

    // -- form edits ---------------------------------------------------------

    pub fn add_row(&mut self, kind: NodeKind) -> usize {
        let index = self.form.add_row(kind);
        self.dirty = DirtyRepresentation::Form;
        index
    }

    pub fn remove_row(&mut self, kind: NodeKind, index: usize) -> Result<ComponentRef, SessionError> {
        let row = self.form.remove_row(kind, index)?;
        self.dirty = DirtyRepresentation::Form;
        Ok(row)
    }

    pub fn update_row(
        &mut self,
        kind: NodeKind,
        index: usize,
        field: &FormField,
        value: &str,
    ) -> Result<(), SessionError> {
        self.form.update_row(kind, index, field, value)?;
        self.dirty = DirtyRepresentation::Form;
        Ok(())
    }

    // -- reconciliation -----------------------------------------------------

    /// Switch builders. The dirty side overwrites the other one; with no
    /// unseen edits only the mode changes. Returns reconcile warnings.
    pub fn switch_mode(&mut self, mode: Mode) -> Vec<CompilerError> {
        if mode == self.mode {
            return Vec::new();
        }
        let warnings = self.sync();
        tracing::debug!(from = ?self.mode, to = ?mode, warnings = warnings.len(), "switching mode");
        self.mode = mode;
        warnings
    }

    fn sync(&mut self) -> Vec<CompilerError> {
        let warnings = match self.dirty {
            DirtyRepresentation::Graph => {
                self.form = reconcile::to_form(&reconcile::from_graph(&self.graph));
                Vec::new()
            }
            DirtyRepresentation::Form => {
                let spec = reconcile::from_form(&self.form);
                let (graph, warnings) = reconcile::to_graph(&spec, Some(&self.graph));
                self.graph = graph;
                // Ids assigned by the rebuild flow back into the form.
                self.form = reconcile::to_form(&reconcile::from_graph(&self.graph));
                warnings
            }
            DirtyRepresentation::Unknown => Vec::new(),
        };
        self.dirty = DirtyRepresentation::Unknown;
        warnings
    }

    /// The spec derived from whichever side is authoritative right now.
    pub fn canonical_spec(&self) -> CanonicalPipelineSpec {
        match (self.dirty, self.mode) {
            (DirtyRepresentation::Graph, _) | (DirtyRepresentation::Unknown, Mode::Visual) => {
                reconcile::from_graph(&self.graph)
            }
            (DirtyRepresentation::Form, _) | (DirtyRepresentation::Unknown, Mode::Form) => {
                reconcile::from_form(&self.form)
            }
        }
    }

    // -- lifecycle ----------------------------------------------------------

    pub fn available_actions(&self) -> Vec<StageAction> {
        self.stage.available_actions(&self.canonical_spec())
    }

    pub fn apply(&mut self, action: StageAction) -> Result<Stage, SessionError> {
        let spec = self.canonical_spec();
        Ok(self.stage.apply(action, &spec)?)
    }

    /// Deploy from the deployment stage. Success marks the pipeline active
    /// and stamps `last_run_at`.
    pub fn deploy(
        &mut self,
        deployer: &dyn Deployer,
        config: &DeploymentConfig,
    ) -> Result<DeploymentReceipt, SessionError> {
        let spec = self.canonical_spec();
        let receipt = self.stage.deploy(deployer, &self.name, &spec, config)?;
        self.status = PipelineStatus::Active;
        self.last_run_at = Some(Utc::now());
        Ok(receipt)
    }

    /// Render code for the current spec and keep it as the last generated
    /// artifact.
    pub fn generate_code(&mut self, dialect: Dialect) -> &GeneratedCode {
        let spec = self.canonical_spec();
        let request = GenerationRequest::from_spec(&spec, &self.name, dialect)
            .with_options(self.options.clone());
        self.generated.insert(codegen::generate(&request))
    }

    // -- persistence --------------------------------------------------------

    /// Snapshot the session as a record carrying the version it last read.
    pub fn to_record(&self) -> PipelineRecord {
        let spec = self.canonical_spec();
        let graph = match (self.mode, self.dirty) {
            (Mode::Form, _) => PipelineGraph::new(),
            (Mode::Visual, DirtyRepresentation::Form) => {
                reconcile::to_graph(&spec, Some(&self.graph)).0
            }
            _ => self.graph.clone(),
        };
        PipelineRecord {
            id: self.record_id.clone().unwrap_or_default(),
            name: self.name.clone(),
            description: self.description.clone(),
            mode: self.mode,
            graph,
            spec,
            stage: self.stage.stage(),
            status: self.status,
            version: self.version,
            created_at: self.created_at,
            updated_at: Utc::now(),
            last_run_at: self.last_run_at,
        }
    }

    /// Create or update the stored record in one call.
    pub fn save(
        &mut self,
        store: &mut dyn PipelineStore,
        trigger: SaveTrigger,
    ) -> Result<u64, SessionError> {
        let record = self.begin_save(trigger)?;
        let result = match self.record_id.clone() {
            Some(id) => store.update(&id, record).map(|version| (id, version)),
            None => store.create(record).map(|id| (id, 1)),
        };
        self.finish_save(result)
    }

    /// First half of a save whose store call happens elsewhere. Rejected
    /// while another save is outstanding.
    pub fn begin_save(&mut self, trigger: SaveTrigger) -> Result<PipelineRecord, SessionError> {
        if self.save_in_flight {
            tracing::debug!(?trigger, "save rejected: another save is in flight");
            return Err(SessionError::SaveInFlight);
        }
        self.save_in_flight = true;
        tracing::debug!(?trigger, pipeline = %self.name, "saving pipeline");
        Ok(self.to_record())
    }

    /// Second half of a save: the store's `(id, version)` or its error. A
    /// failed save leaves the session as it was.
    pub fn finish_save(&mut self, result: Result<(String, u64), StoreError>) -> Result<u64, SessionError> {
        self.save_in_flight = false;
        let (id, version) = result.inspect_err(|e| {
            tracing::warn!(error = %e, pipeline = %self.name, "save failed");
        })?;
        self.record_id = Some(id);
        self.version = version;
        Ok(version)
    }
}
