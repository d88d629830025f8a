//! Authoring lifecycle: configure → build → profile → deploy.
//!
//! A single-pipeline state machine. Transitions happen only on explicit user
//! actions; `available_actions` is what the UI enables, so a precondition
//! that is not met shows up as a missing action rather than an error.

pub mod deploy;

use serde::{Deserialize, Serialize};

pub use deploy::{
    CloudProvider, Deployer, DeploymentConfig, DeploymentReceipt, InstanceSize, Schedule,
};

use crate::error::StageError;
use crate::reconcile::CanonicalPipelineSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    #[default]
    Configure,
    Building,
    Profiling,
    Analytics,
    Deployment,
    Complete,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Configure => "configure",
            Stage::Building => "building",
            Stage::Profiling => "profiling",
            Stage::Analytics => "analytics",
            Stage::Deployment => "deployment",
            Stage::Complete => "complete",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Complete)
    }

    /// Whether the generated-code view is shown at this stage.
    pub fn has_code_view(&self) -> bool {
        !matches!(self, Stage::Configure)
    }
}

/// The buttons that move a pipeline between stages. Reaching `Complete`
/// is not an action: it follows only from a successful deploy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StageAction {
    /// Configure → Building; needs at least one source and one target.
    Generate,
    ContinueToProfiling,
    SkipToDeploy,
    /// Opened from the stage indicator.
    ViewAnalytics,
    ContinueToDeploy,
    BackToPipeline,
}

impl StageAction {
    pub fn destination(&self) -> Stage {
        match self {
            StageAction::Generate | StageAction::BackToPipeline => Stage::Building,
            StageAction::ContinueToProfiling => Stage::Profiling,
            StageAction::ViewAnalytics => Stage::Analytics,
            StageAction::SkipToDeploy | StageAction::ContinueToDeploy => Stage::Deployment,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageController {
    stage: Stage,
}

impl StageController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick up a pipeline at a stored stage.
    pub fn resume(stage: Stage) -> Self {
        Self { stage }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Actions whose affordance is enabled right now.
    pub fn available_actions(&self, spec: &CanonicalPipelineSpec) -> Vec<StageAction> {
        match self.stage {
            Stage::Configure if spec.has_endpoints() => vec![StageAction::Generate],
            Stage::Configure => vec![],
            Stage::Building => vec![
                StageAction::ContinueToProfiling,
                StageAction::SkipToDeploy,
                StageAction::ViewAnalytics,
            ],
            Stage::Profiling => vec![StageAction::ContinueToDeploy, StageAction::ViewAnalytics],
            Stage::Analytics => vec![StageAction::ContinueToDeploy],
            Stage::Deployment => vec![StageAction::BackToPipeline],
            Stage::Complete => vec![],
        }
    }

    pub fn is_available(&self, action: StageAction, spec: &CanonicalPipelineSpec) -> bool {
        self.available_actions(spec).contains(&action)
    }

    /// Apply an action. Unavailable actions leave the stage unchanged.
    pub fn apply(
        &mut self,
        action: StageAction,
        spec: &CanonicalPipelineSpec,
    ) -> Result<Stage, StageError> {
        if !self.is_available(action, spec) {
            tracing::debug!(stage = self.stage.as_str(), ?action, "stage action not available");
            return Err(StageError::NotAvailable {
                stage: self.stage,
                action,
            });
        }
        let from = self.stage;
        self.stage = action.destination();
        tracing::info!(from = from.as_str(), to = self.stage.as_str(), "stage transition");
        Ok(self.stage)
    }

    pub fn can_deploy(&self) -> bool {
        self.stage == Stage::Deployment
    }

    /// Run the deploy action. Success moves to `Complete`; any failure keeps
    /// the controller in `Deployment` so the user can retry.
    pub fn deploy(
        &mut self,
        deployer: &dyn Deployer,
        pipeline_name: &str,
        spec: &CanonicalPipelineSpec,
        config: &DeploymentConfig,
    ) -> Result<DeploymentReceipt, StageError> {
        if !self.can_deploy() {
            return Err(StageError::DeployUnavailable(self.stage));
        }
        config.validate()?;

        match deployer.deploy(pipeline_name, spec, config) {
            Ok(receipt) => {
                tracing::info!(
                    pipeline = pipeline_name,
                    deployment_id = %receipt.deployment_id,
                    "pipeline deployed"
                );
                self.stage = Stage::Complete;
                Ok(receipt)
            }
            Err(message) => {
                tracing::warn!(pipeline = pipeline_name, %message, "deployment failed");
                Err(StageError::DeployFailed(message))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::ComponentRef;

    fn ready_spec() -> CanonicalPipelineSpec {
        CanonicalPipelineSpec {
            sources: vec![ComponentRef::new("postgresql", "PG")],
            targets: vec![ComponentRef::new("snowflake", "SF")],
            ..Default::default()
        }
    }

    #[test]
    fn configure_requires_source_and_target() {
        let mut c = StageController::new();
        let mut spec = ready_spec();
        spec.targets.clear();
        assert!(c.available_actions(&spec).is_empty());
        assert!(c.apply(StageAction::Generate, &spec).is_err());
        assert_eq!(c.stage(), Stage::Configure);

        assert_eq!(c.apply(StageAction::Generate, &ready_spec()).unwrap(), Stage::Building);
    }

    #[test]
    fn back_only_from_deployment() {
        let spec = ready_spec();
        let mut c = StageController::resume(Stage::Profiling);
        assert!(c.apply(StageAction::BackToPipeline, &spec).is_err());
        c.apply(StageAction::ContinueToDeploy, &spec).unwrap();
        assert_eq!(c.apply(StageAction::BackToPipeline, &spec).unwrap(), Stage::Building);
    }

    #[test]
    fn complete_is_terminal() {
        let c = StageController::resume(Stage::Complete);
        assert!(c.available_actions(&ready_spec()).is_empty());
        assert!(Stage::Complete.is_terminal());
    }
}
