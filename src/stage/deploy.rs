//! Deployment settings and the deploy collaborator.
//!
//! Provisioning happens outside this crate; a `Deployer` receives the
//! validated settings and reports back.

use serde::{Deserialize, Serialize};

use crate::error::StageError;
use crate::reconcile::CanonicalPipelineSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CloudProvider {
    #[default]
    Aws,
    Gcp,
    Azure,
}

impl CloudProvider {
    pub fn display_name(&self) -> &'static str {
        match self {
            CloudProvider::Aws => "Amazon Web Services",
            CloudProvider::Gcp => "Google Cloud Platform",
            CloudProvider::Azure => "Microsoft Azure",
        }
    }

    pub fn regions(&self) -> &'static [&'static str] {
        match self {
            CloudProvider::Aws => &["us-east-1", "us-west-2", "eu-west-1", "ap-south-1"],
            CloudProvider::Gcp => &["us-central1", "europe-west1", "asia-east1"],
            CloudProvider::Azure => &["eastus", "westeurope", "southeastasia"],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceSize {
    Small,
    #[default]
    Medium,
    Large,
    Xlarge,
}

impl InstanceSize {
    pub fn cores(&self) -> u32 {
        match self {
            InstanceSize::Small => 2,
            InstanceSize::Medium => 4,
            InstanceSize::Large => 8,
            InstanceSize::Xlarge => 16,
        }
    }

    pub fn memory_gb(&self) -> u32 {
        self.cores() * 2
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Schedule {
    Hourly,
    #[default]
    Daily,
    Weekly,
    Monthly,
    Manual,
}

impl Schedule {
    /// Cron expression, or `None` for manual-only pipelines.
    pub fn cron(&self) -> Option<&'static str> {
        match self {
            Schedule::Hourly => Some("0 * * * *"),
            Schedule::Daily => Some("0 0 * * *"),
            Schedule::Weekly => Some("0 0 * * 0"),
            Schedule::Monthly => Some("0 0 1 * *"),
            Schedule::Manual => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentConfig {
    pub provider: CloudProvider,
    pub region: String,
    pub instance_size: InstanceSize,
    pub auto_scaling: bool,
    pub monitoring: bool,
    pub schedule: Schedule,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_email: Option<String>,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            provider: CloudProvider::Aws,
            region: "us-east-1".into(),
            instance_size: InstanceSize::Medium,
            auto_scaling: true,
            monitoring: true,
            schedule: Schedule::Daily,
            notification_email: None,
        }
    }
}

impl DeploymentConfig {
    pub fn validate(&self) -> Result<(), StageError> {
        if !self.provider.regions().contains(&self.region.as_str()) {
            return Err(StageError::InvalidDeployment(format!(
                "region '{}' is not offered by {}",
                self.region,
                self.provider.display_name()
            )));
        }
        if let Some(email) = self.notification_email.as_deref().filter(|e| !e.is_empty()) {
            let well_formed = email
                .split_once('@')
                .is_some_and(|(user, domain)| !user.is_empty() && domain.contains('.'));
            if !well_formed {
                return Err(StageError::InvalidDeployment(format!(
                    "'{}' is not a valid notification address",
                    email
                )));
            }
        }
        Ok(())
    }
}

/// What a successful deployment hands back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentReceipt {
    pub deployment_id: String,
    pub provider: CloudProvider,
    pub region: String,
    pub cron: Option<String>,
}

/// External deploy action. Implementations may fail; the error text is shown
/// to the user as-is.
pub trait Deployer {
    fn deploy(
        &self,
        pipeline_name: &str,
        spec: &CanonicalPipelineSpec,
        config: &DeploymentConfig,
    ) -> Result<DeploymentReceipt, String>;
}
