//! Error types shared across the crate.
//!
//! Diagnostics from the parse and validate phases are coded `CompilerError`s
//! collected into a `Vec`. Operations on the live model (graph edits, stage
//! transitions, saves) return the typed errors below.

use serde::Serialize;
use thiserror::Error;

use crate::graph::NodeKind;
use crate::stage::Stage;
use crate::stage::StageAction;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Phase {
    Parse,
    Validate,
    Reconcile,
    Codegen,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Parse => write!(f, "Parse"),
            Phase::Validate => write!(f, "Validate"),
            Phase::Reconcile => write!(f, "Reconcile"),
            Phase::Codegen => write!(f, "Codegen"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompilerError {
    pub code: String,
    pub phase: Phase,
    pub message: String,
    pub node_id: Option<String>,
}

impl std::fmt::Display for CompilerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.node_id {
            Some(id) => write!(
                f,
                "[{}:{}] {} (node '{}')",
                self.phase, self.code, self.message, id
            ),
            None => write!(f, "[{}:{}] {}", self.phase, self.code, self.message),
        }
    }
}

impl std::error::Error for CompilerError {}

impl CompilerError {
    pub fn parse(code: &str, message: impl Into<String>) -> Self {
        CompilerError {
            code: code.into(),
            phase: Phase::Parse,
            message: message.into(),
            node_id: None,
        }
    }

    pub fn validate(code: &str, message: impl Into<String>, node_id: Option<String>) -> Self {
        CompilerError {
            code: code.into(),
            phase: Phase::Validate,
            message: message.into(),
            node_id,
        }
    }

    pub fn reconcile(code: &str, message: impl Into<String>, node_id: Option<String>) -> Self {
        CompilerError {
            code: code.into(),
            phase: Phase::Reconcile,
            message: message.into(),
            node_id,
        }
    }

    pub fn codegen(code: &str, message: impl Into<String>) -> Self {
        CompilerError {
            code: code.into(),
            phase: Phase::Codegen,
            message: message.into(),
            node_id: None,
        }
    }
}

/// Why an edge was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointReason {
    UnknownSource,
    UnknownTarget,
    TargetAsOrigin,
    SourceAsDestination,
    SelfLoop,
}

impl std::fmt::Display for EndpointReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EndpointReason::UnknownSource => write!(f, "origin node does not exist"),
            EndpointReason::UnknownTarget => write!(f, "destination node does not exist"),
            EndpointReason::TargetAsOrigin => write!(f, "target nodes cannot have outgoing edges"),
            EndpointReason::SourceAsDestination => {
                write!(f, "source nodes cannot have incoming edges")
            }
            EndpointReason::SelfLoop => write!(f, "a node cannot connect to itself"),
        }
    }
}

/// Structural errors raised by graph mutations. A failed mutation leaves the
/// graph untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("invalid edge '{source_id}' -> '{target_id}': {reason}")]
    InvalidEndpoint {
        source_id: String,
        target_id: String,
        reason: EndpointReason,
    },

    #[error("node '{0}' does not exist")]
    UnknownNode(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("no {kind} row at index {index}")]
    RowOutOfRange { kind: NodeKind, index: usize },

    #[error("unknown form field '{0}'")]
    UnknownField(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StageError {
    #[error("action {action:?} is not available in stage {stage:?}")]
    NotAvailable { stage: Stage, action: StageAction },

    #[error("deploy is only possible from the deployment stage, not {0:?}")]
    DeployUnavailable(Stage),

    #[error("invalid deployment configuration: {0}")]
    InvalidDeployment(String),

    #[error("deployment failed: {0}")]
    DeployFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("pipeline '{0}' not found")]
    NotFound(String),

    #[error("stale write to pipeline '{id}': expected version {expected}, found {actual}")]
    StaleWrite { id: String, expected: u64, actual: u64 },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("a save is already in flight")]
    SaveInFlight,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Stage(#[from] StageError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Form(#[from] FormError),
}
