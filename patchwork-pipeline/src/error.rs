//! Error types for patchwork-pipeline.

use std::fmt;

use thiserror::Error;

use patchwork_core::{RecordId, StoreError};

/// Error type returned by policy callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Policy callback that was running when a fault occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyStage {
    Analyze,
    Filter,
    Apply,
    ShouldPatch,
    Patch,
}

impl fmt::Display for PolicyStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyStage::Analyze => write!(f, "analyze"),
            PolicyStage::Filter => write!(f, "filter"),
            PolicyStage::Apply => write!(f, "apply"),
            PolicyStage::ShouldPatch => write!(f, "should_patch"),
            PolicyStage::Patch => write!(f, "patch"),
        }
    }
}

/// All errors that can arise from a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A policy callback failed. Fatal to the run; overrides created for
    /// earlier records stay in the output catalog.
    #[error("policy {stage} failed for record {record}: {source}")]
    Policy {
        record: RecordId,
        stage: PolicyStage,
        #[source]
        source: BoxError,
    },

    /// An error from the record store. Raised by plugin runs that require a
    /// record to resolve, e.g. through `RecordStore::resolve_required`.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Convenience constructor for [`PipelineError::Policy`].
pub(crate) fn policy_err(
    record: &RecordId,
    stage: PolicyStage,
    source: BoxError,
) -> PipelineError {
    PipelineError::Policy {
        record: record.clone(),
        stage,
        source,
    }
}
