//! # patchwork-pipeline
//!
//! Policy-driven patching of winning records into an output catalog.
//!
//! Wrap a policy in one of the shape adapters ([`Forward`], [`Transform`],
//! [`ConditionalTransform`]) and hand it to [`PatchPipeline::patch_records`]
//! together with the intake stream.

pub mod error;
pub mod pipeline;
pub mod policy;

pub use error::{BoxError, PipelineError, PolicyStage};
pub use pipeline::{forward_intake, get_records_to_patch, PatchPipeline};
pub use policy::{
    ConditionalTransform, ConditionalTransformPatcher, Forward, ForwardPatcher,
    ForwardRecordContext, PatchPolicy, Patcher, PatchingUnit, Transform, TransformPatcher,
};
