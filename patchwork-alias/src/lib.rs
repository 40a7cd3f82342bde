//! Differential quest alias condition patching.
//!
//! [`AliasConditionPatcher`] appends one condition to the aliases that should
//! carry it and do not yet, computed as a set difference between a source
//! quest and its winning version. The [`alias`] module has the lookups it is
//! built on.

pub mod alias;
pub mod error;
pub mod patcher;
pub mod types;

pub use error::AliasError;
pub use patcher::{AliasConditionPatcher, AliasPatchSummary, PatchedAlias, QuestOutcome};
pub use types::{CompareOperator, Condition, Quest, QuestAlias, RunOn};
