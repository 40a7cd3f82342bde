//! Patch policies.
//!
//! A policy decides per record whether a change is needed and computes the
//! value to write. Three shapes are supported:
//!
//! | Shape | Intake | Selection |
//! |---|---|---|
//! | [`Forward`] | `(source, winning)` pairs | `analyze` always, keep if `should_patch` |
//! | [`Transform`] | winning contexts | keep if `filter`, then `apply` |
//! | [`ConditionalTransform`] | winning contexts | `filter`, `apply`, keep if `should_patch` |
//!
//! Each adapter implements [`PatchPolicy`], the single seam the pipeline is
//! generic over.

use patchwork_core::{Record, RecordContext};

use crate::error::{policy_err, BoxError, PipelineError, PolicyStage};

// ---------------------------------------------------------------------------
// Policy capabilities
// ---------------------------------------------------------------------------

/// Writes a computed value into an override.
pub trait Patcher<R> {
    type Value;

    fn patch(&self, target: &mut R, value: Self::Value) -> Result<(), BoxError>;
}

/// Decides from a joint view of a source record and the winning record.
pub trait ForwardPatcher<R>: Patcher<R> {
    /// Computes the value to forward. Called for every intake pair.
    fn analyze(&self, source: &R, winning: &R) -> Result<Self::Value, BoxError>;

    /// True if `value` differs from what the winning record already holds.
    fn should_patch(&self, value: &Self::Value) -> Result<bool, BoxError>;
}

/// Decides from the winning record alone.
pub trait TransformPatcher<R>: Patcher<R> {
    /// Pure predicate: is this record a candidate at all?
    fn filter(&self, record: &R) -> Result<bool, BoxError>;

    /// Computes the new value. Only called for records passing `filter`.
    fn apply(&self, record: &R) -> Result<Self::Value, BoxError>;
}

/// A transform gated a second time on the value it produced.
pub trait ConditionalTransformPatcher<R>: TransformPatcher<R> {
    fn should_patch(&self, value: &Self::Value) -> Result<bool, BoxError>;
}

// ---------------------------------------------------------------------------
// Intake / output units
// ---------------------------------------------------------------------------

/// A source record paired with the winning context of the same identity.
#[derive(Debug, Clone)]
pub struct ForwardRecordContext<C: RecordContext> {
    pub source: C::Record,
    pub winning: C,
}

/// A winning context and the value computed for it, ready to apply.
#[derive(Debug, Clone)]
pub struct PatchingUnit<C, V> {
    pub context: C,
    pub value: V,
}

// ---------------------------------------------------------------------------
// Pipeline seam
// ---------------------------------------------------------------------------

/// What the pipeline needs from a policy: turn one intake item of type `I`
/// into an optional patching unit. Applying the unit goes through the
/// [`Patcher`] supertrait.
pub trait PatchPolicy<I, R>: Patcher<R> {
    type Context: RecordContext<Record = R>;

    /// `Ok(None)` means the item needs no patch.
    fn select(
        &self,
        item: I,
    ) -> Result<Option<PatchingUnit<Self::Context, Self::Value>>, PipelineError>;
}

/// Forward-shaped policy adapter.
#[derive(Debug, Clone, Default)]
pub struct Forward<P>(pub P);

/// Transform-shaped policy adapter.
#[derive(Debug, Clone, Default)]
pub struct Transform<P>(pub P);

/// Conditional-transform-shaped policy adapter.
#[derive(Debug, Clone, Default)]
pub struct ConditionalTransform<P>(pub P);

macro_rules! delegate_patcher {
    ($($adapter:ident),*) => {$(
        impl<R, P: Patcher<R>> Patcher<R> for $adapter<P> {
            type Value = P::Value;

            fn patch(&self, target: &mut R, value: P::Value) -> Result<(), BoxError> {
                self.0.patch(target, value)
            }
        }
    )*};
}

delegate_patcher!(Forward, Transform, ConditionalTransform);

impl<C, P> PatchPolicy<ForwardRecordContext<C>, C::Record> for Forward<P>
where
    C: RecordContext,
    P: ForwardPatcher<C::Record>,
{
    type Context = C;

    fn select(
        &self,
        item: ForwardRecordContext<C>,
    ) -> Result<Option<PatchingUnit<C, <P as Patcher<C::Record>>::Value>>, PipelineError> {
        let ForwardRecordContext { source, winning } = item;
        let id = winning.record().id();
        let value = self
            .0
            .analyze(&source, winning.record())
            .map_err(|e| policy_err(id, PolicyStage::Analyze, e))?;
        let keep = self
            .0
            .should_patch(&value)
            .map_err(|e| policy_err(id, PolicyStage::ShouldPatch, e))?;
        if !keep {
            tracing::debug!("up to date: {}", id);
            return Ok(None);
        }
        Ok(Some(PatchingUnit {
            context: winning,
            value,
        }))
    }
}

/// Shared first stage of both transform shapes.
fn transform_select<C, P>(
    patcher: &P,
    context: C,
) -> Result<Option<PatchingUnit<C, <P as Patcher<C::Record>>::Value>>, PipelineError>
where
    C: RecordContext,
    P: TransformPatcher<C::Record>,
{
    let record = context.record();
    let keep = patcher
        .filter(record)
        .map_err(|e| policy_err(record.id(), PolicyStage::Filter, e))?;
    if !keep {
        return Ok(None);
    }
    let value = patcher
        .apply(record)
        .map_err(|e| policy_err(record.id(), PolicyStage::Apply, e))?;
    Ok(Some(PatchingUnit { context, value }))
}

impl<C, P> PatchPolicy<C, C::Record> for Transform<P>
where
    C: RecordContext,
    P: TransformPatcher<C::Record>,
{
    type Context = C;

    fn select(
        &self,
        item: C,
    ) -> Result<Option<PatchingUnit<C, <P as Patcher<C::Record>>::Value>>, PipelineError> {
        transform_select(&self.0, item)
    }
}

impl<C, P> PatchPolicy<C, C::Record> for ConditionalTransform<P>
where
    C: RecordContext,
    P: ConditionalTransformPatcher<C::Record>,
{
    type Context = C;

    fn select(
        &self,
        item: C,
    ) -> Result<Option<PatchingUnit<C, <P as Patcher<C::Record>>::Value>>, PipelineError> {
        let Some(unit) = transform_select(&self.0, item)? else {
            return Ok(None);
        };
        let keep = self
            .0
            .should_patch(&unit.value)
            .map_err(|e| policy_err(unit.context.record().id(), PolicyStage::ShouldPatch, e))?;
        if !keep {
            tracing::debug!("up to date: {}", unit.context.record().id());
            return Ok(None);
        }
        Ok(Some(unit))
    }
}
