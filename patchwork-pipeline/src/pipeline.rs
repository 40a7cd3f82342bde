//! Patch pipeline: policy selection → override → write-back → post-patch hook.
//!
//! ## `patch_record`: 4-step protocol
//!
//! 1. Get (or create) the override of the unit's context in the output catalog.
//! 2. Run the policy's `patch` on the override.
//! 3. Bump the applied count.
//! 4. Call the post-patch hook with the updated override.
//!
//! Intake order is application order. Nothing here reorders or parallelises.

use patchwork_core::{
    progress_line, OverrideCatalog, Provider, Record, RecordContext, RecordStore, ReportSink,
};

use crate::error::{policy_err, PipelineError, PolicyStage};
use crate::policy::{ForwardRecordContext, PatchPolicy, Patcher, PatchingUnit};

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Lazily runs `policy` over `intake`, yielding the records that need a patch.
///
/// Nothing is mutated; the only side effects are the policy's own callbacks.
/// The first policy error is yielded as an `Err` item.
pub fn get_records_to_patch<'p, R, P, I>(
    policy: &'p P,
    intake: I,
) -> impl Iterator<Item = Result<PatchingUnit<P::Context, P::Value>, PipelineError>> + 'p
where
    I: IntoIterator,
    I::IntoIter: 'p,
    P: PatchPolicy<I::Item, R>,
{
    intake
        .into_iter()
        .filter_map(move |item| policy.select(item).transpose())
}

/// Pairs every record of `source` with its current winning context, in
/// provider order. Records with no winning context are skipped.
pub fn forward_intake<R, S>(
    store: &S,
    source: &Provider<R>,
) -> Vec<ForwardRecordContext<S::Context>>
where
    R: Record,
    S: RecordStore<R>,
{
    source
        .records()
        .filter_map(|record| match store.resolve(record.id()) {
            Some(winning) => Some(ForwardRecordContext {
                source: record.clone(),
                winning,
            }),
            None => {
                tracing::warn!("no winning record for {} from {}", record.id(), source.key());
                None
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

type PatchedHook<'a, R> = Box<dyn FnMut(&R) + 'a>;

/// Applies policies to an output catalog and counts what was applied.
pub struct PatchPipeline<'a, R, K: ?Sized> {
    catalog: &'a mut K,
    patched_count: u32,
    on_patched: PatchedHook<'a, R>,
}

impl<'a, R, K> PatchPipeline<'a, R, K>
where
    R: Record,
    K: OverrideCatalog<R> + ?Sized,
{
    /// A pipeline writing overrides into `catalog`, with a no-op hook.
    pub fn new(catalog: &'a mut K) -> Self {
        Self {
            catalog,
            patched_count: 0,
            on_patched: Box::new(|_: &R| {}),
        }
    }

    /// Replaces the post-patch hook. It runs once per applied patch, after
    /// the override was mutated.
    pub fn on_patched(mut self, hook: impl FnMut(&R) + 'a) -> Self {
        self.on_patched = Box::new(hook);
        self
    }

    /// Installs the standard hook: one `Patched {TAG}:{id}({editor_id})` line
    /// per applied patch, sent to `sink`.
    pub fn with_progress<S>(self, tag: &str, sink: S) -> Self
    where
        S: ReportSink + 'a,
    {
        let tag = tag.to_owned();
        self.on_patched(move |record| sink.notice(&progress_line(&tag, record)))
    }

    /// Patches applied over the pipeline's lifetime. Never decreases.
    pub fn patched_count(&self) -> u32 {
        self.patched_count
    }

    pub fn catalog(&self) -> &K {
        &*self.catalog
    }

    /// Applies one unit to the override of its context.
    pub fn patch_record<C, P>(
        &mut self,
        unit: PatchingUnit<C, P::Value>,
        policy: &P,
    ) -> Result<(), PipelineError>
    where
        C: RecordContext<Record = R>,
        P: Patcher<R>,
    {
        let PatchingUnit { context, value } = unit;
        let target = context.get_or_add_as_override(&mut *self.catalog);
        policy
            .patch(target, value)
            .map_err(|e| policy_err(context.record().id(), PolicyStage::Patch, e))?;
        self.patched_count += 1;
        (self.on_patched)(&*target);
        Ok(())
    }

    /// Selects and applies in intake order. Returns how many patches this
    /// call applied. Stops at the first policy error; overrides already
    /// created stay in the catalog.
    pub fn patch_records<P, I>(&mut self, policy: &P, intake: I) -> Result<u32, PipelineError>
    where
        I: IntoIterator,
        P: PatchPolicy<I::Item, R>,
    {
        let before = self.patched_count;
        for unit in get_records_to_patch(policy, intake) {
            self.patch_record(unit?, policy)?;
        }
        let applied = self.patched_count - before;
        tracing::info!("applied {} patch(es) to {}", applied, self.catalog.key());
        Ok(applied)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use crate::policy::{Transform, TransformPatcher};
    use patchwork_core::{
        LoadOrder, MemorySink, MemoryStore, ModContext, OutputCatalog, ProviderKey,
        ProviderListing, RecordId,
    };

    #[derive(Debug, Clone, PartialEq)]
    struct Light {
        id: RecordId,
        editor_id: Option<String>,
        radius: u32,
    }

    impl Record for Light {
        fn id(&self) -> &RecordId {
            &self.id
        }
        fn editor_id(&self) -> Option<&str> {
            self.editor_id.as_deref()
        }
    }

    fn light(id: &str, radius: u32) -> Light {
        Light {
            id: RecordId::from(id),
            editor_id: Some(format!("Light{id}")),
            radius,
        }
    }

    fn ctx(record: Light) -> ModContext<Light> {
        ModContext::new(record, ProviderKey::from("Skyrim.esm"))
    }

    /// Doubles the radius of every light smaller than 512.
    struct Brighten;

    impl Patcher<Light> for Brighten {
        type Value = u32;

        fn patch(&self, target: &mut Light, value: u32) -> Result<(), BoxError> {
            target.radius = value;
            Ok(())
        }
    }

    impl TransformPatcher<Light> for Brighten {
        fn filter(&self, record: &Light) -> Result<bool, BoxError> {
            Ok(record.radius < 512)
        }

        fn apply(&self, record: &Light) -> Result<u32, BoxError> {
            Ok(record.radius * 2)
        }
    }

    #[test]
    fn selection_does_not_touch_the_catalog() {
        let catalog: OutputCatalog<Light> = OutputCatalog::new("Patch.esp");
        let policy = Transform(Brighten);
        let intake = vec![ctx(light("A", 100)), ctx(light("B", 600))];
        let units: Vec<_> = get_records_to_patch(&policy, intake)
            .collect::<Result<_, _>>()
            .expect("select");
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].value, 200);
        assert!(catalog.is_empty());
    }

    #[test]
    fn patching_the_same_identity_twice_reuses_the_override() {
        let mut catalog = OutputCatalog::new("Patch.esp");
        let policy = Transform(Brighten);
        {
            let mut pipeline = PatchPipeline::new(&mut catalog);
            let unit = PatchingUnit { context: ctx(light("A", 100)), value: 200 };
            pipeline.patch_record(unit, &policy).expect("first");
            let unit = PatchingUnit { context: ctx(light("A", 100)), value: 300 };
            pipeline.patch_record(unit, &policy).expect("second");
            assert_eq!(pipeline.patched_count(), 2);
        }
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get_override(&RecordId::from("A")).expect("override").radius, 300);
    }

    #[test]
    fn hook_sees_the_updated_record() {
        let mut catalog = OutputCatalog::new("Patch.esp");
        let mut seen = Vec::new();
        {
            let mut pipeline =
                PatchPipeline::new(&mut catalog).on_patched(|l: &Light| seen.push(l.radius));
            pipeline
                .patch_records(&Transform(Brighten), vec![ctx(light("A", 10)), ctx(light("B", 20))])
                .expect("run");
        }
        assert_eq!(seen, [20, 40]);
    }

    #[test]
    fn progress_lines_follow_intake_order() {
        let sink = MemorySink::new();
        let mut catalog = OutputCatalog::new("Patch.esp");
        let mut pipeline = PatchPipeline::new(&mut catalog).with_progress("LIGH", sink.clone());
        pipeline
            .patch_records(
                &Transform(Brighten),
                vec![ctx(light("C", 1)), ctx(light("A", 1)), ctx(light("B", 1))],
            )
            .expect("run");
        assert_eq!(
            sink.lines(),
            ["Patched LIGH:C(LightC)", "Patched LIGH:A(LightA)", "Patched LIGH:B(LightB)"]
        );
    }

    #[test]
    fn forward_intake_pairs_source_with_winning() {
        let source = Provider::new("Skyrim.esm").with(light("A", 64)).with(light("B", 32));
        let patch = Provider::new("Lux.esp").with(light("A", 256));
        let store = MemoryStore::new(
            LoadOrder::from_listings(vec![
                ProviderListing::new("Skyrim.esm", source.clone()),
                ProviderListing::new("Lux.esp", patch),
            ]),
            "Patch.esp",
        );
        let intake = forward_intake(&store, &source);
        assert_eq!(intake.len(), 2);
        assert_eq!(intake[0].source.radius, 64);
        assert_eq!(intake[0].winning.record.radius, 256);
        assert_eq!(intake[0].winning.provider, ProviderKey::from("Lux.esp"));
        assert_eq!(intake[1].winning.record.radius, 32);
    }
}
