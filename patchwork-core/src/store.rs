//! Record store adapter: override catalogs and winning-record resolution.
//!
//! # Layering
//!
//! ```text
//! load order:   Skyrim.esm  ->  Update.esm  ->  Mod.esp  ->  [output catalog]
//!               (lowest)                                      (always wins)
//! ```
//!
//! Later enabled providers win. The output catalog sits above every provider,
//! so once a record has an override the override *is* the winning record.
//! That is what makes re-running a patcher over its own output a no-op.

use indexmap::{IndexMap, IndexSet};

use crate::context::{ModContext, RecordContext};
use crate::error::StoreError;
use crate::load_order::LoadOrder;
use crate::types::{ProviderKey, Record, RecordId};

// ---------------------------------------------------------------------------
// Capabilities
// ---------------------------------------------------------------------------

/// A catalog that owns mutable overrides of winning records.
pub trait OverrideCatalog<R: Record> {
    /// Key of the catalog the overrides are written to.
    fn key(&self) -> &ProviderKey;

    /// Returns the override for `winning`, copying it into the catalog on
    /// first access. Later calls for the same identity return the same
    /// instance; the argument is ignored once an override exists.
    fn get_or_add_override(&mut self, winning: &R) -> &mut R;

    /// The override for `id`, if one was created.
    fn get_override(&self, id: &RecordId) -> Option<&R>;
}

/// Resolution of record identities to their winning version.
pub trait RecordStore<R: Record>: OverrideCatalog<R> {
    type Context: RecordContext<Record = R>;

    /// Resolves the winning context for `id`, or `None` if no enabled
    /// provider carries it.
    fn resolve(&self, id: &RecordId) -> Option<Self::Context>;

    /// Like [`resolve`](Self::resolve) but treats absence as an error.
    fn resolve_required(&self, id: &RecordId) -> Result<Self::Context, StoreError> {
        self.resolve(id)
            .ok_or_else(|| StoreError::UnresolvedRecord { id: id.clone() })
    }
}

// ---------------------------------------------------------------------------
// Output catalog
// ---------------------------------------------------------------------------

/// In-memory override catalog. Overrides are boxed so an override keeps its
/// address for the whole run, whatever else is added after it.
#[derive(Debug, Clone)]
pub struct OutputCatalog<R> {
    key: ProviderKey,
    overrides: IndexMap<RecordId, Box<R>>,
}

impl<R: Record> OutputCatalog<R> {
    pub fn new(key: impl Into<ProviderKey>) -> Self {
        Self {
            key: key.into(),
            overrides: IndexMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.overrides.contains_key(id)
    }

    /// Overrides in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.overrides.values().map(|r| r.as_ref())
    }
}

impl<R: Record> OverrideCatalog<R> for OutputCatalog<R> {
    fn key(&self) -> &ProviderKey {
        &self.key
    }

    fn get_or_add_override(&mut self, winning: &R) -> &mut R {
        let key = &self.key;
        let slot = self.overrides.entry(winning.id().clone()).or_insert_with(|| {
            tracing::debug!("new override of {} in {}", winning.id(), key);
            Box::new(winning.clone())
        });
        slot.as_mut()
    }

    fn get_override(&self, id: &RecordId) -> Option<&R> {
        self.overrides.get(id).map(|r| r.as_ref())
    }
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct StoredRecord<R> {
    record: R,
    parents: Vec<RecordId>,
}

/// One data provider: an ordered set of records keyed by identity.
#[derive(Debug, Clone)]
pub struct Provider<R> {
    key: ProviderKey,
    records: IndexMap<RecordId, StoredRecord<R>>,
}

impl<R: Record> Provider<R> {
    pub fn new(key: impl Into<ProviderKey>) -> Self {
        Self {
            key: key.into(),
            records: IndexMap::new(),
        }
    }

    pub fn key(&self) -> &ProviderKey {
        &self.key
    }

    /// Adds a top-level record, replacing any earlier record with the same id.
    pub fn insert(&mut self, record: R) {
        self.insert_child(record, Vec::new());
    }

    /// Adds a record nested inside `parents` (innermost first).
    pub fn insert_child(&mut self, record: R, parents: Vec<RecordId>) {
        self.records
            .insert(record.id().clone(), StoredRecord { record, parents });
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, record: R) -> Self {
        self.insert(record);
        self
    }

    pub fn get(&self, id: &RecordId) -> Option<&R> {
        self.records.get(id).map(|s| &s.record)
    }

    /// Records in insertion order.
    pub fn records(&self) -> impl Iterator<Item = &R> {
        self.records.values().map(|s| &s.record)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn context(&self, id: &RecordId) -> Option<ModContext<R>> {
        self.records.get(id).map(|s| {
            ModContext::new(s.record.clone(), self.key.clone()).with_parents(s.parents.clone())
        })
    }

    fn parents(&self, id: &RecordId) -> Option<&[RecordId]> {
        self.records.get(id).map(|s| s.parents.as_slice())
    }
}

// ---------------------------------------------------------------------------
// Memory store
// ---------------------------------------------------------------------------

/// Load order of in-memory providers plus the output catalog layered on top.
#[derive(Debug, Clone)]
pub struct MemoryStore<R> {
    load_order: LoadOrder<Provider<R>>,
    output: OutputCatalog<R>,
}

impl<R: Record> MemoryStore<R> {
    pub fn new(load_order: LoadOrder<Provider<R>>, output: impl Into<ProviderKey>) -> Self {
        Self {
            load_order,
            output: OutputCatalog::new(output),
        }
    }

    pub fn load_order(&self) -> &LoadOrder<Provider<R>> {
        &self.load_order
    }

    pub fn output(&self) -> &OutputCatalog<R> {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut OutputCatalog<R> {
        &mut self.output
    }

    pub fn into_output(self) -> OutputCatalog<R> {
        self.output
    }

    /// Every version of `id`, winning first: the override (if any), then each
    /// enabled provider from the top of the load order down.
    pub fn contexts(&self, id: &RecordId) -> Vec<ModContext<R>> {
        let mut contexts = Vec::new();
        if let Some(over) = self.override_context(id) {
            contexts.push(over);
        }
        contexts.extend(
            self.load_order
                .enabled()
                .rev()
                .filter_map(|(_, provider)| provider.context(id)),
        );
        contexts
    }

    /// Winning context of every distinct identity, in the order identities
    /// first appear walking the load order bottom-up.
    pub fn winning_contexts(&self) -> Vec<ModContext<R>> {
        let mut seen: IndexSet<&RecordId> = IndexSet::new();
        for (_, provider) in self.load_order.enabled() {
            seen.extend(provider.records.keys());
        }
        seen.extend(self.output.overrides.keys());
        seen.into_iter().filter_map(|id| self.resolve(id)).collect()
    }

    fn override_context(&self, id: &RecordId) -> Option<ModContext<R>> {
        let record = self.output.get_override(id)?;
        let parents = self
            .load_order
            .enabled()
            .rev()
            .find_map(|(_, p)| p.parents(id))
            .map(<[RecordId]>::to_vec)
            .unwrap_or_default();
        Some(ModContext::new(record.clone(), self.output.key.clone()).with_parents(parents))
    }
}

impl<R: Record> OverrideCatalog<R> for MemoryStore<R> {
    fn key(&self) -> &ProviderKey {
        self.output.key()
    }

    fn get_or_add_override(&mut self, winning: &R) -> &mut R {
        self.output.get_or_add_override(winning)
    }

    fn get_override(&self, id: &RecordId) -> Option<&R> {
        self.output.get_override(id)
    }
}

impl<R: Record> RecordStore<R> for MemoryStore<R> {
    type Context = ModContext<R>;

    fn resolve(&self, id: &RecordId) -> Option<ModContext<R>> {
        self.override_context(id).or_else(|| {
            self.load_order
                .enabled()
                .rev()
                .find_map(|(_, provider)| provider.context(id))
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
