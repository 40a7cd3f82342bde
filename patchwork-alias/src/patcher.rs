//! Differential alias condition patcher.
//!
//! ## `patch_quest`: 6-step protocol
//!
//! 1. Resolve the winning quest → skip with a diagnostic if unresolvable.
//! 2. required = alias ids of the *source* quest carrying the condition.
//! 3. actual = alias ids of the *winning* quest carrying the condition.
//! 4. to-patch = required − actual.
//! 5. Empty → unchanged; no override, no report entry.
//! 6. Override the winning quest, append a copy of the condition to every
//!    to-patch alias in alias order, record each alias in the report.
//!
//! Running the patcher again over its own output finds nothing to patch.

use std::fmt;

use indexmap::{IndexMap, IndexSet};
use patchwork_core::{Record, RecordContext, RecordId, RecordStore, ReportSink, TracingSink};

use crate::alias::{aliases_with_condition, aliases_with_exact_condition};
use crate::types::Quest;

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// An alias that received the condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchedAlias {
    pub id: u32,
    pub name: Option<String>,
}

/// Outcome of patching one quest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestOutcome {
    /// No winning version of the quest could be found.
    Unresolved,
    /// Every required alias already carries the condition.
    Unchanged,
    /// The condition was appended to `aliases` aliases.
    Patched { aliases: usize },
}

/// Totals over the whole report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AliasPatchSummary {
    pub aliases: usize,
    pub quests: usize,
}

impl fmt::Display for AliasPatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Patched {} aliases across {} quests", self.aliases, self.quests)
    }
}

// ---------------------------------------------------------------------------
// Patcher
// ---------------------------------------------------------------------------

type Matcher<C> = Box<dyn Fn(&C) -> bool>;

/// Adds one condition to the quest aliases that are supposed to carry it.
///
/// Which aliases are supposed to carry it is read from a source version of
/// each quest; the winning version only receives the missing ones.
pub struct AliasConditionPatcher<C> {
    condition: C,
    matcher: Option<Matcher<C>>,
    sink: Box<dyn ReportSink>,
    patched: IndexMap<RecordId, Vec<PatchedAlias>>,
}

impl<C> fmt::Debug for AliasConditionPatcher<C>
where
    C: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AliasConditionPatcher")
            .field("condition", &self.condition)
            .field("matcher", &self.matcher.is_some())
            .field("patched", &self.patched)
            .finish()
    }
}

impl<C> AliasConditionPatcher<C>
where
    C: Clone + PartialEq,
{
    /// A patcher matching existing conditions by equality with `condition`,
    /// reporting through `tracing`.
    pub fn new(condition: C) -> Self {
        Self {
            condition,
            matcher: None,
            sink: Box::new(TracingSink),
            patched: IndexMap::new(),
        }
    }

    /// Decides "already carries the condition" with `matcher` instead of
    /// equality. The appended condition is still the target condition.
    pub fn with_matcher(mut self, matcher: impl Fn(&C) -> bool + 'static) -> Self {
        self.matcher = Some(Box::new(matcher));
        self
    }

    pub fn with_sink(mut self, sink: impl ReportSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn condition(&self) -> &C {
        &self.condition
    }

    /// Aliases patched so far, per quest, in patch order.
    pub fn patched(&self) -> &IndexMap<RecordId, Vec<PatchedAlias>> {
        &self.patched
    }

    pub fn summary(&self) -> AliasPatchSummary {
        AliasPatchSummary {
            aliases: self.patched.values().map(Vec::len).sum(),
            quests: self.patched.len(),
        }
    }

    fn alias_ids_with_condition(&self, quest: &Quest<C>) -> IndexSet<u32> {
        match &self.matcher {
            Some(matcher) => aliases_with_condition(quest, |c: &C| matcher(c))
                .map(|a| a.id)
                .collect(),
            None => aliases_with_exact_condition(quest, &self.condition)
                .map(|a| a.id)
                .collect(),
        }
    }

    /// Patches the winning version of `source` in `store`.
    pub fn patch_quest<S>(&mut self, source: &Quest<C>, store: &mut S) -> QuestOutcome
    where
        S: RecordStore<Quest<C>> + ?Sized,
    {
        let required = self.alias_ids_with_condition(source);

        let Some(winning) = store.resolve(source.id()) else {
            self.sink
                .diagnostic(&format!("Unable to resolve record: {}", source.id()));
            return QuestOutcome::Unresolved;
        };

        let actual = self.alias_ids_with_condition(winning.record());
        let to_patch: IndexSet<u32> = required.difference(&actual).copied().collect();
        if to_patch.is_empty() {
            tracing::debug!("unchanged: {}", source.id());
            return QuestOutcome::Unchanged;
        }

        for id in &to_patch {
            if winning.record().alias(*id).is_none() {
                self.sink.diagnostic(&format!(
                    "Quest {} has no alias {}; skipped",
                    source.id(),
                    id
                ));
            }
        }
        if !winning
            .record()
            .aliases
            .iter()
            .any(|a| to_patch.contains(&a.id))
        {
            return QuestOutcome::Unchanged;
        }

        let quest = winning.get_or_add_as_override(store);
        let label = quest.editor_id.clone().unwrap_or_else(|| quest.id.to_string());
        self.sink.notice(&format!("Patching quest: {label}"));

        let report = self.patched.entry(quest.id.clone()).or_default();
        let mut added = 0;
        for alias in quest
            .aliases
            .iter_mut()
            .filter(|a| to_patch.contains(&a.id))
        {
            alias.conditions.push(self.condition.clone());
            self.sink.notice(&format!(
                "Added condition to alias: {}",
                alias.name.as_deref().unwrap_or_default()
            ));
            report.push(PatchedAlias {
                id: alias.id,
                name: alias.name.clone(),
            });
            added += 1;
        }
        QuestOutcome::Patched { aliases: added }
    }

    /// Patches every quest in input order and reports the totals.
    pub fn patch_all<'q, S, I>(&mut self, quests: I, store: &mut S) -> AliasPatchSummary
    where
        C: 'q,
        S: RecordStore<Quest<C>> + ?Sized,
        I: IntoIterator<Item = &'q Quest<C>>,
    {
        for quest in quests {
            self.patch_quest(quest, store);
        }
        let summary = self.summary();
        self.sink.notice(&summary.to_string());
        summary
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CompareOperator, Condition, QuestAlias};
    use patchwork_core::{LoadOrder, MemorySink, MemoryStore, Provider, ProviderListing};

    fn is_guard() -> Condition {
        Condition::new("IsGuard", CompareOperator::Equal, 1.0)
    }

    fn quest(aliases: &[(u32, bool)]) -> Quest<Condition> {
        aliases.iter().fold(Quest::new("MS01").with_editor_id("MS01"), |q, &(id, has)| {
            let alias = QuestAlias::new(id).named(format!("Alias{id}"));
            q.with_alias(if has { alias.with_condition(is_guard()) } else { alias })
        })
    }

    fn store(winning: Quest<Condition>) -> MemoryStore<Quest<Condition>> {
        MemoryStore::new(
            LoadOrder::from_listings(vec![ProviderListing::new(
                "Overhaul.esp",
                Provider::new("Overhaul.esp").with(winning),
            )]),
            "Patch.esp",
        )
    }

    #[test]
    fn missing_slots_are_reported_and_skipped() {
        let source = quest(&[(1, true), (9, true)]);
        let mut store = store(quest(&[(1, false)]));
        let sink = MemorySink::new();
        let mut patcher = AliasConditionPatcher::new(is_guard()).with_sink(sink.clone());

        assert_eq!(
            patcher.patch_quest(&source, &mut store),
            QuestOutcome::Patched { aliases: 1 }
        );
        assert_eq!(
            sink.lines(),
            [
                "Quest MS01 has no alias 9; skipped",
                "Patching quest: MS01",
                "Added condition to alias: Alias1",
            ]
        );
    }

    #[test]
    fn only_missing_slots_means_no_override() {
        let source = quest(&[(9, true)]);
        let mut store = store(quest(&[(1, false)]));
        let mut patcher = AliasConditionPatcher::new(is_guard()).with_sink(MemorySink::new());

        assert_eq!(patcher.patch_quest(&source, &mut store), QuestOutcome::Unchanged);
        assert!(store.output().is_empty());
        assert!(patcher.patched().is_empty());
    }

    #[test]
    fn summary_display() {
        let summary = AliasPatchSummary { aliases: 3, quests: 2 };
        assert_eq!(summary.to_string(), "Patched 3 aliases across 2 quests");
    }
}
