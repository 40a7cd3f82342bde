//! Record contexts: a resolved record bound to the provider that supplied it.
//!
//! The lookup helpers operate on an ordered slice of contexts for one record
//! identity, winning context first (the order [`MemoryStore::contexts`]
//! returns). The first match in slice order wins, which is the most recent
//! provider in the load order.
//!
//! [`MemoryStore::contexts`]: crate::store::MemoryStore::contexts

use regex::Regex;

use crate::store::OverrideCatalog;
use crate::types::{ProviderKey, Record, RecordId};

/// Handle to one resolved record and the provider chain behind it.
pub trait RecordContext {
    type Record: Record;

    /// The resolved, immutable record.
    fn record(&self) -> &Self::Record;

    /// Provider that supplied this version of the record.
    fn provider(&self) -> &ProviderKey;

    /// Ancestry query: is this record nested inside `container`?
    fn is_child_of(&self, container: &RecordId) -> bool;

    /// Returns the override of this record owned by `catalog`, creating it from
    /// the resolved record on first access.
    fn get_or_add_as_override<'c, K>(&self, catalog: &'c mut K) -> &'c mut Self::Record
    where
        K: OverrideCatalog<Self::Record> + ?Sized,
    {
        catalog.get_or_add_override(self.record())
    }
}

/// Owned record context produced by the in-memory store.
#[derive(Debug, Clone, PartialEq)]
pub struct ModContext<R> {
    pub record: R,
    pub provider: ProviderKey,
    /// Container chain, innermost first.
    pub parents: Vec<RecordId>,
}

impl<R> ModContext<R> {
    pub fn new(record: R, provider: ProviderKey) -> Self {
        Self {
            record,
            provider,
            parents: Vec::new(),
        }
    }

    pub fn with_parents(mut self, parents: Vec<RecordId>) -> Self {
        self.parents = parents;
        self
    }
}

impl<R: Record> RecordContext for ModContext<R> {
    type Record = R;

    fn record(&self) -> &R {
        &self.record
    }

    fn provider(&self) -> &ProviderKey {
        &self.provider
    }

    fn is_child_of(&self, container: &RecordId) -> bool {
        self.parents.iter().any(|p| p == container)
    }
}

// ---------------------------------------------------------------------------
// Provider lookups
// ---------------------------------------------------------------------------

/// Finds the context supplied by exactly `key`.
pub fn find_provider_context<'a, C: RecordContext>(
    contexts: &'a [C],
    key: &ProviderKey,
) -> Option<&'a C> {
    contexts.iter().find(|c| c.provider() == key)
}

/// True if any context was supplied by exactly `key`.
pub fn has_provider_context<C: RecordContext>(contexts: &[C], key: &ProviderKey) -> bool {
    find_provider_context(contexts, key).is_some()
}

/// Per-char uppercase, kept only when it maps to exactly one char. Lengths
/// never change, so `İ` stays distinct from `i\u{307}`.
fn fold_case(s: &str) -> String {
    s.chars()
        .map(|c| {
            let mut upper = c.to_uppercase();
            match (upper.next(), upper.next()) {
                (Some(u), None) => u,
                _ => c,
            }
        })
        .collect()
}

/// Finds the first context whose provider name contains `needle`.
///
/// Case-insensitive matching folds each char on its own; multi-char case
/// mappings such as `ß` → `SS` do not apply.
pub fn find_provider_context_containing<'a, C: RecordContext>(
    contexts: &'a [C],
    needle: &str,
    case_sensitive: bool,
) -> Option<&'a C> {
    if case_sensitive {
        return contexts.iter().find(|c| c.provider().name().contains(needle));
    }
    let needle = fold_case(needle);
    contexts
        .iter()
        .find(|c| fold_case(c.provider().name()).contains(&needle))
}

/// True if any provider name contains `needle`.
pub fn has_provider_context_containing<C: RecordContext>(
    contexts: &[C],
    needle: &str,
    case_sensitive: bool,
) -> bool {
    find_provider_context_containing(contexts, needle, case_sensitive).is_some()
}

/// Finds the first context whose provider name matches `pattern`.
pub fn find_provider_context_matching<'a, C: RecordContext>(
    contexts: &'a [C],
    pattern: &Regex,
) -> Option<&'a C> {
    contexts.iter().find(|c| pattern.is_match(c.provider().name()))
}

/// True if any provider name matches `pattern`.
pub fn has_provider_context_matching<C: RecordContext>(contexts: &[C], pattern: &Regex) -> bool {
    find_provider_context_matching(contexts, pattern).is_some()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[derive(Debug, Clone, PartialEq)]
    struct Npc {
        id: RecordId,
        level: u16,
    }

    impl Record for Npc {
        fn id(&self) -> &RecordId {
            &self.id
        }
    }

    fn ctx(provider: &str, level: u16) -> ModContext<Npc> {
        ModContext::new(
            Npc { id: RecordId::from("013BBF"), level },
            ProviderKey::from(provider),
        )
    }

    /// Winning first, as the store returns them.
    fn chain() -> Vec<ModContext<Npc>> {
        vec![
            ctx("USSEP.esp", 30),
            ctx("Dawnguard.esm", 20),
            ctx("Update.esm", 10),
            ctx("Skyrim.esm", 5),
        ]
    }

    #[test]
    fn exact_key_lookup() {
        let contexts = chain();
        let found =
            find_provider_context(&contexts, &ProviderKey::from("Update.esm")).expect("found");
        assert_eq!(found.record.level, 10);
        assert!(!has_provider_context(&contexts, &ProviderKey::from("Dragonborn.esm")));
    }

    #[rstest]
    #[case("esm", false, Some(20))]
    #[case("ESM", false, Some(20))]
    #[case("ESM", true, None)]
    #[case("ussep", false, Some(30))]
    #[case("ussep", true, None)]
    #[case("Hearthfire", false, None)]
    fn substring_lookup(
        #[case] needle: &str,
        #[case] case_sensitive: bool,
        #[case] level: Option<u16>,
    ) {
        let contexts = chain();
        let found = find_provider_context_containing(&contexts, needle, case_sensitive);
        assert_eq!(found.map(|c| c.record.level), level);
        assert_eq!(
            has_provider_context_containing(&contexts, needle, case_sensitive),
            level.is_some()
        );
    }

    #[rstest]
    #[case("İstanbul.esp", "i\u{307}s", false)]
    #[case("İstanbul.esp", "İST", true)]
    #[case("Straße.esp", "STRASSE", false)]
    #[case("Straße.esp", "STRAßE", true)]
    #[case("Ærø.esp", "ærø", true)]
    fn case_folding_is_per_char(#[case] provider: &str, #[case] needle: &str, #[case] found: bool) {
        let contexts = vec![ctx(provider, 1)];
        assert_eq!(has_provider_context_containing(&contexts, needle, false), found);
    }

    #[test]
    fn regex_lookup_returns_most_recent_match() {
        let contexts = chain();
        let pattern = Regex::new(r"^(Update|Skyrim)\.esm$").expect("regex");
        let found = find_provider_context_matching(&contexts, &pattern).expect("found");
        assert_eq!(found.provider, ProviderKey::from("Update.esm"));
        let dragonborn = Regex::new("Dragonborn").expect("regex");
        assert!(!has_provider_context_matching(&contexts, &dragonborn));
    }

    #[test]
    fn ancestry_query() {
        let context = ctx("Skyrim.esm", 1).with_parents(vec![RecordId::from("Tamriel")]);
        assert!(context.is_child_of(&RecordId::from("Tamriel")));
        assert!(!context.is_child_of(&RecordId::from("Solstheim")));
    }
}
