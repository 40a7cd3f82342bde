//! Condition lookups over quest aliases.
//!
//! Predicate forms take any `Fn(&C) -> bool`; the `exact` forms compare with
//! `PartialEq`. Lookups walk quests, aliases and conditions in stored order.

use crate::error::AliasError;
use crate::types::{Quest, QuestAlias};

/// First condition on any alias of `quest` satisfying `matches`.
pub fn find_alias_condition<C, F>(quest: &Quest<C>, matches: F) -> Option<&C>
where
    F: Fn(&C) -> bool,
{
    quest
        .aliases
        .iter()
        .flat_map(|alias| alias.conditions.iter())
        .find(|c| matches(*c))
}

/// First condition on any alias of any of `quests` satisfying `matches`.
pub fn find_alias_condition_in<'q, C, I, F>(quests: I, matches: F) -> Option<&'q C>
where
    C: 'q,
    I: IntoIterator<Item = &'q Quest<C>>,
    F: Fn(&C) -> bool,
{
    quests
        .into_iter()
        .flat_map(|quest| quest.aliases.iter())
        .flat_map(|alias| alias.conditions.iter())
        .find(|c| matches(*c))
}

/// Like [`find_alias_condition_in`], but a miss is an error.
pub fn require_alias_condition<'q, C, I, F>(quests: I, matches: F) -> Result<&'q C, AliasError>
where
    C: 'q,
    I: IntoIterator<Item = &'q Quest<C>>,
    F: Fn(&C) -> bool,
{
    find_alias_condition_in(quests, matches).ok_or(AliasError::ConditionNotFound)
}

pub fn has_condition<C, F>(alias: &QuestAlias<C>, matches: F) -> bool
where
    F: Fn(&C) -> bool,
{
    alias.conditions.iter().any(matches)
}

pub fn has_exact_condition<C: PartialEq>(alias: &QuestAlias<C>, condition: &C) -> bool {
    alias.conditions.iter().any(|c| c == condition)
}

/// Aliases of `quest` carrying a condition that satisfies `matches`.
pub fn aliases_with_condition<'q, C, F>(
    quest: &'q Quest<C>,
    matches: F,
) -> impl Iterator<Item = &'q QuestAlias<C>> + 'q
where
    F: Fn(&C) -> bool + 'q,
{
    quest
        .aliases
        .iter()
        .filter(move |alias| has_condition(*alias, &matches))
}

pub fn aliases_with_exact_condition<'q, C: PartialEq>(
    quest: &'q Quest<C>,
    condition: &'q C,
) -> impl Iterator<Item = &'q QuestAlias<C>> + 'q {
    quest
        .aliases
        .iter()
        .filter(move |alias| has_exact_condition(*alias, condition))
}
