//! Quest records: ordered alias slots, each carrying ordered conditions.

use std::fmt;

use patchwork_core::{Record, RecordId};

// ---------------------------------------------------------------------------
// Quests and aliases
// ---------------------------------------------------------------------------

/// A quest record. Alias ids are unique within one quest.
#[derive(Debug, Clone, PartialEq)]
pub struct Quest<C> {
    pub id: RecordId,
    pub editor_id: Option<String>,
    pub aliases: Vec<QuestAlias<C>>,
}

impl<C> Quest<C> {
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            editor_id: None,
            aliases: Vec::new(),
        }
    }

    pub fn with_editor_id(mut self, editor_id: impl Into<String>) -> Self {
        self.editor_id = Some(editor_id.into());
        self
    }

    pub fn with_alias(mut self, alias: QuestAlias<C>) -> Self {
        self.aliases.push(alias);
        self
    }

    pub fn alias(&self, id: u32) -> Option<&QuestAlias<C>> {
        self.aliases.iter().find(|a| a.id == id)
    }

    pub fn alias_mut(&mut self, id: u32) -> Option<&mut QuestAlias<C>> {
        self.aliases.iter_mut().find(|a| a.id == id)
    }
}

impl<C: Clone> Record for Quest<C> {
    fn id(&self) -> &RecordId {
        &self.id
    }

    fn editor_id(&self) -> Option<&str> {
        self.editor_id.as_deref()
    }
}

/// One alias slot of a quest.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestAlias<C> {
    pub id: u32,
    pub name: Option<String>,
    pub conditions: Vec<C>,
}

impl<C> QuestAlias<C> {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            name: None,
            conditions: Vec::new(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_condition(mut self, condition: C) -> Self {
        self.conditions.push(condition);
        self
    }
}

// ---------------------------------------------------------------------------
// Conditions
// ---------------------------------------------------------------------------

/// Comparison applied between a condition function's result and its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOperator {
    Equal,
    NotEqual,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
}

impl fmt::Display for CompareOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CompareOperator::Equal => "==",
            CompareOperator::NotEqual => "!=",
            CompareOperator::Greater => ">",
            CompareOperator::GreaterOrEqual => ">=",
            CompareOperator::Less => "<",
            CompareOperator::LessOrEqual => "<=",
        };
        f.write_str(s)
    }
}

/// What a condition function is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RunOn {
    #[default]
    Subject,
    Target,
    Reference,
    /// Another alias of the same quest, by id.
    QuestAlias(u32),
    Player,
}

/// A condition attached to an alias: `function(run_on) operator comparison`.
///
/// Plain value type; cloning yields an independent copy.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub function: String,
    pub operator: CompareOperator,
    pub comparison: f32,
    pub run_on: RunOn,
    /// Record passed as the function's parameter, if any.
    pub reference: Option<RecordId>,
}

impl Condition {
    pub fn new(function: impl Into<String>, operator: CompareOperator, comparison: f32) -> Self {
        Self {
            function: function.into(),
            operator,
            comparison,
            run_on: RunOn::default(),
            reference: None,
        }
    }

    pub fn run_on(mut self, run_on: RunOn) -> Self {
        self.run_on = run_on;
        self
    }

    pub fn with_reference(mut self, reference: impl Into<RecordId>) -> Self {
        self.reference = Some(reference.into());
        self
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reference {
            Some(reference) => write!(f, "{}({})", self.function, reference)?,
            None => write!(f, "{}()", self.function)?,
        }
        write!(f, " {} {}", self.operator, self.comparison)
    }
}
