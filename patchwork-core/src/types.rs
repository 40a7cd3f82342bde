//! Domain types shared by every patchwork crate.
//!
//! Identity newtypes follow one shape: a public `String` payload, `Display`
//! forwarding, and `From<String>` / `From<&str>` conversions.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Stable identity of a record, unique within a record store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId(pub String);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Reference to a data provider (one layer of the load order).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProviderKey(pub String);

impl ProviderKey {
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ProviderKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProviderKey {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Record capability
// ---------------------------------------------------------------------------

/// An immutable snapshot of one domain entity.
///
/// `Clone` is how overrides are created: the output catalog stores a deep copy
/// of the winning record and hands out mutable access to that copy.
pub trait Record: Clone {
    fn id(&self) -> &RecordId;

    /// Human-readable identifier used in progress lines, if the record has one.
    fn editor_id(&self) -> Option<&str> {
        None
    }
}

/// Formats the standard progress line for an applied patch:
/// `Patched {TAG}:{id}({editor_id})`.
pub fn progress_line<R: Record>(tag: &str, record: &R) -> String {
    format!(
        "Patched {tag}:{}({})",
        record.id(),
        record.editor_id().unwrap_or_default()
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
