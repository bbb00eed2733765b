//! Space identifiers and their display names.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Identifier of a remote Slangit space (a project with its own knowledge scope).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpaceId(pub u64);

impl fmt::Display for SpaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SpaceId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(SpaceId)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceEntry {
    pub id: SpaceId,
    pub name: String,
}

impl SpaceEntry {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id: SpaceId(id),
            name: name.into(),
        }
    }
}

/// The spaces offered in the project selectors, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpaceDirectory {
    entries: Vec<SpaceEntry>,
}

impl SpaceDirectory {
    pub fn new(entries: Vec<SpaceEntry>) -> Self {
        let mut seen = std::collections::HashSet::new();
        let entries = entries
            .into_iter()
            .filter(|entry| seen.insert(entry.id))
            .collect();
        Self { entries }
    }

    pub fn builtin() -> Self {
        Self::new(builtin_spaces())
    }

    pub fn entries(&self) -> &[SpaceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Display name for a space; unknown ids fall back to `Space <id>`.
    pub fn display_name(&self, id: SpaceId) -> String {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.name.clone())
            .unwrap_or_else(|| format!("Space {id}"))
    }
}

impl Default for SpaceDirectory {
    fn default() -> Self {
        Self::builtin()
    }
}

pub fn builtin_spaces() -> Vec<SpaceEntry> {
    vec![
        SpaceEntry::new(41, "Al Bawader"),
        SpaceEntry::new(45, "3F Pharma"),
        SpaceEntry::new(46, "Al Mada"),
    ]
}
