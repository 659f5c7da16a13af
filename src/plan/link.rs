//! Link kinds and child-list selection.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Relation under which a freshly opened scope is attached to its parent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    /// Run after the previous step
    #[default]
    Sequential,
    /// Run alongside sibling steps
    Parallel,
    /// Fire and continue without waiting
    Background,
    /// Sequential, emitted by the engine in reverse order
    SequentialReversed,
}

impl LinkKind {
    /// Child list that hosts nodes created under this link.
    pub fn child_list(&self) -> ChildList {
        match self {
            LinkKind::Parallel => ChildList::Parallel,
            LinkKind::Background => ChildList::Background,
            LinkKind::Sequential | LinkKind::SequentialReversed => ChildList::Sequential,
        }
    }

    pub fn all() -> &'static [LinkKind] {
        &[
            LinkKind::Sequential,
            LinkKind::Parallel,
            LinkKind::Background,
            LinkKind::SequentialReversed,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LinkKind::Sequential => "SEQUENTIAL",
            LinkKind::Parallel => "PARALLEL",
            LinkKind::Background => "BACKGROUND",
            LinkKind::SequentialReversed => "SEQUENTIAL_REVERSED",
        }
    }
}

impl std::fmt::Display for LinkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LinkKind {
    type Err = Error;

    /// Accepts both the descriptive names and the engine's short tokens
    /// (`THEN`, `AND`, `IN_BACKGROUND`, `THEN_REVERSED`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SEQUENTIAL" | "THEN" => Ok(LinkKind::Sequential),
            "PARALLEL" | "AND" => Ok(LinkKind::Parallel),
            "BACKGROUND" | "IN_BACKGROUND" => Ok(LinkKind::Background),
            "SEQUENTIAL_REVERSED" | "THEN_REVERSED" => Ok(LinkKind::SequentialReversed),
            _ => Err(Error::unknown_link_kind(s)),
        }
    }
}

/// One of the three child lists of an [`ExecutionNode`](super::ExecutionNode).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChildList {
    Sequential,
    Parallel,
    Background,
}
