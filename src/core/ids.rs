//! Identity types for the recipe tree.
//!
//! Draft nodes get a [`DraftId`] from a per-session [`DraftIdGen`] while they are
//! being edited. Records written to the store are addressed by [`StoredId`]. The
//! two are separate types so a draft id can never be passed where a stored id
//! is expected.

use serde::Serialize;
use std::fmt;

/// Ephemeral identity of a node in a visit draft.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DraftId(u64);

impl DraftId {
    /// Raw counter value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DraftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "draft-{}", self.0)
    }
}

/// Monotonic draft id source, one per editing session.
#[derive(Debug, Default)]
pub struct DraftIdGen {
    last: u64,
}

impl DraftIdGen {
    /// Creates a generator starting at 1.
    #[must_use]
    pub const fn new() -> Self {
        Self { last: 0 }
    }

    /// Hands out the next unused id.
    pub const fn next_id(&mut self) -> DraftId {
        self.last += 1;
        DraftId(self.last)
    }
}

/// Identity assigned by the store when a record is created.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct StoredId(i64);

impl StoredId {
    /// Wraps a primary key value.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Primary key value for queries.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for StoredId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for StoredId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
