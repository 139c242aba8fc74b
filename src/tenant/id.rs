//! Workspace identifier type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An opaque identifier for a workspace (the unit of tenant isolation).
///
/// Workspace ids are assigned by the store when a [`Workspace`] row is
/// inserted, and are what tenant-scoped rows carry in their `workspace_id`
/// column. The id is deliberately a thin wrapper over the underlying row id
/// so that it can be compared and stamped without any lookup.
///
/// [`Workspace`]: crate::model::Workspace
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkspaceId(i64);

impl WorkspaceId {
    /// Creates a workspace id from a raw row id.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw row id.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WorkspaceId({})", self.0)
    }
}

impl From<i64> for WorkspaceId {
    fn from(id: i64) -> Self {
        Self::new(id)
    }
}

impl From<WorkspaceId> for i64 {
    fn from(id: WorkspaceId) -> Self {
        id.0
    }
}
