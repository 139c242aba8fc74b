//! Scoping model definitions.
//!
//! This module defines how an entity family relates to tenant isolation.
//! Each table binding in the TPC registry carries a [`Scoping`] value, and
//! the session's read and write paths consult it to decide whether to filter
//! and stamp.

use serde::{Deserialize, Serialize};

/// How rows of a table relate to workspaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Scoping {
    /// Rows belong to exactly one workspace.
    ///
    /// Reads add a `workspace_id = <active>` predicate to every concrete
    /// table before the union, and writes stamp the active workspace onto
    /// new rows. This is the default for workspace data (members, feeds,
    /// posts).
    #[default]
    TenantScoped,

    /// Rows are shared across all workspaces.
    ///
    /// No filtering or stamping applies, and no active workspace is
    /// required. Used for identity records (application users), the
    /// workspaces themselves, and unscoped illustrative families.
    Shared,
}

impl Scoping {
    /// Returns `true` if this scoping requires tenant filtering.
    pub fn is_tenant_scoped(&self) -> bool {
        matches!(self, Scoping::TenantScoped)
    }
}
