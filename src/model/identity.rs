//! Identity records: workspaces and application users.

use serde::{Deserialize, Serialize};

use crate::tenant::WorkspaceId;

/// A workspace: the tenant, and the unit of data isolation.
///
/// Workspaces themselves are not tenant-scoped — they are created by an
/// administrative operation that necessarily runs outside normal filtering,
/// since no context can belong to a workspace that does not yet exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    /// Row id, assigned on insert.
    pub id: Option<i64>,
    /// Human-readable workspace name.
    pub name: String,
}

impl Workspace {
    /// Creates a new workspace with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }

    /// Returns this workspace's id as a tenant key.
    ///
    /// Returns `None` until the workspace has been inserted.
    pub fn workspace_id(&self) -> Option<WorkspaceId> {
        self.id.map(WorkspaceId::new)
    }
}

/// An identity record, independent of any workspace.
///
/// Application users are never tenant-scoped: the same user may be referenced
/// by members of several different workspaces, and that reuse is intentional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationUser {
    /// Row id, assigned on insert.
    pub id: Option<i64>,
    /// Phone number in E.164 form.
    pub phone_number: String,
}

impl ApplicationUser {
    /// Creates a new application user with the given phone number.
    pub fn new(phone_number: impl Into<String>) -> Self {
        Self {
            id: None,
            phone_number: phone_number.into(),
        }
    }
}
