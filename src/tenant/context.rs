//! Active-workspace context for storage operations.
//!
//! This module defines [`TenantContext`], the holder for the "currently
//! active" workspace of one unit of work. Every tenant-scoped read is
//! filtered by, and every tenant-scoped write is stamped with, the value held
//! here. A context belongs to exactly one [`Session`], so concurrent units of
//! work cannot share or race on the active workspace.
//!
//! [`Session`]: crate::store::Session

use super::id::WorkspaceId;
use crate::error::TenantError;

/// The active workspace for one logical unit of work.
///
/// The context starts unset. Setting it is a stub for an identity provider:
/// the caller that knows who is logged in injects the workspace here, and
/// every filtered operation afterwards reads it. An unset context makes all
/// tenant-scoped operations fail fast with [`TenantError::NoActiveTenant`]
/// rather than silently returning unscoped data.
///
/// # Examples
///
/// ```
/// use carespace_persistence::tenant::{TenantContext, WorkspaceId};
///
/// let mut ctx = TenantContext::new();
/// assert!(ctx.get().is_err());
///
/// ctx.set(WorkspaceId::new(1));
/// assert_eq!(ctx.get().unwrap(), WorkspaceId::new(1));
/// ```
#[derive(Debug, Clone, Default)]
pub struct TenantContext {
    active: Option<WorkspaceId>,
}

impl TenantContext {
    /// Creates an unset context.
    pub fn new() -> Self {
        Self { active: None }
    }

    /// Sets the active workspace, overwriting any prior value.
    ///
    /// No validation that the workspace exists happens here; validation is
    /// lazy, on the first filtered access.
    pub fn set(&mut self, workspace: WorkspaceId) {
        self.active = Some(workspace);
    }

    /// Clears the active workspace.
    pub fn clear(&mut self) {
        self.active = None;
    }

    /// Returns the active workspace.
    ///
    /// # Errors
    ///
    /// [`TenantError::NoActiveTenant`] if the context was never set (or was
    /// cleared).
    pub fn get(&self) -> Result<WorkspaceId, TenantError> {
        self.active.ok_or(TenantError::NoActiveTenant)
    }

    /// Returns `true` if an active workspace is set.
    pub fn is_set(&self) -> bool {
        self.active.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_context_fails() {
        let ctx = TenantContext::new();
        assert!(matches!(ctx.get(), Err(TenantError::NoActiveTenant)));
        assert!(!ctx.is_set());
    }

    #[test]
    fn test_set_and_get() {
        let mut ctx = TenantContext::new();
        ctx.set(WorkspaceId::new(1));
        assert_eq!(ctx.get().unwrap(), WorkspaceId::new(1));
        assert!(ctx.is_set());
    }

    #[test]
    fn test_set_overwrites() {
        let mut ctx = TenantContext::new();
        ctx.set(WorkspaceId::new(1));
        ctx.set(WorkspaceId::new(2));
        assert_eq!(ctx.get().unwrap(), WorkspaceId::new(2));
    }

    #[test]
    fn test_clear() {
        let mut ctx = TenantContext::new();
        ctx.set(WorkspaceId::new(1));
        ctx.clear();
        assert!(matches!(ctx.get(), Err(TenantError::NoActiveTenant)));
    }
}
