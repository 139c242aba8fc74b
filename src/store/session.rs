//! Session: one unit of work against the store.
//!
//! A session pairs one pooled connection with one [`TenantContext`]. All
//! tenant filtering and stamping happens here and in the per-family query
//! modules, visibly on the call path: reads against tenant-scoped tables ask
//! [`Session::scoped_workspace`] for the predicate value, and writes pass
//! their tenant key through [`Session::stamp_tenant`] (auto-stamping path) or
//! the explicit-key check (bypass path). There is no hidden interception to
//! toggle off; the only way around filtering is the clearly named bypass
//! insert.

use r2d2::PooledConnection;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OptionalExtension, params};

use super::SqliteStore;
use crate::error::{EntityError, StoreResult, TenantError};
use crate::model::{ApplicationUser, Workspace};
use crate::tenant::{Scoping, TenantContext, WorkspaceId};

/// One unit of work: a connection plus an active-workspace context.
///
/// Sessions are cheap to open; use a fresh one per request or per test
/// scenario. Dropping a session returns its connection to the pool with any
/// unfinished state discarded.
#[derive(Debug)]
pub struct Session<'a> {
    store: &'a SqliteStore,
    conn: PooledConnection<SqliteConnectionManager>,
    tenant: TenantContext,
}

impl<'a> Session<'a> {
    pub(super) fn new(
        store: &'a SqliteStore,
        conn: PooledConnection<SqliteConnectionManager>,
        tenant: TenantContext,
    ) -> Self {
        Self {
            store,
            conn,
            tenant,
        }
    }

    /// Sets the active workspace for this session, overwriting any prior
    /// value. This is the stub for an identity provider: nothing validates
    /// that the workspace exists until the first filtered access.
    pub fn set_workspace(&mut self, workspace: WorkspaceId) {
        tracing::debug!(%workspace, "active workspace set");
        self.tenant.set(workspace);
    }

    /// Clears the active workspace; filtered operations fail again afterwards.
    pub fn clear_workspace(&mut self) {
        self.tenant.clear();
    }

    /// Returns the active workspace.
    ///
    /// # Errors
    ///
    /// [`TenantError::NoActiveTenant`] if none was set.
    pub fn active_workspace(&self) -> StoreResult<WorkspaceId> {
        Ok(self.tenant.get()?)
    }

    pub(super) fn store(&self) -> &SqliteStore {
        self.store
    }

    pub(super) fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Returns the predicate value for a read against a table with the given
    /// scoping: the active workspace for tenant-scoped tables (failing fast
    /// when unset), `None` for shared tables.
    pub(super) fn scoped_workspace(&self, scoping: Scoping) -> StoreResult<Option<WorkspaceId>> {
        if scoping.is_tenant_scoped() {
            Ok(Some(self.tenant.get()?))
        } else {
            Ok(None)
        }
    }

    /// Checks a tenant key against the active workspace without mutating it:
    /// an unset key resolves to the active workspace, a matching key passes,
    /// a differing key is rejected (never silently overwritten).
    pub(super) fn check_tenant(&self, key: Option<WorkspaceId>) -> StoreResult<WorkspaceId> {
        let active = self.tenant.get()?;
        match key {
            None => Ok(active),
            Some(found) if found == active => Ok(active),
            Some(found) => Err(TenantError::TenantMismatch { active, found }.into()),
        }
    }

    /// Auto-stamping write path: stamps an unset tenant key with the active
    /// workspace, accepts a matching pre-set key, and rejects a differing one.
    pub(super) fn stamp_tenant(&self, key: &mut Option<WorkspaceId>) -> StoreResult<WorkspaceId> {
        let active = self.check_tenant(*key)?;
        *key = Some(active);
        Ok(active)
    }

    /// Bypass write path: requires the caller to have set an explicit tenant
    /// key. No filtering, no stamping.
    pub(super) fn explicit_tenant(key: Option<WorkspaceId>) -> StoreResult<WorkspaceId> {
        key.ok_or_else(|| TenantError::MissingTenantKey.into())
    }

    // ------------------------------------------------------------------
    // Identity records (never tenant-scoped)
    // ------------------------------------------------------------------

    /// Inserts a workspace, writing the generated id back into the entity.
    ///
    /// Creating the tenant itself necessarily runs outside tenant filtering;
    /// no active workspace is required.
    pub fn insert_workspace(&self, workspace: &mut Workspace) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO workspaces (name) VALUES (?1)",
            params![workspace.name],
        )?;
        workspace.id = Some(self.conn.last_insert_rowid());
        tracing::debug!(id = ?workspace.id, name = %workspace.name, "workspace created");
        Ok(())
    }

    /// Fetches a workspace by id.
    ///
    /// # Errors
    ///
    /// [`EntityError::NotFound`] if no such workspace exists.
    pub fn workspace(&self, id: WorkspaceId) -> StoreResult<Workspace> {
        self.conn
            .query_row(
                "SELECT id, name FROM workspaces WHERE id = ?1",
                params![id.as_i64()],
                |row| {
                    Ok(Workspace {
                        id: Some(row.get(0)?),
                        name: row.get(1)?,
                    })
                },
            )
            .optional()?
            .ok_or_else(|| {
                EntityError::NotFound {
                    table: "workspaces".to_string(),
                    id: id.as_i64(),
                }
                .into()
            })
    }

    /// Inserts an application user, writing the generated id back.
    pub fn insert_user(&self, user: &mut ApplicationUser) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO application_users (phone_number) VALUES (?1)",
            params![user.phone_number],
        )?;
        user.id = Some(self.conn.last_insert_rowid());
        Ok(())
    }

    /// Fetches an application user by id.
    ///
    /// # Errors
    ///
    /// [`EntityError::NotFound`] if no such user exists.
    pub fn user(&self, id: i64) -> StoreResult<ApplicationUser> {
        self.conn
            .query_row(
                "SELECT id, phone_number FROM application_users WHERE id = ?1",
                params![id],
                |row| {
                    Ok(ApplicationUser {
                        id: Some(row.get(0)?),
                        phone_number: row.get(1)?,
                    })
                },
            )
            .optional()?
            .ok_or_else(|| {
                EntityError::NotFound {
                    table: "application_users".to_string(),
                    id,
                }
                .into()
            })
    }
}
