//! Workspace member reads and writes.
//!
//! The member family is tenant-scoped and mapped table-per-concrete-type, so
//! every operation here resolves its table through the TPC registry and adds
//! the active-workspace predicate per table. The polymorphic [`MemberQuery`]
//! is logically a union: each concrete table is filtered independently, then
//! the typed rows are concatenated.

use rusqlite::types::Value as SqlValue;
use rusqlite::{OptionalExtension, Row, params, params_from_iter};

use super::session::Session;
use crate::error::{EntityError, MappingError, StoreResult};
use crate::model::{CareRecipient, Employee, EmployeeInvitation, Invitation, Member, MemberKind, WorkspaceMember};
use crate::registry::{MEMBER_FAMILY, TableBinding};
use crate::tenant::WorkspaceId;

const EMPLOYEE_COLUMNS: &str =
    "id, workspace_id, application_user_id, name, role, special_employee_field, \
     invitation_message, enroll_in_payroll";
const MEMBER_COLUMNS: &str =
    "id, workspace_id, application_user_id, name, role, special_member_field, invitation_message";
const CARE_RECIPIENT_COLUMNS: &str =
    "id, workspace_id, application_user_id, name, role, special_care_recipient_field";

pub(super) fn employee_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Employee> {
    let invitation_message: Option<String> = row.get(offset + 6)?;
    let enroll_in_payroll: Option<bool> = row.get(offset + 7)?;
    Ok(Employee {
        id: Some(row.get(offset)?),
        workspace_id: Some(WorkspaceId::new(row.get(offset + 1)?)),
        application_user_id: row.get(offset + 2)?,
        name: row.get(offset + 3)?,
        role: row.get(offset + 4)?,
        special_employee_field: row.get(offset + 5)?,
        invitation: invitation_message.map(|message| EmployeeInvitation {
            message,
            enroll_in_payroll: enroll_in_payroll.unwrap_or(false),
        }),
    })
}

pub(super) fn member_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Member> {
    let invitation_message: Option<String> = row.get(offset + 6)?;
    Ok(Member {
        id: Some(row.get(offset)?),
        workspace_id: Some(WorkspaceId::new(row.get(offset + 1)?)),
        application_user_id: row.get(offset + 2)?,
        name: row.get(offset + 3)?,
        role: row.get(offset + 4)?,
        special_member_field: row.get(offset + 5)?,
        invitation: invitation_message.map(Invitation::new),
    })
}

pub(super) fn care_recipient_from_row(
    row: &Row<'_>,
    offset: usize,
) -> rusqlite::Result<CareRecipient> {
    Ok(CareRecipient {
        id: Some(row.get(offset)?),
        workspace_id: Some(WorkspaceId::new(row.get(offset + 1)?)),
        application_user_id: row.get(offset + 2)?,
        name: row.get(offset + 3)?,
        role: row.get(offset + 4)?,
        special_care_recipient_field: row.get(offset + 5)?,
    })
}

/// Per-table filter set, pushed down before the union.
#[derive(Debug, Default, Clone)]
struct MemberFilters {
    workspace: Option<WorkspaceId>,
    name: Option<String>,
    role: Option<String>,
}

impl MemberFilters {
    fn to_sql(&self) -> (String, Vec<SqlValue>) {
        let mut clauses: Vec<&str> = Vec::new();
        let mut values: Vec<SqlValue> = Vec::new();

        if let Some(ws) = self.workspace {
            clauses.push("workspace_id = ?");
            values.push(SqlValue::Integer(ws.as_i64()));
        }
        if let Some(name) = &self.name {
            clauses.push("name = ?");
            values.push(SqlValue::Text(name.clone()));
        }
        if let Some(role) = &self.role {
            clauses.push("role = ?");
            values.push(SqlValue::Text(role.clone()));
        }

        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };
        (where_sql, values)
    }
}

impl Session<'_> {
    fn member_binding(&self, kind: MemberKind) -> StoreResult<TableBinding> {
        Ok(self
            .store()
            .registry()
            .read()
            .binding(MEMBER_FAMILY, kind.variant_name())?)
    }

    /// Inserts a member on the auto-stamping path.
    ///
    /// An unset tenant key is stamped with the active workspace; a pre-set
    /// key that differs fails with `TenantMismatch`. The generated row id is
    /// written back into the entity.
    pub fn insert_member(&self, member: &mut WorkspaceMember) -> StoreResult<()> {
        let binding = self.member_binding(member.kind())?;
        let workspace = self.stamp_tenant(member.workspace_id_mut())?;
        self.insert_member_row(member, binding, workspace)
    }

    /// Inserts a member, bypassing tenant stamping entirely.
    ///
    /// The escape hatch for cross-tenant bootstrap: creating the first member
    /// of a brand-new workspace, when no context can belong to it yet. The
    /// caller must have set the tenant key explicitly on the entity; nothing
    /// is filtered or stamped, and no active workspace is required.
    pub fn insert_member_bypassing_tenancy(&self, member: &mut WorkspaceMember) -> StoreResult<()> {
        let binding = self.member_binding(member.kind())?;
        let workspace = Self::explicit_tenant(member.workspace_id())?;
        tracing::debug!(%workspace, kind = ?member.kind(), "bypass insert of workspace member");
        self.insert_member_row(member, binding, workspace)
    }

    fn insert_member_row(
        &self,
        member: &mut WorkspaceMember,
        binding: TableBinding,
        workspace: WorkspaceId,
    ) -> StoreResult<()> {
        let table = binding.table;
        match member {
            WorkspaceMember::Employee(e) => {
                self.conn().execute(
                    &format!(
                        "INSERT INTO {table} (workspace_id, application_user_id, name, role, \
                         special_employee_field, invitation_message, enroll_in_payroll) \
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
                    ),
                    params![
                        workspace.as_i64(),
                        e.application_user_id,
                        e.name,
                        e.role,
                        e.special_employee_field,
                        e.invitation.as_ref().map(|i| i.message.as_str()),
                        e.invitation.as_ref().map(|i| i.enroll_in_payroll),
                    ],
                )?;
            }
            WorkspaceMember::Member(m) => {
                self.conn().execute(
                    &format!(
                        "INSERT INTO {table} (workspace_id, application_user_id, name, role, \
                         special_member_field, invitation_message) \
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6)"
                    ),
                    params![
                        workspace.as_i64(),
                        m.application_user_id,
                        m.name,
                        m.role,
                        m.special_member_field,
                        m.invitation.as_ref().map(|i| i.message.as_str()),
                    ],
                )?;
            }
            WorkspaceMember::CareRecipient(c) => {
                self.conn().execute(
                    &format!(
                        "INSERT INTO {table} (workspace_id, application_user_id, name, role, \
                         special_care_recipient_field) \
                         VALUES (?1, ?2, ?3, ?4, ?5)"
                    ),
                    params![
                        workspace.as_i64(),
                        c.application_user_id,
                        c.name,
                        c.role,
                        c.special_care_recipient_field,
                    ],
                )?;
            }
        }
        member.set_id(self.conn().last_insert_rowid());
        Ok(())
    }

    /// Fetches one member by concrete kind and row id, filtered to the
    /// active workspace.
    ///
    /// Ids are unique per concrete table only, which is why the kind is part
    /// of the lookup key.
    ///
    /// # Errors
    ///
    /// [`EntityError::NotFound`] if no row matches in the active workspace.
    pub fn member(&self, kind: MemberKind, id: i64) -> StoreResult<WorkspaceMember> {
        let binding = self.member_binding(kind)?;
        let workspace = self
            .scoped_workspace(binding.scoping)?
            .map(|w| w.as_i64());
        let table = binding.table;

        let fetched = match kind {
            MemberKind::Employee => self
                .conn()
                .query_row(
                    &format!(
                        "SELECT {EMPLOYEE_COLUMNS} FROM {table} WHERE id = ?1 AND workspace_id = ?2"
                    ),
                    params![id, workspace],
                    |row| employee_from_row(row, 0),
                )
                .optional()?
                .map(WorkspaceMember::Employee),
            MemberKind::Member => self
                .conn()
                .query_row(
                    &format!(
                        "SELECT {MEMBER_COLUMNS} FROM {table} WHERE id = ?1 AND workspace_id = ?2"
                    ),
                    params![id, workspace],
                    |row| member_from_row(row, 0),
                )
                .optional()?
                .map(WorkspaceMember::Member),
            MemberKind::CareRecipient => self
                .conn()
                .query_row(
                    &format!(
                        "SELECT {CARE_RECIPIENT_COLUMNS} FROM {table} \
                         WHERE id = ?1 AND workspace_id = ?2"
                    ),
                    params![id, workspace],
                    |row| care_recipient_from_row(row, 0),
                )
                .optional()?
                .map(WorkspaceMember::CareRecipient),
        };

        fetched.ok_or_else(|| {
            EntityError::NotFound {
                table: table.to_string(),
                id,
            }
            .into()
        })
    }

    /// Updates a member row, filtered to the active workspace.
    ///
    /// The entity's tenant key must be unset or equal to the active
    /// workspace; a differing key fails with `TenantMismatch` before any SQL
    /// runs.
    pub fn update_member(&self, member: &WorkspaceMember) -> StoreResult<()> {
        let binding = self.member_binding(member.kind())?;
        let workspace = self.check_tenant(member.workspace_id())?;
        let table = binding.table;
        let id = member.id().ok_or_else(|| EntityError::MissingId {
            table: table.to_string(),
        })?;

        let changed = match member {
            WorkspaceMember::Employee(e) => self.conn().execute(
                &format!(
                    "UPDATE {table} SET application_user_id = ?1, name = ?2, role = ?3, \
                     special_employee_field = ?4, invitation_message = ?5, enroll_in_payroll = ?6 \
                     WHERE id = ?7 AND workspace_id = ?8"
                ),
                params![
                    e.application_user_id,
                    e.name,
                    e.role,
                    e.special_employee_field,
                    e.invitation.as_ref().map(|i| i.message.as_str()),
                    e.invitation.as_ref().map(|i| i.enroll_in_payroll),
                    id,
                    workspace.as_i64(),
                ],
            )?,
            WorkspaceMember::Member(m) => self.conn().execute(
                &format!(
                    "UPDATE {table} SET application_user_id = ?1, name = ?2, role = ?3, \
                     special_member_field = ?4, invitation_message = ?5 \
                     WHERE id = ?6 AND workspace_id = ?7"
                ),
                params![
                    m.application_user_id,
                    m.name,
                    m.role,
                    m.special_member_field,
                    m.invitation.as_ref().map(|i| i.message.as_str()),
                    id,
                    workspace.as_i64(),
                ],
            )?,
            WorkspaceMember::CareRecipient(c) => self.conn().execute(
                &format!(
                    "UPDATE {table} SET application_user_id = ?1, name = ?2, role = ?3, \
                     special_care_recipient_field = ?4 \
                     WHERE id = ?5 AND workspace_id = ?6"
                ),
                params![
                    c.application_user_id,
                    c.name,
                    c.role,
                    c.special_care_recipient_field,
                    id,
                    workspace.as_i64(),
                ],
            )?,
        };

        if changed == 0 {
            return Err(EntityError::NotFound {
                table: table.to_string(),
                id,
            }
            .into());
        }
        Ok(())
    }

    /// Deletes a member row by concrete kind and id, filtered to the active
    /// workspace.
    pub fn delete_member(&self, kind: MemberKind, id: i64) -> StoreResult<()> {
        let binding = self.member_binding(kind)?;
        let workspace = self
            .scoped_workspace(binding.scoping)?
            .map(|w| w.as_i64());
        let table = binding.table;

        let changed = self.conn().execute(
            &format!("DELETE FROM {table} WHERE id = ?1 AND workspace_id = ?2"),
            params![id, workspace],
        )?;

        if changed == 0 {
            return Err(EntityError::NotFound {
                table: table.to_string(),
                id,
            }
            .into());
        }
        Ok(())
    }

    /// Fetches all employees in the active workspace.
    pub fn employees(&self) -> StoreResult<Vec<Employee>> {
        let binding = self.member_binding(MemberKind::Employee)?;
        let filters = MemberFilters {
            workspace: self.scoped_workspace(binding.scoping)?,
            ..Default::default()
        };
        fetch_employees(self, binding.table, &filters)
    }

    /// Fetches all members in the active workspace.
    pub fn family_members(&self) -> StoreResult<Vec<Member>> {
        let binding = self.member_binding(MemberKind::Member)?;
        let filters = MemberFilters {
            workspace: self.scoped_workspace(binding.scoping)?,
            ..Default::default()
        };
        fetch_members(self, binding.table, &filters)
    }

    /// Fetches all care recipients in the active workspace.
    pub fn care_recipients(&self) -> StoreResult<Vec<CareRecipient>> {
        let binding = self.member_binding(MemberKind::CareRecipient)?;
        let filters = MemberFilters {
            workspace: self.scoped_workspace(binding.scoping)?,
            ..Default::default()
        };
        fetch_care_recipients(self, binding.table, &filters)
    }

    /// Starts a polymorphic query over the whole member family.
    pub fn members(&self) -> MemberQuery<'_, '_> {
        MemberQuery {
            session: self,
            name: None,
            role: None,
            order_by_name: false,
        }
    }
}

fn fetch_employees(
    session: &Session<'_>,
    table: &str,
    filters: &MemberFilters,
) -> StoreResult<Vec<Employee>> {
    let (where_sql, values) = filters.to_sql();
    let mut stmt = session
        .conn()
        .prepare(&format!("SELECT {EMPLOYEE_COLUMNS} FROM {table}{where_sql}"))?;
    let rows = stmt.query_map(params_from_iter(values.iter()), |row| {
        employee_from_row(row, 0)
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

fn fetch_members(
    session: &Session<'_>,
    table: &str,
    filters: &MemberFilters,
) -> StoreResult<Vec<Member>> {
    let (where_sql, values) = filters.to_sql();
    let mut stmt = session
        .conn()
        .prepare(&format!("SELECT {MEMBER_COLUMNS} FROM {table}{where_sql}"))?;
    let rows = stmt.query_map(params_from_iter(values.iter()), |row| {
        member_from_row(row, 0)
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

fn fetch_care_recipients(
    session: &Session<'_>,
    table: &str,
    filters: &MemberFilters,
) -> StoreResult<Vec<CareRecipient>> {
    let (where_sql, values) = filters.to_sql();
    let mut stmt = session.conn().prepare(&format!(
        "SELECT {CARE_RECIPIENT_COLUMNS} FROM {table}{where_sql}"
    ))?;
    let rows = stmt.query_map(params_from_iter(values.iter()), |row| {
        care_recipient_from_row(row, 0)
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Polymorphic query over the member family.
///
/// Filters apply to base-common fields and are pushed down to every concrete
/// table before the union. Without [`order_by_name`](Self::order_by_name) the
/// result has no guaranteed cross-table order.
#[derive(Debug)]
pub struct MemberQuery<'q, 's> {
    session: &'q Session<'s>,
    name: Option<String>,
    role: Option<String>,
    order_by_name: bool,
}

impl MemberQuery<'_, '_> {
    /// Filters on the base-common `name` field.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Filters on the base-common `role` field.
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Requests an explicit cross-table sort by name.
    pub fn order_by_name(mut self) -> Self {
        self.order_by_name = true;
        self
    }

    /// Executes the union, reconstructing each row to its concrete type.
    pub fn fetch(self) -> StoreResult<Vec<WorkspaceMember>> {
        let bindings: Vec<TableBinding> = self
            .session
            .store()
            .registry()
            .read()
            .family(MEMBER_FAMILY)?
            .to_vec();

        let mut results: Vec<WorkspaceMember> = Vec::new();
        for binding in bindings {
            let filters = MemberFilters {
                workspace: self.session.scoped_workspace(binding.scoping)?,
                name: self.name.clone(),
                role: self.role.clone(),
            };
            match binding.variant {
                "employee" => results.extend(
                    fetch_employees(self.session, binding.table, &filters)?
                        .into_iter()
                        .map(WorkspaceMember::Employee),
                ),
                "member" => results.extend(
                    fetch_members(self.session, binding.table, &filters)?
                        .into_iter()
                        .map(WorkspaceMember::Member),
                ),
                "care_recipient" => results.extend(
                    fetch_care_recipients(self.session, binding.table, &filters)?
                        .into_iter()
                        .map(WorkspaceMember::CareRecipient),
                ),
                variant => {
                    return Err(MappingError::UnmappedType {
                        family: MEMBER_FAMILY,
                        variant,
                    }
                    .into());
                }
            }
        }

        if self.order_by_name {
            results.sort_by(|a, b| a.name().cmp(b.name()));
        }
        tracing::debug!(rows = results.len(), "member union fetched");
        Ok(results)
    }

    /// Counts matching rows across all concrete tables.
    pub fn count(self) -> StoreResult<u64> {
        let bindings: Vec<TableBinding> = self
            .session
            .store()
            .registry()
            .read()
            .family(MEMBER_FAMILY)?
            .to_vec();

        let mut total: u64 = 0;
        for binding in bindings {
            let filters = MemberFilters {
                workspace: self.session.scoped_workspace(binding.scoping)?,
                name: self.name.clone(),
                role: self.role.clone(),
            };
            let (where_sql, values) = filters.to_sql();
            let table = binding.table;
            let count: i64 = self.session.conn().query_row(
                &format!("SELECT COUNT(*) FROM {table}{where_sql}"),
                params_from_iter(values.iter()),
                |row| row.get(0),
            )?;
            total += count as u64;
        }
        Ok(total)
    }
}
