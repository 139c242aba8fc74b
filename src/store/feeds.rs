//! Feed and post reads and writes.
//!
//! Posts are tenant-scoped through their feed's care recipient, and mapped
//! table-per-concrete-type with exactly one author column per table. The
//! polymorphic [`PostQuery`] unions the three concrete tables without
//! expanding authors; hydrating an author is a per-variant concern, so each
//! concrete query type carries its own `include_author` join.

use chrono::{DateTime, Utc};
use rusqlite::types::Value as SqlValue;
use rusqlite::{OptionalExtension, Row, params, params_from_iter};

use super::members::{care_recipient_from_row, employee_from_row, member_from_row};
use super::session::Session;
use crate::error::{EntityError, MappingError, StoreResult};
use crate::model::{
    CareRecipientPost, EmployeePost, Feed, MemberKind, MemberPost, Post, PostKind,
};
use crate::registry::{MEMBER_FAMILY, POST_FAMILY, TableBinding};
use crate::tenant::WorkspaceId;

fn parse_created_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                idx,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
}

/// Per-table filter set for post queries; columns are qualified with `p.`
/// so the same clause works with and without an author join.
#[derive(Debug, Default, Clone, Copy)]
struct PostFilters {
    workspace: Option<WorkspaceId>,
    feed: Option<i64>,
}

impl PostFilters {
    fn to_sql(&self) -> (String, Vec<SqlValue>) {
        let mut clauses: Vec<&str> = Vec::new();
        let mut values: Vec<SqlValue> = Vec::new();

        if let Some(ws) = self.workspace {
            clauses.push("p.workspace_id = ?");
            values.push(SqlValue::Integer(ws.as_i64()));
        }
        if let Some(feed) = self.feed {
            clauses.push("p.feed_id = ?");
            values.push(SqlValue::Integer(feed));
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
    fn post_binding(&self, kind: PostKind) -> StoreResult<TableBinding> {
        Ok(self
            .store()
            .registry()
            .read()
            .binding(POST_FAMILY, kind.variant_name())?)
    }

    fn author_table(&self, kind: MemberKind) -> StoreResult<&'static str> {
        Ok(self
            .store()
            .registry()
            .read()
            .binding(MEMBER_FAMILY, kind.variant_name())?
            .table)
    }

    // ------------------------------------------------------------------
    // Feeds
    // ------------------------------------------------------------------

    /// Inserts a feed on the auto-stamping path.
    pub fn insert_feed(&self, feed: &mut Feed) -> StoreResult<()> {
        let workspace = self.stamp_tenant(&mut feed.workspace_id)?;
        self.conn().execute(
            "INSERT INTO feeds (workspace_id, care_recipient_id) VALUES (?1, ?2)",
            params![workspace.as_i64(), feed.care_recipient_id],
        )?;
        feed.id = Some(self.conn().last_insert_rowid());
        Ok(())
    }

    /// Fetches a feed by id, filtered to the active workspace.
    ///
    /// # Errors
    ///
    /// [`EntityError::NotFound`] if no row matches in the active workspace.
    pub fn feed(&self, id: i64) -> StoreResult<Feed> {
        let workspace = self.active_workspace()?;
        self.conn()
            .query_row(
                "SELECT id, workspace_id, care_recipient_id FROM feeds \
                 WHERE id = ?1 AND workspace_id = ?2",
                params![id, workspace.as_i64()],
                |row| {
                    Ok(Feed {
                        id: Some(row.get(0)?),
                        workspace_id: Some(WorkspaceId::new(row.get(1)?)),
                        care_recipient_id: row.get(2)?,
                    })
                },
            )
            .optional()?
            .ok_or_else(|| {
                EntityError::NotFound {
                    table: "feeds".to_string(),
                    id,
                }
                .into()
            })
    }

    // ------------------------------------------------------------------
    // Posts
    // ------------------------------------------------------------------

    /// Inserts a post on the auto-stamping path. The destination table is
    /// chosen by the post's concrete variant.
    pub fn insert_post(&self, post: &mut Post) -> StoreResult<()> {
        let binding = self.post_binding(post.kind())?;
        let workspace = self.stamp_tenant(post.workspace_id_mut())?;
        let table = binding.table;

        match post {
            Post::EmployeePost(p) => {
                self.conn().execute(
                    &format!(
                        "INSERT INTO {table} (workspace_id, feed_id, body, created_at, employee_id) \
                         VALUES (?1, ?2, ?3, ?4, ?5)"
                    ),
                    params![
                        workspace.as_i64(),
                        p.feed_id,
                        p.body,
                        p.created_at.to_rfc3339(),
                        p.employee_id,
                    ],
                )?;
            }
            Post::MemberPost(p) => {
                self.conn().execute(
                    &format!(
                        "INSERT INTO {table} (workspace_id, feed_id, body, created_at, member_id) \
                         VALUES (?1, ?2, ?3, ?4, ?5)"
                    ),
                    params![
                        workspace.as_i64(),
                        p.feed_id,
                        p.body,
                        p.created_at.to_rfc3339(),
                        p.member_id,
                    ],
                )?;
            }
            Post::CareRecipientPost(p) => {
                self.conn().execute(
                    &format!(
                        "INSERT INTO {table} (workspace_id, feed_id, body, created_at, care_recipient_id) \
                         VALUES (?1, ?2, ?3, ?4, ?5)"
                    ),
                    params![
                        workspace.as_i64(),
                        p.feed_id,
                        p.body,
                        p.created_at.to_rfc3339(),
                        p.care_recipient_id,
                    ],
                )?;
            }
        }
        post.set_id(self.conn().last_insert_rowid());
        Ok(())
    }

    /// Fetches one post by concrete kind and row id, filtered to the active
    /// workspace. The author is not hydrated.
    pub fn post(&self, kind: PostKind, id: i64) -> StoreResult<Post> {
        let binding = self.post_binding(kind)?;
        let workspace = self.scoped_workspace(binding.scoping)?;
        let filters = PostFilters {
            workspace,
            feed: None,
        };

        let found = match kind {
            PostKind::EmployeePost => {
                fetch_employee_posts(self, binding.table, None, filters, Some(id))?
                    .pop()
                    .map(Post::EmployeePost)
            }
            PostKind::MemberPost => {
                fetch_member_posts(self, binding.table, None, filters, Some(id))?
                    .pop()
                    .map(Post::MemberPost)
            }
            PostKind::CareRecipientPost => {
                fetch_care_recipient_posts(self, binding.table, None, filters, Some(id))?
                    .pop()
                    .map(Post::CareRecipientPost)
            }
        };

        found.ok_or_else(|| {
            EntityError::NotFound {
                table: binding.table.to_string(),
                id,
            }
            .into()
        })
    }

    /// Deletes a post by concrete kind and id, filtered to the active
    /// workspace.
    pub fn delete_post(&self, kind: PostKind, id: i64) -> StoreResult<()> {
        let binding = self.post_binding(kind)?;
        let workspace = self.active_workspace()?;
        let table = binding.table;

        let changed = self.conn().execute(
            &format!("DELETE FROM {table} WHERE id = ?1 AND workspace_id = ?2"),
            params![id, workspace.as_i64()],
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

    /// Updates a post's body, filtered to the active workspace.
    pub fn update_post(&self, post: &Post) -> StoreResult<()> {
        let binding = self.post_binding(post.kind())?;
        let workspace = self.check_tenant(post.workspace_id())?;
        let table = binding.table;
        let id = post.id().ok_or_else(|| EntityError::MissingId {
            table: table.to_string(),
        })?;

        let changed = self.conn().execute(
            &format!("UPDATE {table} SET body = ?1 WHERE id = ?2 AND workspace_id = ?3"),
            params![post.body(), id, workspace.as_i64()],
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

    /// Starts a polymorphic query over the whole post family.
    ///
    /// The union does not hydrate authors; use the concrete query types for
    /// the per-variant author join.
    pub fn posts(&self) -> PostQuery<'_, '_> {
        PostQuery {
            session: self,
            feed: None,
        }
    }

    /// Starts a concrete query over employee posts.
    pub fn employee_posts(&self) -> EmployeePostQuery<'_, '_> {
        EmployeePostQuery {
            session: self,
            feed: None,
            include_author: false,
        }
    }

    /// Starts a concrete query over member posts.
    pub fn member_posts(&self) -> MemberPostQuery<'_, '_> {
        MemberPostQuery {
            session: self,
            feed: None,
            include_author: false,
        }
    }

    /// Starts a concrete query over care recipient posts.
    pub fn care_recipient_posts(&self) -> CareRecipientPostQuery<'_, '_> {
        CareRecipientPostQuery {
            session: self,
            feed: None,
            include_author: false,
        }
    }
}

fn fetch_employee_posts(
    session: &Session<'_>,
    table: &str,
    author_table: Option<&str>,
    filters: PostFilters,
    id: Option<i64>,
) -> StoreResult<Vec<EmployeePost>> {
    let (mut where_sql, mut values) = filters.to_sql();
    if let Some(id) = id {
        let clause = if where_sql.is_empty() { " WHERE " } else { " AND " };
        where_sql.push_str(clause);
        where_sql.push_str("p.id = ?");
        values.push(SqlValue::Integer(id));
    }

    let sql = match author_table {
        Some(author) => format!(
            "SELECT p.id, p.workspace_id, p.feed_id, p.body, p.created_at, p.employee_id, \
             a.id, a.workspace_id, a.application_user_id, a.name, a.role, \
             a.special_employee_field, a.invitation_message, a.enroll_in_payroll \
             FROM {table} p JOIN {author} a ON a.id = p.employee_id{where_sql}"
        ),
        None => format!(
            "SELECT p.id, p.workspace_id, p.feed_id, p.body, p.created_at, p.employee_id \
             FROM {table} p{where_sql}"
        ),
    };

    let include_author = author_table.is_some();
    let mut stmt = session.conn().prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(values.iter()), |row| {
        Ok(EmployeePost {
            id: Some(row.get(0)?),
            workspace_id: Some(WorkspaceId::new(row.get(1)?)),
            feed_id: row.get(2)?,
            body: row.get(3)?,
            created_at: parse_created_at(row, 4)?,
            employee_id: row.get(5)?,
            employee: if include_author {
                Some(employee_from_row(row, 6)?)
            } else {
                None
            },
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

fn fetch_member_posts(
    session: &Session<'_>,
    table: &str,
    author_table: Option<&str>,
    filters: PostFilters,
    id: Option<i64>,
) -> StoreResult<Vec<MemberPost>> {
    let (mut where_sql, mut values) = filters.to_sql();
    if let Some(id) = id {
        let clause = if where_sql.is_empty() { " WHERE " } else { " AND " };
        where_sql.push_str(clause);
        where_sql.push_str("p.id = ?");
        values.push(SqlValue::Integer(id));
    }

    let sql = match author_table {
        Some(author) => format!(
            "SELECT p.id, p.workspace_id, p.feed_id, p.body, p.created_at, p.member_id, \
             a.id, a.workspace_id, a.application_user_id, a.name, a.role, \
             a.special_member_field, a.invitation_message \
             FROM {table} p JOIN {author} a ON a.id = p.member_id{where_sql}"
        ),
        None => format!(
            "SELECT p.id, p.workspace_id, p.feed_id, p.body, p.created_at, p.member_id \
             FROM {table} p{where_sql}"
        ),
    };

    let include_author = author_table.is_some();
    let mut stmt = session.conn().prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(values.iter()), |row| {
        Ok(MemberPost {
            id: Some(row.get(0)?),
            workspace_id: Some(WorkspaceId::new(row.get(1)?)),
            feed_id: row.get(2)?,
            body: row.get(3)?,
            created_at: parse_created_at(row, 4)?,
            member_id: row.get(5)?,
            member: if include_author {
                Some(member_from_row(row, 6)?)
            } else {
                None
            },
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

fn fetch_care_recipient_posts(
    session: &Session<'_>,
    table: &str,
    author_table: Option<&str>,
    filters: PostFilters,
    id: Option<i64>,
) -> StoreResult<Vec<CareRecipientPost>> {
    let (mut where_sql, mut values) = filters.to_sql();
    if let Some(id) = id {
        let clause = if where_sql.is_empty() { " WHERE " } else { " AND " };
        where_sql.push_str(clause);
        where_sql.push_str("p.id = ?");
        values.push(SqlValue::Integer(id));
    }

    let sql = match author_table {
        Some(author) => format!(
            "SELECT p.id, p.workspace_id, p.feed_id, p.body, p.created_at, p.care_recipient_id, \
             a.id, a.workspace_id, a.application_user_id, a.name, a.role, \
             a.special_care_recipient_field \
             FROM {table} p JOIN {author} a ON a.id = p.care_recipient_id{where_sql}"
        ),
        None => format!(
            "SELECT p.id, p.workspace_id, p.feed_id, p.body, p.created_at, p.care_recipient_id \
             FROM {table} p{where_sql}"
        ),
    };

    let include_author = author_table.is_some();
    let mut stmt = session.conn().prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(values.iter()), |row| {
        Ok(CareRecipientPost {
            id: Some(row.get(0)?),
            workspace_id: Some(WorkspaceId::new(row.get(1)?)),
            feed_id: row.get(2)?,
            body: row.get(3)?,
            created_at: parse_created_at(row, 4)?,
            care_recipient_id: row.get(5)?,
            care_recipient: if include_author {
                Some(care_recipient_from_row(row, 6)?)
            } else {
                None
            },
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Polymorphic query over the post family.
///
/// Authors are never hydrated here: "include related" differs per concrete
/// type, so it lives on the concrete query types instead.
#[derive(Debug)]
pub struct PostQuery<'q, 's> {
    session: &'q Session<'s>,
    feed: Option<i64>,
}

impl PostQuery<'_, '_> {
    /// Restricts the union to posts of one feed.
    pub fn in_feed(mut self, feed_id: i64) -> Self {
        self.feed = Some(feed_id);
        self
    }

    /// Executes the union, reconstructing each row to its concrete type.
    pub fn fetch(self) -> StoreResult<Vec<Post>> {
        let bindings: Vec<TableBinding> = self
            .session
            .store()
            .registry()
            .read()
            .family(POST_FAMILY)?
            .to_vec();

        let mut results: Vec<Post> = Vec::new();
        for binding in bindings {
            let filters = PostFilters {
                workspace: self.session.scoped_workspace(binding.scoping)?,
                feed: self.feed,
            };
            match binding.variant {
                "employee_post" => results.extend(
                    fetch_employee_posts(self.session, binding.table, None, filters, None)?
                        .into_iter()
                        .map(Post::EmployeePost),
                ),
                "member_post" => results.extend(
                    fetch_member_posts(self.session, binding.table, None, filters, None)?
                        .into_iter()
                        .map(Post::MemberPost),
                ),
                "care_recipient_post" => results.extend(
                    fetch_care_recipient_posts(self.session, binding.table, None, filters, None)?
                        .into_iter()
                        .map(Post::CareRecipientPost),
                ),
                variant => {
                    return Err(MappingError::UnmappedType {
                        family: POST_FAMILY,
                        variant,
                    }
                    .into());
                }
            }
        }
        tracing::debug!(rows = results.len(), feed = ?self.feed, "post union fetched");
        Ok(results)
    }

    /// Counts matching rows across all concrete tables.
    pub fn count(self) -> StoreResult<u64> {
        let bindings: Vec<TableBinding> = self
            .session
            .store()
            .registry()
            .read()
            .family(POST_FAMILY)?
            .to_vec();

        let mut total: u64 = 0;
        for binding in bindings {
            let filters = PostFilters {
                workspace: self.session.scoped_workspace(binding.scoping)?,
                feed: self.feed,
            };
            let (where_sql, values) = filters.to_sql();
            let table = binding.table;
            let count: i64 = self.session.conn().query_row(
                &format!("SELECT COUNT(*) FROM {table} p{where_sql}"),
                params_from_iter(values.iter()),
                |row| row.get(0),
            )?;
            total += count as u64;
        }
        Ok(total)
    }
}

/// Concrete query over employee posts, with an optional author join.
#[derive(Debug)]
pub struct EmployeePostQuery<'q, 's> {
    session: &'q Session<'s>,
    feed: Option<i64>,
    include_author: bool,
}

impl EmployeePostQuery<'_, '_> {
    /// Restricts to posts of one feed.
    pub fn in_feed(mut self, feed_id: i64) -> Self {
        self.feed = Some(feed_id);
        self
    }

    /// Hydrates the authoring employee on each returned post.
    pub fn include_author(mut self) -> Self {
        self.include_author = true;
        self
    }

    /// Executes the query.
    pub fn fetch(self) -> StoreResult<Vec<EmployeePost>> {
        let binding = self
            .session
            .store()
            .registry()
            .read()
            .binding(POST_FAMILY, PostKind::EmployeePost.variant_name())?;
        let author_table = if self.include_author {
            Some(self.session.author_table(MemberKind::Employee)?)
        } else {
            None
        };
        let filters = PostFilters {
            workspace: self.session.scoped_workspace(binding.scoping)?,
            feed: self.feed,
        };
        fetch_employee_posts(self.session, binding.table, author_table, filters, None)
    }
}

/// Concrete query over member posts, with an optional author join.
#[derive(Debug)]
pub struct MemberPostQuery<'q, 's> {
    session: &'q Session<'s>,
    feed: Option<i64>,
    include_author: bool,
}

impl MemberPostQuery<'_, '_> {
    /// Restricts to posts of one feed.
    pub fn in_feed(mut self, feed_id: i64) -> Self {
        self.feed = Some(feed_id);
        self
    }

    /// Hydrates the authoring member on each returned post.
    pub fn include_author(mut self) -> Self {
        self.include_author = true;
        self
    }

    /// Executes the query.
    pub fn fetch(self) -> StoreResult<Vec<MemberPost>> {
        let binding = self
            .session
            .store()
            .registry()
            .read()
            .binding(POST_FAMILY, PostKind::MemberPost.variant_name())?;
        let author_table = if self.include_author {
            Some(self.session.author_table(MemberKind::Member)?)
        } else {
            None
        };
        let filters = PostFilters {
            workspace: self.session.scoped_workspace(binding.scoping)?,
            feed: self.feed,
        };
        fetch_member_posts(self.session, binding.table, author_table, filters, None)
    }
}

/// Concrete query over care recipient posts, with an optional author join.
#[derive(Debug)]
pub struct CareRecipientPostQuery<'q, 's> {
    session: &'q Session<'s>,
    feed: Option<i64>,
    include_author: bool,
}

impl CareRecipientPostQuery<'_, '_> {
    /// Restricts to posts of one feed.
    pub fn in_feed(mut self, feed_id: i64) -> Self {
        self.feed = Some(feed_id);
        self
    }

    /// Hydrates the authoring care recipient on each returned post.
    pub fn include_author(mut self) -> Self {
        self.include_author = true;
        self
    }

    /// Executes the query.
    pub fn fetch(self) -> StoreResult<Vec<CareRecipientPost>> {
        let binding = self
            .session
            .store()
            .registry()
            .read()
            .binding(POST_FAMILY, PostKind::CareRecipientPost.variant_name())?;
        let author_table = if self.include_author {
            Some(self.session.author_table(MemberKind::CareRecipient)?)
        } else {
            None
        };
        let filters = PostFilters {
            workspace: self.session.scoped_workspace(binding.scoping)?,
            feed: self.feed,
        };
        fetch_care_recipient_posts(self.session, binding.table, author_table, filters, None)
    }
}
