//! SQLite schema definitions.
//!
//! Each concrete type of a TPC family owns an independent, fully populated
//! table; there is no shared base table anywhere. Row ids autoincrement per
//! table, so id uniqueness holds within one concrete table only and two
//! concrete types may legally reuse the same numeric id.

use rusqlite::Connection;

use crate::error::StoreResult;

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 1;

/// Initializes the database schema.
pub fn initialize_schema(conn: &Connection) -> StoreResult<()> {
    let current_version = get_schema_version(conn)?;

    if current_version == 0 {
        create_schema_v1(conn)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
        tracing::info!(version = SCHEMA_VERSION, "initialized sqlite schema");
    }

    Ok(())
}

/// Returns the current schema version, 0 for a fresh database.
pub fn get_schema_version(conn: &Connection) -> StoreResult<i32> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER NOT NULL
        )",
        [],
    )?;

    let version: Option<i32> = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .ok();

    Ok(version.unwrap_or(0))
}

fn set_schema_version(conn: &Connection, version: i32) -> StoreResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

fn create_schema_v1(conn: &Connection) -> StoreResult<()> {
    // Identity records: never tenant-scoped.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS workspaces (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS application_users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            phone_number TEXT NOT NULL
        )",
        [],
    )?;

    // WorkspaceMember family. Invitations are owned 1:1 and created with the
    // member, so they live as columns of the owning concrete table.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS employees (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            workspace_id INTEGER NOT NULL REFERENCES workspaces(id),
            application_user_id INTEGER NOT NULL REFERENCES application_users(id),
            name TEXT NOT NULL,
            role TEXT NOT NULL,
            special_employee_field TEXT NOT NULL,
            invitation_message TEXT,
            enroll_in_payroll INTEGER
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS members (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            workspace_id INTEGER NOT NULL REFERENCES workspaces(id),
            application_user_id INTEGER NOT NULL REFERENCES application_users(id),
            name TEXT NOT NULL,
            role TEXT NOT NULL,
            special_member_field TEXT NOT NULL,
            invitation_message TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS care_recipients (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            workspace_id INTEGER NOT NULL REFERENCES workspaces(id),
            application_user_id INTEGER NOT NULL REFERENCES application_users(id),
            name TEXT NOT NULL,
            role TEXT NOT NULL,
            special_care_recipient_field TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS feeds (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            workspace_id INTEGER NOT NULL REFERENCES workspaces(id),
            care_recipient_id INTEGER NOT NULL REFERENCES care_recipients(id)
        )",
        [],
    )?;

    // Post family. Exactly one author column per concrete table, matching
    // the concrete type.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS employee_posts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            workspace_id INTEGER NOT NULL REFERENCES workspaces(id),
            feed_id INTEGER NOT NULL REFERENCES feeds(id),
            body TEXT NOT NULL,
            created_at TEXT NOT NULL,
            employee_id INTEGER NOT NULL REFERENCES employees(id)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS member_posts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            workspace_id INTEGER NOT NULL REFERENCES workspaces(id),
            feed_id INTEGER NOT NULL REFERENCES feeds(id),
            body TEXT NOT NULL,
            created_at TEXT NOT NULL,
            member_id INTEGER NOT NULL REFERENCES members(id)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS care_recipient_posts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            workspace_id INTEGER NOT NULL REFERENCES workspaces(id),
            feed_id INTEGER NOT NULL REFERENCES feeds(id),
            body TEXT NOT NULL,
            created_at TEXT NOT NULL,
            care_recipient_id INTEGER NOT NULL REFERENCES care_recipients(id)
        )",
        [],
    )?;

    // Animal family: unscoped, no workspace column at all.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS farm_animals (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            species TEXT NOT NULL,
            value TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS cats (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            species TEXT NOT NULL,
            name TEXT NOT NULL,
            education_level TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS dogs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            species TEXT NOT NULL,
            name TEXT NOT NULL,
            favorite_toy TEXT NOT NULL
        )",
        [],
    )?;

    // Tenant-filter predicates hit these on every scoped read.
    for table in [
        "employees",
        "members",
        "care_recipients",
        "feeds",
        "employee_posts",
        "member_posts",
        "care_recipient_posts",
    ] {
        conn.execute(
            &format!("CREATE INDEX IF NOT EXISTS idx_{table}_workspace ON {table} (workspace_id)"),
            [],
        )?;
    }

    for table in ["employee_posts", "member_posts", "care_recipient_posts"] {
        conn.execute(
            &format!("CREATE INDEX IF NOT EXISTS idx_{table}_feed ON {table} (feed_id)"),
            [],
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_conn() -> Connection {
        Connection::open_in_memory().unwrap()
    }

    #[test]
    fn test_fresh_database_reports_version_zero() {
        let conn = open_conn();
        assert_eq!(get_schema_version(&conn).unwrap(), 0);
    }

    #[test]
    fn test_initialize_sets_version() {
        let conn = open_conn();
        initialize_schema(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let conn = open_conn();
        initialize_schema(&conn).unwrap();
        initialize_schema(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_all_concrete_tables_exist() {
        let conn = open_conn();
        initialize_schema(&conn).unwrap();

        for table in [
            "workspaces",
            "application_users",
            "employees",
            "members",
            "care_recipients",
            "feeds",
            "employee_posts",
            "member_posts",
            "care_recipient_posts",
            "farm_animals",
            "cats",
            "dogs",
        ] {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "missing table {table}");
        }
    }
}
