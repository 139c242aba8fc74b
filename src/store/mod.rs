//! SQLite store and session.
//!
//! This module provides the storage engine behind the entity families. It
//! supports both in-memory databases (great for testing) and file-based
//! databases, behind an r2d2 connection pool.
//!
//! # Unit of work
//!
//! All reads and writes go through a [`Session`], which holds one pooled
//! connection and one [`TenantContext`]. Operations within a session are
//! ordered: a save observes every prior save in the same session. Separate
//! sessions model separate units of work (a fresh session is the moral
//! equivalent of a cleared change tracker).
//!
//! # Example
//!
//! ```
//! use carespace_persistence::model::Workspace;
//! use carespace_persistence::store::SqliteStore;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteStore::in_memory()?;
//! store.init_schema()?;
//!
//! let mut session = store.session()?;
//! let mut workspace = Workspace::new("My Workspace");
//! session.insert_workspace(&mut workspace)?;
//! session.set_workspace(workspace.workspace_id().unwrap());
//! # Ok(())
//! # }
//! ```

mod animals;
mod feeds;
mod members;
mod schema;
mod session;

pub use members::MemberQuery;
pub use feeds::{CareRecipientPostQuery, EmployeePostQuery, MemberPostQuery, PostQuery};
pub use animals::AnimalQuery;
pub use session::Session;

use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use serde::{Deserialize, Serialize};

use crate::error::{BackendError, StoreError, StoreResult};
use crate::registry::TpcRegistry;
use crate::tenant::TenantContext;

/// Configuration for the SQLite store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqliteStoreConfig {
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum number of idle connections.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection timeout in milliseconds.
    #[serde(default = "default_connection_timeout_ms")]
    pub connection_timeout_ms: u64,

    /// SQLite busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u32,

    /// Enable WAL mode for better concurrency (file-based stores only).
    #[serde(default = "default_true")]
    pub enable_wal: bool,

    /// Enable foreign key constraints.
    #[serde(default = "default_true")]
    pub enable_foreign_keys: bool,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connection_timeout_ms() -> u64 {
    30000
}

fn default_busy_timeout_ms() -> u32 {
    5000
}

fn default_true() -> bool {
    true
}

impl Default for SqliteStoreConfig {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connection_timeout_ms: default_connection_timeout_ms(),
            busy_timeout_ms: default_busy_timeout_ms(),
            enable_wal: true,
            enable_foreign_keys: true,
        }
    }
}

/// SQLite-backed store for the entity families.
pub struct SqliteStore {
    pool: Pool<SqliteConnectionManager>,
    config: SqliteStoreConfig,
    is_memory: bool,
    /// Concrete-type to table mapping shared by all sessions.
    registry: Arc<RwLock<TpcRegistry>>,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("config", &self.config)
            .field("is_memory", &self.is_memory)
            .field("registered_tables", &self.registry.read().len())
            .finish_non_exhaustive()
    }
}

impl SqliteStore {
    /// Creates a new in-memory store.
    pub fn in_memory() -> StoreResult<Self> {
        Self::with_config(":memory:", SqliteStoreConfig::default())
    }

    /// Opens or creates a file-based store.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        Self::with_config(path, SqliteStoreConfig::default())
    }

    /// Creates a store with custom configuration and the default registry.
    pub fn with_config<P: AsRef<Path>>(path: P, config: SqliteStoreConfig) -> StoreResult<Self> {
        Self::with_registry(path, config, TpcRegistry::with_defaults())
    }

    /// Creates a store with a custom TPC registry.
    ///
    /// The registry decides which concrete table each variant maps to;
    /// supplying one without a variant's binding makes operations on that
    /// variant fail with an `UnmappedType` error.
    pub fn with_registry<P: AsRef<Path>>(
        path: P,
        config: SqliteStoreConfig,
        registry: TpcRegistry,
    ) -> StoreResult<Self> {
        let path_str = path.as_ref().to_string_lossy();
        let is_memory = path_str == ":memory:";

        let busy_timeout = std::time::Duration::from_millis(config.busy_timeout_ms as u64);
        let enable_foreign_keys = config.enable_foreign_keys;
        let enable_wal = config.enable_wal && !is_memory;

        let manager = SqliteConnectionManager::file(path.as_ref()).with_init(move |conn| {
            conn.busy_timeout(busy_timeout)?;
            if enable_foreign_keys {
                conn.pragma_update(None, "foreign_keys", "ON")?;
            }
            if enable_wal {
                conn.pragma_update(None, "journal_mode", "WAL")?;
            }
            Ok(())
        });

        // Every pooled connection to ":memory:" would open a distinct
        // database, so in-memory stores are pinned to a single connection.
        let max_size = if is_memory { 1 } else { config.max_connections };
        let min_idle = if is_memory { 1 } else { config.min_connections };

        let pool = Pool::builder()
            .max_size(max_size)
            .min_idle(Some(min_idle))
            .connection_timeout(std::time::Duration::from_millis(
                config.connection_timeout_ms,
            ))
            .build(manager)
            .map_err(|e| {
                StoreError::Backend(BackendError::ConnectionFailed {
                    message: e.to_string(),
                })
            })?;

        tracing::debug!(
            path = %path_str,
            is_memory,
            max_size,
            "opened sqlite store"
        );

        Ok(Self {
            pool,
            config,
            is_memory,
            registry: Arc::new(RwLock::new(registry)),
        })
    }

    /// Initializes the database schema, creating any missing tables.
    pub fn init_schema(&self) -> StoreResult<()> {
        let conn = self.get_connection()?;
        schema::initialize_schema(&conn)
    }

    /// Opens a new session (one unit of work) with an unset tenant context.
    pub fn session(&self) -> StoreResult<Session<'_>> {
        let conn = self.get_connection()?;
        Ok(Session::new(self, conn, TenantContext::new()))
    }

    /// Returns the shared TPC registry.
    pub fn registry(&self) -> &Arc<RwLock<TpcRegistry>> {
        &self.registry
    }

    /// Returns whether this is an in-memory store.
    pub fn is_memory(&self) -> bool {
        self.is_memory
    }

    /// Returns the store configuration.
    pub fn config(&self) -> &SqliteStoreConfig {
        &self.config
    }

    pub(crate) fn get_connection(&self) -> StoreResult<PooledConnection<SqliteConnectionManager>> {
        self.pool.get().map_err(|e| {
            StoreError::Backend(BackendError::ConnectionFailed {
                message: e.to_string(),
            })
        })
    }
}
