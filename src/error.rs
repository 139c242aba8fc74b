//! Error types for the persistence layer.
//!
//! This module defines all error types used throughout the crate, organized
//! as a hierarchy that separates tenant isolation errors, TPC mapping errors,
//! entity lookup errors, and engine-level failures.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

use crate::tenant::WorkspaceId;

/// Result alias used by all store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// The primary error type for all store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Tenant isolation errors
    #[error(transparent)]
    Tenant(#[from] TenantError),

    /// TPC mapping errors
    #[error(transparent)]
    Mapping(#[from] MappingError),

    /// Entity lookup errors
    #[error(transparent)]
    Entity(#[from] EntityError),

    /// Engine-level errors
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Errors related to tenant isolation.
///
/// These are all programmer errors: none of them is retried, and none of
/// them is ever corrected silently.
#[derive(Error, Debug)]
pub enum TenantError {
    /// A filtered operation was attempted before the context was set.
    #[error("no active workspace: set the session workspace before tenant-scoped operations")]
    NoActiveTenant,

    /// An entity arrived on the auto-stamping path already carrying a
    /// different workspace key.
    #[error("workspace mismatch: entity is stamped with workspace {found} but the active workspace is {active}")]
    TenantMismatch {
        active: WorkspaceId,
        found: WorkspaceId,
    },

    /// A bypass insert was attempted without an explicit workspace key.
    #[error("missing workspace key: bypass inserts require an explicit workspace id on every entity")]
    MissingTenantKey,
}

/// Errors related to table-per-concrete-type mapping.
///
/// These indicate registry misconfiguration and are surfaced per call.
#[derive(Error, Debug)]
pub enum MappingError {
    /// A concrete type has no registered table.
    #[error("no table registered for concrete type '{variant}' in family '{family}'")]
    UnmappedType {
        family: &'static str,
        variant: &'static str,
    },

    /// An entire family has no registered tables.
    #[error("unknown entity family '{family}'")]
    UnknownFamily { family: &'static str },
}

/// Errors related to entity lookups.
#[derive(Error, Debug)]
pub enum EntityError {
    /// A single-result query matched zero rows.
    ///
    /// Surfaced as a distinguishable failure rather than a null result so
    /// callers cannot silently proceed with missing data.
    #[error("not found: {table}/{id}")]
    NotFound { table: String, id: i64 },

    /// An update or delete was attempted on an entity that was never
    /// inserted (its row id is unset).
    #[error("entity has no row id in {table}: insert it before updating or deleting")]
    MissingId { table: String },
}

/// Errors originating from the SQLite engine.
///
/// Engine failures (constraint violations included) propagate unchanged;
/// nothing at this layer retries them.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Could not obtain a connection from the pool.
    #[error("connection failed: {message}")]
    ConnectionFailed { message: String },

    /// A SQLite statement failed.
    #[error("sqlite error: {message}")]
    Sqlite { message: String },

    /// A stored value could not be decoded into its entity field.
    #[error("corrupt column value: {message}")]
    CorruptValue { message: String },
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Backend(BackendError::Sqlite {
            message: err.to_string(),
        })
    }
}

impl From<r2d2::Error> for StoreError {
    fn from(err: r2d2::Error) -> Self {
        StoreError::Backend(BackendError::ConnectionFailed {
            message: err.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tenant_mismatch_message() {
        let err = TenantError::TenantMismatch {
            active: WorkspaceId::new(1),
            found: WorkspaceId::new(2),
        };
        let msg = err.to_string();
        assert!(msg.contains("stamped with workspace 2"));
        assert!(msg.contains("active workspace is 1"));
    }

    #[test]
    fn test_unmapped_type_message() {
        let err = MappingError::UnmappedType {
            family: "workspace_member",
            variant: "employee",
        };
        assert!(err.to_string().contains("employee"));
        assert!(err.to_string().contains("workspace_member"));
    }

    #[test]
    fn test_not_found_is_transparent() {
        let err = StoreError::from(EntityError::NotFound {
            table: "feeds".to_string(),
            id: 9,
        });
        assert_eq!(err.to_string(), "not found: feeds/9");
    }
}
