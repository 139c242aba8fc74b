//! Carespace Persistence Layer
//!
//! This crate provides a tenant-isolated persistence layer over SQLite for a
//! small care-coordination domain. Entities belong to workspaces (the unit of
//! tenant isolation), and polymorphic entity hierarchies are stored
//! table-per-concrete-type: no shared base table, each concrete type in its
//! own fully populated table, with an enum as the union view.
//!
//! # Features
//!
//! - **Tenant isolation**: a per-session active workspace filters every
//!   scoped read and stamps every scoped write; cross-tenant reads are
//!   impossible without the explicitly named bypass
//! - **TPC polymorphism**: polymorphic queries union independently filtered
//!   per-table selects and reconstruct each row to its concrete type
//! - **Fail-fast**: scoped operations without an active workspace fail with
//!   an error, never fall back to "all rows"
//! - **In-memory and file modes**: `:memory:` databases for tests, file
//!   databases behind an r2d2 connection pool for everything else
//!
//! # Architecture
//!
//! - [`tenant`] - Workspace identity, the per-session tenant context, and
//!   table scoping
//! - [`model`] - Entity families ([`WorkspaceMember`](model::WorkspaceMember),
//!   [`Post`](model::Post), [`Animal`](model::Animal)) and identity records
//! - [`registry`] - The concrete-type to table mapping
//! - [`store`] - The SQLite store, sessions, and query builders
//! - [`error`] - Error types for all operations
//!
//! # Quick Start
//!
//! ```
//! use carespace_persistence::model::{Employee, Workspace, WorkspaceMember};
//! use carespace_persistence::store::SqliteStore;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteStore::in_memory()?;
//! store.init_schema()?;
//!
//! // Create a workspace and a user, then bootstrap the first member.
//! let mut session = store.session()?;
//! let mut workspace = Workspace::new("Care Team");
//! session.insert_workspace(&mut workspace)?;
//! let workspace_id = workspace.workspace_id().unwrap();
//!
//! let mut user = carespace_persistence::model::ApplicationUser::new("+19194141214");
//! session.insert_user(&mut user)?;
//!
//! // The workspace has no members yet, so no context can belong to it;
//! // the first member goes in through the bypass with an explicit key.
//! let mut admin = Employee::new("Aaron", "Admin", "On call", user.id.unwrap());
//! admin.workspace_id = Some(workspace_id);
//! let mut admin: WorkspaceMember = admin.into();
//! session.insert_member_bypassing_tenancy(&mut admin)?;
//!
//! // From here on, everything is filtered to the active workspace.
//! session.set_workspace(workspace_id);
//! assert_eq!(session.members().count()?, 1);
//! # Ok(())
//! # }
//! ```
//!
//! # Tenant isolation
//!
//! A session without an active workspace cannot touch tenant-scoped tables:
//!
//! ```
//! use carespace_persistence::error::{StoreError, TenantError};
//! use carespace_persistence::store::SqliteStore;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteStore::in_memory()?;
//! store.init_schema()?;
//!
//! let session = store.session()?;
//! assert!(matches!(
//!     session.members().fetch(),
//!     Err(StoreError::Tenant(TenantError::NoActiveTenant))
//! ));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod model;
pub mod registry;
pub mod store;
pub mod tenant;

// Re-export commonly used types at crate root
pub use error::{StoreError, StoreResult};
pub use registry::{TableBinding, TpcRegistry};
pub use store::{Session, SqliteStore, SqliteStoreConfig};
pub use tenant::{Scoping, TenantContext, WorkspaceId};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
