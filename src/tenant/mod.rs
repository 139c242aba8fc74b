//! Workspace tenancy for the persistence layer.
//!
//! This module provides the core types for tenant isolation. A workspace is
//! the unit of isolation: tenant-scoped rows carry a `workspace_id` column,
//! every filtered read is restricted to the active workspace, and every
//! auto-stamping write sets it.
//!
//! # Core Types
//!
//! - [`WorkspaceId`] - Opaque identifier for a workspace
//! - [`TenantContext`] - Per-session holder of the active workspace
//! - [`Scoping`] - Whether a table is tenant-scoped or shared
//!
//! # Design Philosophy
//!
//! The active workspace lives on the [`Session`], one per unit of work, and
//! the filtering it drives is applied visibly in the session's query and
//! write paths rather than through hidden interception. The only way around
//! it is the clearly named bypass insert, intended solely for bootstrap
//! writes that create a brand-new workspace's first member.
//!
//! [`Session`]: crate::store::Session

mod context;
mod id;
mod scoping;

pub use context::TenantContext;
pub use id::WorkspaceId;
pub use scoping::Scoping;
