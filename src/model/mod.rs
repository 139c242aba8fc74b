//! Entity model for the persistence layer.
//!
//! Three entity families live here alongside the plain identity records:
//!
//! - [`WorkspaceMember`] (tenant-scoped, TPC): [`Employee`], [`Member`],
//!   [`CareRecipient`]
//! - [`Post`] (tenant-scoped via its [`Feed`], TPC): [`EmployeePost`],
//!   [`MemberPost`], [`CareRecipientPost`]
//! - [`Animal`] (unscoped, TPC): [`FarmAnimal`], [`Cat`], [`Dog`]
//!
//! Every abstract family is mapped table-per-concrete-type: no shared base
//! table, each concrete struct persisted to its own fully populated table,
//! with an enum as the polymorphic union view. Constructors take all required
//! fields explicitly; tenant keys are never defaulted.

mod animal;
mod feed;
mod identity;
mod member;

pub use animal::{Animal, AnimalKind, Cat, Dog, FarmAnimal};
pub use feed::{CareRecipientPost, EmployeePost, Feed, MemberPost, Post, PostKind};
pub use identity::{ApplicationUser, Workspace};
pub use member::{
    CareRecipient, Employee, EmployeeInvitation, Invitation, Member, MemberKind, WorkspaceMember,
};
