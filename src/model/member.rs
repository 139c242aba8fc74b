//! The workspace member family.
//!
//! `WorkspaceMember` is an abstract base mapped table-per-concrete-type:
//! each concrete variant ([`Employee`], [`Member`], [`CareRecipient`]) owns
//! an independent, fully populated table, and together the disjoint tables
//! form the logical member collection of a workspace. The enum is the
//! polymorphic view; callers discriminate by variant.

use serde::{Deserialize, Serialize};

use crate::tenant::WorkspaceId;

/// Type tag for the concrete member tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    /// Staff member of the workspace.
    Employee,
    /// Family member participating in care.
    Member,
    /// The person receiving care.
    CareRecipient,
}

impl MemberKind {
    /// Returns the registry variant name for this kind.
    pub fn variant_name(&self) -> &'static str {
        match self {
            MemberKind::Employee => "employee",
            MemberKind::Member => "member",
            MemberKind::CareRecipient => "care_recipient",
        }
    }
}

/// An invitation owned 1:1 by a [`Member`].
///
/// Created together with the member, never independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invitation {
    /// Invitation message shown to the invitee.
    pub message: String,
}

impl Invitation {
    /// Creates an invitation with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// An invitation owned 1:1 by an [`Employee`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeInvitation {
    /// Invitation message shown to the invitee.
    pub message: String,
    /// Whether accepting the invitation also enrolls the employee in payroll.
    pub enroll_in_payroll: bool,
}

impl EmployeeInvitation {
    /// Creates an employee invitation with the given message.
    ///
    /// Payroll enrollment defaults off; set the field directly to opt in.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            enroll_in_payroll: false,
        }
    }
}

/// A staff member of a workspace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Row id within the `employees` table, assigned on insert.
    pub id: Option<i64>,
    /// Tenant key. Stamped by the session on the auto-stamping insert path.
    pub workspace_id: Option<WorkspaceId>,
    /// The identity record backing this member.
    pub application_user_id: i64,
    /// Display name.
    pub name: String,
    /// Role within the workspace (e.g. "Admin", "Staff").
    pub role: String,
    /// Subtype-specific field.
    pub special_employee_field: String,
    /// Optional invitation, persisted alongside the employee row.
    pub invitation: Option<EmployeeInvitation>,
}

impl Employee {
    /// Creates a new employee. Required fields are explicit; the tenant key
    /// starts unset and is stamped at insert time.
    pub fn new(
        name: impl Into<String>,
        role: impl Into<String>,
        special_employee_field: impl Into<String>,
        application_user_id: i64,
    ) -> Self {
        Self {
            id: None,
            workspace_id: None,
            application_user_id,
            name: name.into(),
            role: role.into(),
            special_employee_field: special_employee_field.into(),
            invitation: None,
        }
    }

    /// Attaches an invitation to be persisted with this employee.
    pub fn with_invitation(mut self, invitation: EmployeeInvitation) -> Self {
        self.invitation = Some(invitation);
        self
    }
}

/// A family member participating in a workspace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    /// Row id within the `members` table, assigned on insert.
    pub id: Option<i64>,
    /// Tenant key. Stamped by the session on the auto-stamping insert path.
    pub workspace_id: Option<WorkspaceId>,
    /// The identity record backing this member.
    pub application_user_id: i64,
    /// Display name.
    pub name: String,
    /// Role within the workspace.
    pub role: String,
    /// Subtype-specific field.
    pub special_member_field: String,
    /// Optional invitation, persisted alongside the member row.
    pub invitation: Option<Invitation>,
}

impl Member {
    /// Creates a new member with explicit required fields.
    pub fn new(
        name: impl Into<String>,
        role: impl Into<String>,
        special_member_field: impl Into<String>,
        application_user_id: i64,
    ) -> Self {
        Self {
            id: None,
            workspace_id: None,
            application_user_id,
            name: name.into(),
            role: role.into(),
            special_member_field: special_member_field.into(),
            invitation: None,
        }
    }

    /// Attaches an invitation to be persisted with this member.
    pub fn with_invitation(mut self, invitation: Invitation) -> Self {
        self.invitation = Some(invitation);
        self
    }
}

/// The person receiving care in a workspace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareRecipient {
    /// Row id within the `care_recipients` table, assigned on insert.
    pub id: Option<i64>,
    /// Tenant key. Stamped by the session on the auto-stamping insert path.
    pub workspace_id: Option<WorkspaceId>,
    /// The identity record backing this member.
    pub application_user_id: i64,
    /// Display name.
    pub name: String,
    /// Role within the workspace.
    pub role: String,
    /// Subtype-specific field.
    pub special_care_recipient_field: String,
}

impl CareRecipient {
    /// Creates a new care recipient with explicit required fields.
    pub fn new(
        name: impl Into<String>,
        role: impl Into<String>,
        special_care_recipient_field: impl Into<String>,
        application_user_id: i64,
    ) -> Self {
        Self {
            id: None,
            workspace_id: None,
            application_user_id,
            name: name.into(),
            role: role.into(),
            special_care_recipient_field: special_care_recipient_field.into(),
        }
    }
}

/// Polymorphic view over the member family.
///
/// A member row exists in exactly one concrete table; this enum is how the
/// union is handed back to callers after a polymorphic query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkspaceMember {
    /// An employee row.
    Employee(Employee),
    /// A member row.
    Member(Member),
    /// A care recipient row.
    CareRecipient(CareRecipient),
}

impl WorkspaceMember {
    /// Returns the concrete type tag.
    pub fn kind(&self) -> MemberKind {
        match self {
            WorkspaceMember::Employee(_) => MemberKind::Employee,
            WorkspaceMember::Member(_) => MemberKind::Member,
            WorkspaceMember::CareRecipient(_) => MemberKind::CareRecipient,
        }
    }

    /// Returns the row id, if assigned.
    pub fn id(&self) -> Option<i64> {
        match self {
            WorkspaceMember::Employee(e) => e.id,
            WorkspaceMember::Member(m) => m.id,
            WorkspaceMember::CareRecipient(c) => c.id,
        }
    }

    /// Returns the display name.
    pub fn name(&self) -> &str {
        match self {
            WorkspaceMember::Employee(e) => &e.name,
            WorkspaceMember::Member(m) => &m.name,
            WorkspaceMember::CareRecipient(c) => &c.name,
        }
    }

    /// Returns the role.
    pub fn role(&self) -> &str {
        match self {
            WorkspaceMember::Employee(e) => &e.role,
            WorkspaceMember::Member(m) => &m.role,
            WorkspaceMember::CareRecipient(c) => &c.role,
        }
    }

    /// Returns the tenant key, if set.
    pub fn workspace_id(&self) -> Option<WorkspaceId> {
        match self {
            WorkspaceMember::Employee(e) => e.workspace_id,
            WorkspaceMember::Member(m) => m.workspace_id,
            WorkspaceMember::CareRecipient(c) => c.workspace_id,
        }
    }

    pub(crate) fn workspace_id_mut(&mut self) -> &mut Option<WorkspaceId> {
        match self {
            WorkspaceMember::Employee(e) => &mut e.workspace_id,
            WorkspaceMember::Member(m) => &mut m.workspace_id,
            WorkspaceMember::CareRecipient(c) => &mut c.workspace_id,
        }
    }

    pub(crate) fn set_id(&mut self, id: i64) {
        match self {
            WorkspaceMember::Employee(e) => e.id = Some(id),
            WorkspaceMember::Member(m) => m.id = Some(id),
            WorkspaceMember::CareRecipient(c) => c.id = Some(id),
        }
    }
}

impl From<Employee> for WorkspaceMember {
    fn from(e: Employee) -> Self {
        WorkspaceMember::Employee(e)
    }
}

impl From<Member> for WorkspaceMember {
    fn from(m: Member) -> Self {
        WorkspaceMember::Member(m)
    }
}

impl From<CareRecipient> for WorkspaceMember {
    fn from(c: CareRecipient) -> Self {
        WorkspaceMember::CareRecipient(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags() {
        let member: WorkspaceMember = Employee::new("A", "Admin", "Foo", 1).into();
        assert_eq!(member.kind(), MemberKind::Employee);
        assert_eq!(member.kind().variant_name(), "employee");

        let member: WorkspaceMember = CareRecipient::new("B", "Guest", "Foo", 2).into();
        assert_eq!(member.kind(), MemberKind::CareRecipient);
        assert_eq!(member.kind().variant_name(), "care_recipient");
    }

    #[test]
    fn test_common_field_accessors() {
        let member: WorkspaceMember = Member::new("Jill Sagat", "Guest", "Foo", 4).into();
        assert_eq!(member.name(), "Jill Sagat");
        assert_eq!(member.role(), "Guest");
        assert_eq!(member.id(), None);
        assert_eq!(member.workspace_id(), None);
    }

    #[test]
    fn test_employee_invitation_builder() {
        let mut invitation = EmployeeInvitation::new("Get your i9 done");
        invitation.enroll_in_payroll = true;

        let employee = Employee::new("Jeff", "Staff", "Foo", 3).with_invitation(invitation);
        let invitation = employee.invitation.unwrap();
        assert_eq!(invitation.message, "Get your i9 done");
        assert!(invitation.enroll_in_payroll);
    }
}
