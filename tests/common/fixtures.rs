//! Seed data for integration tests.
//!
//! The seeded store mirrors a small care-coordination setup: workspace one
//! holds a full crew (two employees, a family member, a care recipient) and
//! workspace two holds a second member row backed by one of the same users,
//! so tests can observe both tenant isolation and cross-workspace user reuse.

use carespace_persistence::model::{
    ApplicationUser, CareRecipient, Employee, EmployeeInvitation, Invitation, Member, Workspace,
    WorkspaceMember,
};
use carespace_persistence::store::SqliteStore;
use carespace_persistence::tenant::WorkspaceId;

/// An in-memory store seeded with two workspaces.
pub struct Seeded {
    /// The store itself. In-memory stores hold a single pooled connection,
    /// so drop each session before opening the next.
    pub store: SqliteStore,
    /// Workspace with two employees, one member, one care recipient.
    pub workspace1: WorkspaceId,
    /// Workspace with one employee (same user as workspace one's admin) and
    /// one invited member.
    pub workspace2: WorkspaceId,
    /// User id backing the admin employee in both workspaces.
    pub aaron_user: i64,
    /// User id backing the invited employee in workspace one.
    pub erin_user: i64,
    /// User id backing the family member rows.
    pub mary_user: i64,
    /// User id backing the care recipient in workspace one.
    pub carol_user: i64,
    /// `employees` row id of the workspace-one admin.
    pub admin_employee: i64,
    /// `employees` row id of the invited employee in workspace one.
    pub invited_employee: i64,
    /// `members` row id of the family member in workspace one.
    pub family_member: i64,
    /// `care_recipients` row id in workspace one.
    pub care_recipient: i64,
}

/// Creates and seeds an in-memory store.
pub fn seeded_store() -> Seeded {
    let store = SqliteStore::in_memory().expect("failed to create in-memory store");
    store.init_schema().expect("failed to initialize schema");

    let (
        workspace1,
        workspace2,
        aaron_user,
        erin_user,
        mary_user,
        carol_user,
        admin_employee,
        invited_employee,
        family_member,
        care_recipient,
    ) = {
        let mut session = store.session().expect("failed to open session");

        let mut workspace1 = Workspace::new("Care Crew");
        session.insert_workspace(&mut workspace1).unwrap();
        let workspace1 = workspace1.workspace_id().unwrap();

        let mut workspace2 = Workspace::new("Second Crew");
        session.insert_workspace(&mut workspace2).unwrap();
        let workspace2 = workspace2.workspace_id().unwrap();

        let mut aaron = ApplicationUser::new("+19195550100");
        let mut erin = ApplicationUser::new("+19195550101");
        let mut mary = ApplicationUser::new("+19195550102");
        let mut carol = ApplicationUser::new("+19195550103");
        for user in [&mut aaron, &mut erin, &mut mary, &mut carol] {
            session.insert_user(user).unwrap();
        }
        let aaron_user = aaron.id.unwrap();
        let erin_user = erin.id.unwrap();
        let mary_user = mary.id.unwrap();
        let carol_user = carol.id.unwrap();

        // A brand-new workspace has no members, so no context can belong to
        // it yet; its first member goes in through the bypass.
        let mut admin = Employee::new("Aaron", "Admin", "On call", aaron_user);
        admin.workspace_id = Some(workspace1);
        let mut admin: WorkspaceMember = admin.into();
        session.insert_member_bypassing_tenancy(&mut admin).unwrap();
        let admin_employee = admin.id().unwrap();

        // The rest of workspace one goes in through the stamping path.
        session.set_workspace(workspace1);

        let mut payroll_invitation = EmployeeInvitation::new("Join the crew");
        payroll_invitation.enroll_in_payroll = true;
        let mut invited: WorkspaceMember = Employee::new("Erin", "Caregiver", "Day shift", erin_user)
            .with_invitation(payroll_invitation)
            .into();
        session.insert_member(&mut invited).unwrap();
        let invited_employee = invited.id().unwrap();

        let mut family: WorkspaceMember = Member::new("Mary", "Family", "Sister", mary_user)
            .with_invitation(Invitation::new("Come see the feed"))
            .into();
        session.insert_member(&mut family).unwrap();
        let family_member = family.id().unwrap();

        let mut recipient: WorkspaceMember =
            CareRecipient::new("Carol", "Care recipient", "Allergic to penicillin", carol_user)
                .into();
        session.insert_member(&mut recipient).unwrap();
        let care_recipient = recipient.id().unwrap();

        // Workspace two: Aaron's user backs a second, independent member row.
        let mut admin2 = Employee::new("Aaron", "Admin", "Evenings", aaron_user);
        admin2.workspace_id = Some(workspace2);
        let mut admin2: WorkspaceMember = admin2.into();
        session
            .insert_member_bypassing_tenancy(&mut admin2)
            .unwrap();

        session.set_workspace(workspace2);
        let mut family2: WorkspaceMember = Member::new("Mary", "Family", "Cousin", mary_user)
            .with_invitation(Invitation::new("Second crew needs you too"))
            .into();
        session.insert_member(&mut family2).unwrap();

        (
            workspace1,
            workspace2,
            aaron_user,
            erin_user,
            mary_user,
            carol_user,
            admin_employee,
            invited_employee,
            family_member,
            care_recipient,
        )
    };

    Seeded {
        store,
        workspace1,
        workspace2,
        aaron_user,
        erin_user,
        mary_user,
        carol_user,
        admin_employee,
        invited_employee,
        family_member,
        care_recipient,
    }
}
