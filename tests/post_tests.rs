//! Tests for feeds and the post family.
//!
//! Covers the feed scenario from the product: a feed about a care recipient
//! collects posts from every member kind, polymorphic fetches union the
//! concrete post tables, and author hydration is a per-variant join.

mod common;

use carespace_persistence::error::{EntityError, StoreError, TenantError};
use carespace_persistence::model::{
    CareRecipientPost, EmployeePost, Feed, MemberPost, Post, PostKind,
};
use carespace_persistence::store::Session;

use common::{Seeded, seeded_store};

/// Creates a feed about the workspace-one care recipient with one post from
/// each member kind. The session must already be scoped to workspace one.
fn seed_feed(session: &Session<'_>, seeded: &Seeded) -> i64 {
    let mut feed = Feed::new(seeded.care_recipient);
    session.insert_feed(&mut feed).unwrap();
    let feed_id = feed.id.unwrap();

    let mut posts: Vec<Post> = vec![
        EmployeePost::new("Morning meds given", feed_id, seeded.admin_employee).into(),
        MemberPost::new("Thanks for the update!", feed_id, seeded.family_member).into(),
        CareRecipientPost::new("Feeling good today", feed_id, seeded.care_recipient).into(),
    ];
    for post in &mut posts {
        session.insert_post(post).unwrap();
    }
    feed_id
}

// ============================================================================
// Feed Scenario
// ============================================================================

/// A feed collects posts of every concrete kind, and the polymorphic fetch
/// returns them all.
#[test]
fn test_feed_collects_posts_of_all_kinds() {
    let seeded = seeded_store();
    let mut session = seeded.store.session().unwrap();
    session.set_workspace(seeded.workspace1);

    let feed_id = seed_feed(&session, &seeded);

    let posts = session.posts().in_feed(feed_id).fetch().unwrap();
    assert_eq!(posts.len(), 3);

    let kinds: Vec<PostKind> = posts.iter().map(Post::kind).collect();
    assert!(kinds.contains(&PostKind::EmployeePost));
    assert!(kinds.contains(&PostKind::MemberPost));
    assert!(kinds.contains(&PostKind::CareRecipientPost));

    assert_eq!(session.posts().in_feed(feed_id).count().unwrap(), 3);
}

/// A post saved in a later unit of work shows up alongside the earlier ones.
#[test]
fn test_post_added_in_later_session() {
    let seeded = seeded_store();
    let feed_id = {
        let mut session = seeded.store.session().unwrap();
        session.set_workspace(seeded.workspace1);
        seed_feed(&session, &seeded)
    };

    let mut session = seeded.store.session().unwrap();
    session.set_workspace(seeded.workspace1);

    let mut late: Post =
        EmployeePost::new("Evening check done", feed_id, seeded.invited_employee).into();
    session.insert_post(&mut late).unwrap();

    assert_eq!(session.posts().in_feed(feed_id).count().unwrap(), 4);
    assert_eq!(
        session.employee_posts().in_feed(feed_id).fetch().unwrap().len(),
        2
    );
}

#[test]
fn test_feed_roundtrip() {
    let seeded = seeded_store();
    let mut session = seeded.store.session().unwrap();
    session.set_workspace(seeded.workspace1);

    let feed_id = seed_feed(&session, &seeded);
    let feed = session.feed(feed_id).unwrap();
    assert_eq!(feed.care_recipient_id, seeded.care_recipient);
    assert_eq!(feed.workspace_id, Some(seeded.workspace1));
}

/// A feed belongs to its workspace; the other workspace cannot see it.
#[test]
fn test_feed_invisible_from_other_workspace() {
    let seeded = seeded_store();
    let mut session = seeded.store.session().unwrap();
    session.set_workspace(seeded.workspace1);
    let feed_id = seed_feed(&session, &seeded);

    session.set_workspace(seeded.workspace2);
    let result = session.feed(feed_id);
    assert!(matches!(
        result,
        Err(StoreError::Entity(EntityError::NotFound { .. }))
    ));
    assert_eq!(session.posts().in_feed(feed_id).count().unwrap(), 0);
}

// ============================================================================
// Author Hydration
// ============================================================================

/// The polymorphic union never hydrates authors.
#[test]
fn test_polymorphic_fetch_does_not_hydrate_authors() {
    let seeded = seeded_store();
    let mut session = seeded.store.session().unwrap();
    session.set_workspace(seeded.workspace1);
    let feed_id = seed_feed(&session, &seeded);

    for post in session.posts().in_feed(feed_id).fetch().unwrap() {
        match post {
            Post::EmployeePost(p) => assert!(p.employee.is_none()),
            Post::MemberPost(p) => assert!(p.member.is_none()),
            Post::CareRecipientPost(p) => assert!(p.care_recipient.is_none()),
        }
    }
}

/// Each concrete query can join its own author table.
#[test]
fn test_include_author_per_variant() {
    let seeded = seeded_store();
    let mut session = seeded.store.session().unwrap();
    session.set_workspace(seeded.workspace1);
    let feed_id = seed_feed(&session, &seeded);

    let employee_posts = session
        .employee_posts()
        .in_feed(feed_id)
        .include_author()
        .fetch()
        .unwrap();
    assert_eq!(employee_posts.len(), 1);
    let author = employee_posts[0].employee.as_ref().expect("author joined");
    assert_eq!(author.name, "Aaron");

    let member_posts = session
        .member_posts()
        .in_feed(feed_id)
        .include_author()
        .fetch()
        .unwrap();
    assert_eq!(member_posts.len(), 1);
    let author = member_posts[0].member.as_ref().expect("author joined");
    assert_eq!(author.name, "Mary");

    let recipient_posts = session
        .care_recipient_posts()
        .in_feed(feed_id)
        .include_author()
        .fetch()
        .unwrap();
    assert_eq!(recipient_posts.len(), 1);
    let author = recipient_posts[0]
        .care_recipient
        .as_ref()
        .expect("author joined");
    assert_eq!(author.name, "Carol");
}

/// The joined author comes back fully populated, invitation included.
#[test]
fn test_included_author_carries_subtype_fields() {
    let seeded = seeded_store();
    let mut session = seeded.store.session().unwrap();
    session.set_workspace(seeded.workspace1);

    let mut feed = Feed::new(seeded.care_recipient);
    session.insert_feed(&mut feed).unwrap();
    let feed_id = feed.id.unwrap();

    let mut post: Post =
        EmployeePost::new("Handover notes posted", feed_id, seeded.invited_employee).into();
    session.insert_post(&mut post).unwrap();

    let posts = session
        .employee_posts()
        .in_feed(feed_id)
        .include_author()
        .fetch()
        .unwrap();
    let author = posts[0].employee.as_ref().unwrap();
    assert_eq!(author.special_employee_field, "Day shift");
    assert!(author.invitation.as_ref().unwrap().enroll_in_payroll);
}

// ============================================================================
// Post CRUD
// ============================================================================

#[test]
fn test_post_lookup_by_kind_and_id() {
    let seeded = seeded_store();
    let mut session = seeded.store.session().unwrap();
    session.set_workspace(seeded.workspace1);
    let feed_id = seed_feed(&session, &seeded);

    let posts = session.member_posts().in_feed(feed_id).fetch().unwrap();
    let id = posts[0].id.unwrap();

    let post = session.post(PostKind::MemberPost, id).unwrap();
    assert_eq!(post.body(), "Thanks for the update!");
}

#[test]
fn test_update_post_body() {
    let seeded = seeded_store();
    let mut session = seeded.store.session().unwrap();
    session.set_workspace(seeded.workspace1);
    let feed_id = seed_feed(&session, &seeded);

    let mut post = {
        let mut posts = session.employee_posts().in_feed(feed_id).fetch().unwrap();
        Post::EmployeePost(posts.remove(0))
    };
    if let Post::EmployeePost(p) = &mut post {
        p.body = "Morning meds given (edited)".to_string();
    }
    session.update_post(&post).unwrap();

    let reread = session
        .post(PostKind::EmployeePost, post.id().unwrap())
        .unwrap();
    assert_eq!(reread.body(), "Morning meds given (edited)");
}

#[test]
fn test_delete_post() {
    let seeded = seeded_store();
    let mut session = seeded.store.session().unwrap();
    session.set_workspace(seeded.workspace1);
    let feed_id = seed_feed(&session, &seeded);

    let posts = session
        .care_recipient_posts()
        .in_feed(feed_id)
        .fetch()
        .unwrap();
    let id = posts[0].id.unwrap();

    session.delete_post(PostKind::CareRecipientPost, id).unwrap();
    assert_eq!(session.posts().in_feed(feed_id).count().unwrap(), 2);
    assert!(matches!(
        session.post(PostKind::CareRecipientPost, id),
        Err(StoreError::Entity(EntityError::NotFound { .. }))
    ));
}

// ============================================================================
// Scoping
// ============================================================================

#[test]
fn test_post_operations_require_active_workspace() {
    let seeded = seeded_store();
    let session = seeded.store.session().unwrap();

    assert!(matches!(
        session.posts().fetch(),
        Err(StoreError::Tenant(TenantError::NoActiveTenant))
    ));

    let mut post: Post = EmployeePost::new("orphan", 1, seeded.admin_employee).into();
    assert!(matches!(
        session.insert_post(&mut post),
        Err(StoreError::Tenant(TenantError::NoActiveTenant))
    ));
}
