//! Feeds and the post family.
//!
//! A feed belongs to one workspace through its care recipient and owns an
//! unordered set of posts. `Post` is the second abstract base mapped
//! table-per-concrete-type: each concrete post table carries exactly one
//! author reference of the matching member subtype. A polymorphic post fetch
//! does not expand authors; each concrete query requests its own author join.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::member::{CareRecipient, Employee, Member};
use crate::tenant::WorkspaceId;

/// A feed of posts about one care recipient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feed {
    /// Row id, assigned on insert.
    pub id: Option<i64>,
    /// Tenant key, stamped at insert time.
    pub workspace_id: Option<WorkspaceId>,
    /// The care recipient this feed is about.
    pub care_recipient_id: i64,
}

impl Feed {
    /// Creates a new feed for the given care recipient.
    pub fn new(care_recipient_id: i64) -> Self {
        Self {
            id: None,
            workspace_id: None,
            care_recipient_id,
        }
    }
}

/// Type tag for the concrete post tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostKind {
    /// Post authored by an employee.
    EmployeePost,
    /// Post authored by a member.
    MemberPost,
    /// Post authored by the care recipient.
    CareRecipientPost,
}

impl PostKind {
    /// Returns the registry variant name for this kind.
    pub fn variant_name(&self) -> &'static str {
        match self {
            PostKind::EmployeePost => "employee_post",
            PostKind::MemberPost => "member_post",
            PostKind::CareRecipientPost => "care_recipient_post",
        }
    }
}

/// A post authored by an employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeePost {
    /// Row id within the `employee_posts` table, assigned on insert.
    pub id: Option<i64>,
    /// Tenant key, stamped at insert time.
    pub workspace_id: Option<WorkspaceId>,
    /// The feed this post belongs to.
    pub feed_id: i64,
    /// Post body.
    pub body: String,
    /// Creation time, set by the constructor.
    pub created_at: DateTime<Utc>,
    /// The authoring employee.
    pub employee_id: i64,
    /// Hydrated author, populated only by `include_author` queries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee: Option<Employee>,
}

impl EmployeePost {
    /// Creates a new employee post in the given feed.
    pub fn new(body: impl Into<String>, feed_id: i64, employee_id: i64) -> Self {
        Self {
            id: None,
            workspace_id: None,
            feed_id,
            body: body.into(),
            created_at: Utc::now(),
            employee_id,
            employee: None,
        }
    }
}

/// A post authored by a member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberPost {
    /// Row id within the `member_posts` table, assigned on insert.
    pub id: Option<i64>,
    /// Tenant key, stamped at insert time.
    pub workspace_id: Option<WorkspaceId>,
    /// The feed this post belongs to.
    pub feed_id: i64,
    /// Post body.
    pub body: String,
    /// Creation time, set by the constructor.
    pub created_at: DateTime<Utc>,
    /// The authoring member.
    pub member_id: i64,
    /// Hydrated author, populated only by `include_author` queries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member: Option<Member>,
}

impl MemberPost {
    /// Creates a new member post in the given feed.
    pub fn new(body: impl Into<String>, feed_id: i64, member_id: i64) -> Self {
        Self {
            id: None,
            workspace_id: None,
            feed_id,
            body: body.into(),
            created_at: Utc::now(),
            member_id,
            member: None,
        }
    }
}

/// A post authored by the care recipient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareRecipientPost {
    /// Row id within the `care_recipient_posts` table, assigned on insert.
    pub id: Option<i64>,
    /// Tenant key, stamped at insert time.
    pub workspace_id: Option<WorkspaceId>,
    /// The feed this post belongs to.
    pub feed_id: i64,
    /// Post body.
    pub body: String,
    /// Creation time, set by the constructor.
    pub created_at: DateTime<Utc>,
    /// The authoring care recipient.
    pub care_recipient_id: i64,
    /// Hydrated author, populated only by `include_author` queries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub care_recipient: Option<CareRecipient>,
}

impl CareRecipientPost {
    /// Creates a new care recipient post in the given feed.
    pub fn new(body: impl Into<String>, feed_id: i64, care_recipient_id: i64) -> Self {
        Self {
            id: None,
            workspace_id: None,
            feed_id,
            body: body.into(),
            created_at: Utc::now(),
            care_recipient_id,
            care_recipient: None,
        }
    }
}

/// Polymorphic view over the post family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Post {
    /// An employee post row.
    EmployeePost(EmployeePost),
    /// A member post row.
    MemberPost(MemberPost),
    /// A care recipient post row.
    CareRecipientPost(CareRecipientPost),
}

impl Post {
    /// Returns the concrete type tag.
    pub fn kind(&self) -> PostKind {
        match self {
            Post::EmployeePost(_) => PostKind::EmployeePost,
            Post::MemberPost(_) => PostKind::MemberPost,
            Post::CareRecipientPost(_) => PostKind::CareRecipientPost,
        }
    }

    /// Returns the row id, if assigned.
    pub fn id(&self) -> Option<i64> {
        match self {
            Post::EmployeePost(p) => p.id,
            Post::MemberPost(p) => p.id,
            Post::CareRecipientPost(p) => p.id,
        }
    }

    /// Returns the post body.
    pub fn body(&self) -> &str {
        match self {
            Post::EmployeePost(p) => &p.body,
            Post::MemberPost(p) => &p.body,
            Post::CareRecipientPost(p) => &p.body,
        }
    }

    /// Returns the feed this post belongs to.
    pub fn feed_id(&self) -> i64 {
        match self {
            Post::EmployeePost(p) => p.feed_id,
            Post::MemberPost(p) => p.feed_id,
            Post::CareRecipientPost(p) => p.feed_id,
        }
    }

    /// Returns the tenant key, if set.
    pub fn workspace_id(&self) -> Option<WorkspaceId> {
        match self {
            Post::EmployeePost(p) => p.workspace_id,
            Post::MemberPost(p) => p.workspace_id,
            Post::CareRecipientPost(p) => p.workspace_id,
        }
    }

    pub(crate) fn workspace_id_mut(&mut self) -> &mut Option<WorkspaceId> {
        match self {
            Post::EmployeePost(p) => &mut p.workspace_id,
            Post::MemberPost(p) => &mut p.workspace_id,
            Post::CareRecipientPost(p) => &mut p.workspace_id,
        }
    }

    pub(crate) fn set_id(&mut self, id: i64) {
        match self {
            Post::EmployeePost(p) => p.id = Some(id),
            Post::MemberPost(p) => p.id = Some(id),
            Post::CareRecipientPost(p) => p.id = Some(id),
        }
    }
}

impl From<EmployeePost> for Post {
    fn from(p: EmployeePost) -> Self {
        Post::EmployeePost(p)
    }
}

impl From<MemberPost> for Post {
    fn from(p: MemberPost) -> Self {
        Post::MemberPost(p)
    }
}

impl From<CareRecipientPost> for Post {
    fn from(p: CareRecipientPost) -> Self {
        Post::CareRecipientPost(p)
    }
}
