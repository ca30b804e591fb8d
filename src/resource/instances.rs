//! Concrete domain instances and their attribute maps.
//!
//! These are the partially-populated views the surrounding application hands
//! to a permission query. Each struct exposes exactly the attributes the rule
//! tables condition on; anything else resolves to `None` and fails closed.
//! Nested references (`CommunityRef`, `DepositRef`) back the dotted paths
//! (`community.private_reviews`, `deposit.creator`).

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Resource, ResourceKind};
use crate::condition::{AttrValue, Value};
use crate::principal::{CommunityId, DepositId, UserId};

// ═══════════════════════════════════════════════════════════════════════════════
// Statuses
// ═══════════════════════════════════════════════════════════════════════════════

/// Deposit lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DepositStatus {
    Draft,
    PendingApproval,
    Preprint,
    Published,
    Rejected,
}

impl DepositStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::PendingApproval => "pendingApproval",
            Self::Preprint => "preprint",
            Self::Published => "published",
            Self::Rejected => "rejected",
        }
    }

    /// States visible to the public: preprint and published.
    pub const PUBLIC: [DepositStatus; 2] = [Self::Preprint, Self::Published];

    /// Every state past draft except rejected; the states moderators act on
    /// and invited reviewers may see.
    pub const NON_DRAFT: [DepositStatus; 3] =
        [Self::PendingApproval, Self::Preprint, Self::Published];
}

/// Review lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReviewStatus {
    Draft,
    PendingApproval,
    Published,
}

impl ReviewStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::PendingApproval => "pendingApproval",
            Self::Published => "published",
        }
    }

    pub const ALL: [ReviewStatus; 3] = [Self::Draft, Self::PendingApproval, Self::Published];
}

/// Community lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CommunityStatus {
    Draft,
    PendingApproval,
    Published,
}

impl CommunityStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::PendingApproval => "pendingApproval",
            Self::Published => "published",
        }
    }
}

/// Invitation states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InviteStatus {
    Pending,
    Accepted,
    Rejected,
}

impl InviteStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

macro_rules! status_value {
    ($($status:ty),+) => {
        $(
            impl From<$status> for Value {
                fn from(status: $status) -> Self {
                    Value::Str(status.as_str().to_string())
                }
            }

            impl fmt::Display for $status {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.as_str())
                }
            }
        )+
    };
}

status_value!(DepositStatus, ReviewStatus, CommunityStatus, InviteStatus);

// ═══════════════════════════════════════════════════════════════════════════════
// Deposit
// ═══════════════════════════════════════════════════════════════════════════════

/// The community a deposit belongs to, as seen by the rule tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityRef {
    pub id: CommunityId,
    /// When `true`, the community restricts reviews to private invitation and
    /// the open `review` rule does not apply to its deposits.
    pub private_reviews: bool,
}

impl CommunityRef {
    pub fn new(id: impl Into<CommunityId>) -> Self {
        Self {
            id: id.into(),
            private_reviews: false,
        }
    }

    pub fn private_reviews(mut self) -> Self {
        self.private_reviews = true;
        self
    }
}

/// A publication deposit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposit {
    pub id: DepositId,
    pub creator: UserId,
    pub status: DepositStatus,
    pub community: CommunityRef,
    pub version: u32,
    pub is_latest_version: bool,
    /// Whether the deposit is flagged as open for review.
    pub can_be_reviewed: bool,
    /// Whether the author enabled reviewer invitations.
    pub can_invite_reviewers: bool,
    /// Users who already authored a review of this deposit.
    pub reviewers: Vec<UserId>,
}

impl Deposit {
    pub fn new(
        id: impl Into<DepositId>,
        creator: impl Into<UserId>,
        community: CommunityRef,
        status: DepositStatus,
    ) -> Self {
        Self {
            id: id.into(),
            creator: creator.into(),
            status,
            community,
            version: 1,
            is_latest_version: true,
            can_be_reviewed: false,
            can_invite_reviewers: false,
            reviewers: Vec::new(),
        }
    }

    pub fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn superseded(mut self) -> Self {
        self.is_latest_version = false;
        self
    }

    pub fn reviewable(mut self) -> Self {
        self.can_be_reviewed = true;
        self
    }

    pub fn invites_enabled(mut self) -> Self {
        self.can_invite_reviewers = true;
        self
    }

    pub fn reviewed_by(mut self, user: impl Into<UserId>) -> Self {
        self.reviewers.push(user.into());
        self
    }
}

impl Resource for Deposit {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Deposit
    }

    fn attribute(&self, path: &str) -> Option<AttrValue> {
        match path {
            "id" => Some(AttrValue::str(self.id.as_str())),
            "creator" => Some(AttrValue::str(self.creator.as_str())),
            "status" => Some(AttrValue::Scalar(self.status.into())),
            "version" => Some(AttrValue::int(i64::from(self.version))),
            "is_latest_version" => Some(AttrValue::bool(self.is_latest_version)),
            "can_be_reviewed" => Some(AttrValue::bool(self.can_be_reviewed)),
            "can_invite_reviewers" => Some(AttrValue::bool(self.can_invite_reviewers)),
            "reviewers" => Some(AttrValue::list(self.reviewers.iter())),
            "community.id" => Some(AttrValue::str(self.community.id.as_str())),
            "community.private_reviews" => Some(AttrValue::bool(self.community.private_reviews)),
            _ => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Review
// ═══════════════════════════════════════════════════════════════════════════════

/// The deposit a review was written for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositRef {
    pub id: DepositId,
    pub creator: UserId,
}

impl DepositRef {
    pub fn new(id: impl Into<DepositId>, creator: impl Into<UserId>) -> Self {
        Self {
            id: id.into(),
            creator: creator.into(),
        }
    }
}

/// A peer review of a deposit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub creator: UserId,
    pub status: ReviewStatus,
    /// The community of the reviewed deposit; moderation scope.
    pub community: CommunityId,
    /// Whether the review is globally visible once published.
    pub show_to_everyone: bool,
    /// Whether the deposit's author may read the review once published.
    pub show_to_author: bool,
    /// Populated parent deposit, when loaded.
    pub deposit: Option<DepositRef>,
}

impl Review {
    pub fn new(
        id: impl Into<String>,
        creator: impl Into<UserId>,
        community: impl Into<CommunityId>,
        status: ReviewStatus,
    ) -> Self {
        Self {
            id: id.into(),
            creator: creator.into(),
            status,
            community: community.into(),
            show_to_everyone: false,
            show_to_author: false,
            deposit: None,
        }
    }

    pub fn visible_to_everyone(mut self) -> Self {
        self.show_to_everyone = true;
        self
    }

    pub fn visible_to_author(mut self) -> Self {
        self.show_to_author = true;
        self
    }

    pub fn on_deposit(mut self, deposit: DepositRef) -> Self {
        self.deposit = Some(deposit);
        self
    }
}

impl Resource for Review {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Review
    }

    fn attribute(&self, path: &str) -> Option<AttrValue> {
        match path {
            "id" => Some(AttrValue::str(self.id.as_str())),
            "creator" => Some(AttrValue::str(self.creator.as_str())),
            "status" => Some(AttrValue::Scalar(self.status.into())),
            "community" => Some(AttrValue::str(self.community.as_str())),
            "show_to_everyone" => Some(AttrValue::bool(self.show_to_everyone)),
            "show_to_author" => Some(AttrValue::bool(self.show_to_author)),
            "deposit.id" => {
                let deposit = self.deposit.as_ref()?;
                Some(AttrValue::str(deposit.id.as_str()))
            }
            "deposit.creator" => {
                let deposit = self.deposit.as_ref()?;
                Some(AttrValue::str(deposit.creator.as_str()))
            }
            _ => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Community
// ═══════════════════════════════════════════════════════════════════════════════

/// A community that deposits are submitted to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Community {
    pub id: CommunityId,
    pub creator: UserId,
    pub status: CommunityStatus,
}

impl Community {
    pub fn new(
        id: impl Into<CommunityId>,
        creator: impl Into<UserId>,
        status: CommunityStatus,
    ) -> Self {
        Self {
            id: id.into(),
            creator: creator.into(),
            status,
        }
    }
}

impl Resource for Community {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Community
    }

    fn attribute(&self, path: &str) -> Option<AttrValue> {
        match path {
            "id" => Some(AttrValue::str(self.id.as_str())),
            "creator" => Some(AttrValue::str(self.creator.as_str())),
            "status" => Some(AttrValue::Scalar(self.status.into())),
            _ => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// User profile
// ═══════════════════════════════════════════════════════════════════════════════

/// A user's public profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
}

impl UserProfile {
    pub fn new(id: impl Into<UserId>) -> Self {
        Self { id: id.into() }
    }
}

impl Resource for UserProfile {
    fn kind(&self) -> ResourceKind {
        ResourceKind::User
    }

    fn attribute(&self, path: &str) -> Option<AttrValue> {
        match path {
            "id" => Some(AttrValue::str(self.id.as_str())),
            _ => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Invite
// ═══════════════════════════════════════════════════════════════════════════════

/// A reviewer invitation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invite {
    pub id: String,
    /// The user who sent the invitation.
    pub sender: UserId,
    /// Contact address of the invited reviewer.
    pub addressee: String,
    pub status: InviteStatus,
}

impl Invite {
    pub fn new(
        id: impl Into<String>,
        sender: impl Into<UserId>,
        addressee: impl Into<String>,
        status: InviteStatus,
    ) -> Self {
        Self {
            id: id.into(),
            sender: sender.into(),
            addressee: addressee.into(),
            status,
        }
    }
}

impl Resource for Invite {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Invite
    }

    fn attribute(&self, path: &str) -> Option<AttrValue> {
        match path {
            "id" => Some(AttrValue::str(self.id.as_str())),
            "sender" => Some(AttrValue::str(self.sender.as_str())),
            "addressee" => Some(AttrValue::str(self.addressee.as_str())),
            "status" => Some(AttrValue::Scalar(self.status.into())),
            _ => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Comment
// ═══════════════════════════════════════════════════════════════════════════════

/// A comment on a deposit or review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub creator: UserId,
    pub community: CommunityId,
    /// `true` when this comment is itself a reply. Replies to replies are
    /// not allowed, so the reply rule conditions on this being `false`.
    pub has_parent: bool,
}

impl Comment {
    pub fn new(
        id: impl Into<String>,
        creator: impl Into<UserId>,
        community: impl Into<CommunityId>,
    ) -> Self {
        Self {
            id: id.into(),
            creator: creator.into(),
            community: community.into(),
            has_parent: false,
        }
    }

    pub fn reply(mut self) -> Self {
        self.has_parent = true;
        self
    }
}

impl Resource for Comment {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Comment
    }

    fn attribute(&self, path: &str) -> Option<AttrValue> {
        match path {
            "id" => Some(AttrValue::str(self.id.as_str())),
            "creator" => Some(AttrValue::str(self.creator.as_str())),
            "community" => Some(AttrValue::str(self.community.as_str())),
            "has_parent" => Some(AttrValue::bool(self.has_parent)),
            _ => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Session
// ═══════════════════════════════════════════════════════════════════════════════

/// A conference session hosted by a community.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub community: CommunityId,
}

impl Session {
    pub fn new(id: impl Into<String>, community: impl Into<CommunityId>) -> Self {
        Self {
            id: id.into(),
            community: community.into(),
        }
    }
}

impl Resource for Session {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Session
    }

    fn attribute(&self, path: &str) -> Option<AttrValue> {
        match path {
            "id" => Some(AttrValue::str(self.id.as_str())),
            "community" => Some(AttrValue::str(self.community.as_str())),
            _ => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Conversation
// ═══════════════════════════════════════════════════════════════════════════════

/// A private conversation between users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub participants: Vec<UserId>,
}

impl Conversation {
    pub fn new<I, U>(id: impl Into<String>, participants: I) -> Self
    where
        I: IntoIterator<Item = U>,
        U: Into<UserId>,
    {
        Self {
            id: id.into(),
            participants: participants.into_iter().map(Into::into).collect(),
        }
    }
}

impl Resource for Conversation {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Conversation
    }

    fn attribute(&self, path: &str) -> Option<AttrValue> {
        match path {
            "id" => Some(AttrValue::str(self.id.as_str())),
            "participants" => Some(AttrValue::list(self.participants.iter())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deposit_attributes() {
        let deposit = Deposit::new(
            "d1",
            "alice",
            CommunityRef::new("c1").private_reviews(),
            DepositStatus::Preprint,
        )
        .version(2)
        .reviewable()
        .reviewed_by("bob");

        assert_eq!(deposit.attribute("creator"), Some(AttrValue::str("alice")));
        assert_eq!(
            deposit.attribute("status"),
            Some(AttrValue::str("preprint"))
        );
        assert_eq!(deposit.attribute("version"), Some(AttrValue::int(2)));
        assert_eq!(
            deposit.attribute("is_latest_version"),
            Some(AttrValue::bool(true))
        );
        assert_eq!(
            deposit.attribute("community.id"),
            Some(AttrValue::str("c1"))
        );
        assert_eq!(
            deposit.attribute("community.private_reviews"),
            Some(AttrValue::bool(true))
        );
        assert_eq!(
            deposit.attribute("reviewers"),
            Some(AttrValue::list(["bob"]))
        );
        assert_eq!(deposit.attribute("nope"), None);
    }

    #[test]
    fn test_review_populated_deposit() {
        let review = Review::new("r1", "bob", "c1", ReviewStatus::Published)
            .on_deposit(DepositRef::new("d1", "alice"));

        assert_eq!(
            review.attribute("deposit.creator"),
            Some(AttrValue::str("alice"))
        );
        assert_eq!(review.attribute("deposit.id"), Some(AttrValue::str("d1")));
    }

    #[test]
    fn test_review_unpopulated_deposit() {
        let review = Review::new("r1", "bob", "c1", ReviewStatus::Published);
        assert_eq!(review.attribute("deposit.creator"), None);
    }

    #[test]
    fn test_comment_reply_flag() {
        let top = Comment::new("m1", "alice", "c1");
        assert_eq!(top.attribute("has_parent"), Some(AttrValue::bool(false)));

        let reply = Comment::new("m2", "bob", "c1").reply();
        assert_eq!(reply.attribute("has_parent"), Some(AttrValue::bool(true)));
    }

    #[test]
    fn test_conversation_participants() {
        let convo = Conversation::new("t1", ["alice", "bob"]);
        assert_eq!(
            convo.attribute("participants"),
            Some(AttrValue::list(["alice", "bob"]))
        );
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(DepositStatus::PendingApproval.as_str(), "pendingApproval");
        assert_eq!(ReviewStatus::Published.as_str(), "published");
        assert_eq!(InviteStatus::Pending.to_string(), "pending");
    }
}
