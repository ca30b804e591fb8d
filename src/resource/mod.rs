//! Resource kinds, the action vocabulary, and the action inventory.
//!
//! This module provides:
//! - **ResourceKind**: the tagged enumeration of domain resource types
//! - **Action**: the crate-wide action vocabulary
//! - **Action Inventory**: the fixed per-kind catalogue of meaningful actions
//! - **Resource**: the trait instances implement to expose their kind and
//!   attributes to the condition evaluator
//!
//! The inventory is compile-time data. `allowed_actions` filters it in order,
//! so the ordering here is the ordering downstream consumers see.

pub mod instances;

pub use instances::{
    Comment, Community, CommunityRef, CommunityStatus, Conversation, Deposit,
    DepositRef, DepositStatus, Invite, InviteStatus, Review, ReviewStatus,
    Session, UserProfile,
};

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::condition::AttrValue;

// ═══════════════════════════════════════════════════════════════════════════════
// Resource Kind
// ═══════════════════════════════════════════════════════════════════════════════

/// The domain's resource types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceKind {
    Deposit,
    Review,
    Community,
    User,
    Invite,
    Comment,
    Session,
    Conversation,
}

impl ResourceKind {
    /// All resource kinds.
    pub const ALL: [ResourceKind; 8] = [
        Self::Deposit,
        Self::Review,
        Self::Community,
        Self::User,
        Self::Invite,
        Self::Comment,
        Self::Session,
        Self::Conversation,
    ];

    /// The fixed catalogue of actions meaningful for this kind, in the order
    /// `allowed_actions` reports them.
    ///
    /// Invariant: contains every action any rule table references for this
    /// kind (checked by a test against the rule tables).
    pub const fn actions(&self) -> &'static [Action] {
        match self {
            Self::Deposit => &[
                Action::Read,
                Action::Create,
                Action::Update,
                Action::UpdateCommunity,
                Action::Delete,
                Action::InviteReviewers,
                Action::CreateVersion,
                Action::CreateComment,
                Action::Review,
                Action::Moderate,
                Action::Edit,
            ],
            Self::Review => &[
                Action::Read,
                Action::Create,
                Action::Update,
                Action::Delete,
                Action::Edit,
                Action::Moderate,
                Action::CreateComment,
            ],
            Self::Community => &[
                Action::Read,
                Action::Create,
                Action::Update,
                Action::Submit,
                Action::Join,
                Action::Moderate,
            ],
            Self::User => &[Action::Read, Action::Update],
            Self::Invite => &[Action::Read, Action::Update],
            Self::Comment => &[Action::Read, Action::Reply, Action::Edit, Action::Delete],
            Self::Session => &[Action::Read, Action::Edit, Action::Delete],
            Self::Conversation => &[Action::Read],
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Deposit => "deposit",
            Self::Review => "review",
            Self::Community => "community",
            Self::User => "user",
            Self::Invite => "invite",
            Self::Comment => "comment",
            Self::Session => "session",
            Self::Conversation => "conversation",
        };
        write!(f, "{s}")
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Actions
// ═══════════════════════════════════════════════════════════════════════════════

/// The crate-wide action vocabulary.
///
/// One enum rather than one per kind: which actions are meaningful for a kind
/// is expressed by the inventory (`ResourceKind::actions`), and rules are
/// uniform data regardless of the kind they target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
    Edit,
    Moderate,
    Review,
    CreateVersion,
    CreateComment,
    InviteReviewers,
    UpdateCommunity,
    Join,
    Submit,
    Reply,
}

impl Action {
    /// Canonical string form, matching the API's action names.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Edit => "edit",
            Self::Moderate => "moderate",
            Self::Review => "review",
            Self::CreateVersion => "createVersion",
            Self::CreateComment => "createComment",
            Self::InviteReviewers => "inviteReviewers",
            Self::UpdateCommunity => "updateCommunity",
            Self::Join => "join",
            Self::Submit => "submit",
            Self::Reply => "reply",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Resource trait
// ═══════════════════════════════════════════════════════════════════════════════

/// A concrete domain instance a permission query runs against.
///
/// Instances are partially populated views of domain objects: an attribute
/// that was not loaded resolves to `None`, which the evaluator treats as a
/// non-match.
pub trait Resource {
    /// The resource kind of this instance.
    fn kind(&self) -> ResourceKind;

    /// Resolve a dotted attribute path against this instance.
    fn attribute(&self, path: &str) -> Option<AttrValue>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_strings() {
        assert_eq!(Action::Read.as_str(), "read");
        assert_eq!(Action::CreateVersion.as_str(), "createVersion");
        assert_eq!(Action::InviteReviewers.as_str(), "inviteReviewers");
        assert_eq!(Action::UpdateCommunity.to_string(), "updateCommunity");
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ResourceKind::Deposit.to_string(), "deposit");
        assert_eq!(ResourceKind::Conversation.to_string(), "conversation");
    }

    #[test]
    fn test_every_kind_has_inventory() {
        for kind in ResourceKind::ALL {
            assert!(
                !kind.actions().is_empty(),
                "kind {kind} has an empty action inventory"
            );
        }
    }

    #[test]
    fn test_inventory_has_no_duplicates() {
        for kind in ResourceKind::ALL {
            let actions = kind.actions();
            for (i, action) in actions.iter().enumerate() {
                assert!(
                    !actions[..i].contains(action),
                    "kind {kind} lists {action} twice"
                );
            }
        }
    }

    #[test]
    fn test_deposit_inventory_order() {
        let actions = ResourceKind::Deposit.actions();
        assert_eq!(actions.first(), Some(&Action::Read));
        assert_eq!(actions.last(), Some(&Action::Edit));
        assert_eq!(actions.len(), 11);
    }
}
