//! Collaborator interfaces consumed by the access engine.
//!
//! Role resolution needs two external lookups: which communities a user
//! moderates or owns (Membership Provider) and which deposits a contact
//! address holds pending review invitations for (Invitation Directory).
//! Both are async trait seams so the application can back them with its
//! persistence layer; `DashMap`-backed in-memory implementations are provided
//! for tests and single-process deployments.
//!
//! Lookup failures surface as `CollaboratorError` and are propagated, never
//! swallowed: an engine that silently resolved "no roles" on a datastore
//! outage would under-grant, and guessing the other way would over-grant.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::principal::{CommunityId, DepositId, UserId};
use crate::resource::InviteStatus;

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// A collaborator lookup failed.
#[derive(Debug, Clone, Error)]
#[error("{service} lookup failed: {message}")]
pub struct CollaboratorError {
    /// Which collaborator failed (`"membership"`, `"invitations"`).
    pub service: &'static str,
    pub message: String,
}

impl CollaboratorError {
    pub fn new(service: &'static str, message: impl Into<String>) -> Self {
        Self {
            service,
            message: message.into(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Membership Provider
// ═══════════════════════════════════════════════════════════════════════════════

/// Reports which communities a user holds moderator or owner rank in.
#[async_trait]
pub trait MembershipProvider: Send + Sync {
    /// Communities where the user is a moderator.
    async fn moderator_communities(
        &self,
        user: &UserId,
    ) -> Result<Vec<CommunityId>, CollaboratorError>;

    /// Communities where the user is an owner.
    async fn owner_communities(
        &self,
        user: &UserId,
    ) -> Result<Vec<CommunityId>, CollaboratorError>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// Invitation Directory
// ═══════════════════════════════════════════════════════════════════════════════

/// A pending review invitation, reduced to what the rule tables need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvitedDeposit {
    /// The deposit the contact was invited to review.
    pub deposit: DepositId,
    pub status: InviteStatus,
}

impl InvitedDeposit {
    pub fn pending(deposit: impl Into<DepositId>) -> Self {
        Self {
            deposit: deposit.into(),
            status: InviteStatus::Pending,
        }
    }
}

/// Looks up pending review invitations by contact address.
#[async_trait]
pub trait InvitationDirectory: Send + Sync {
    /// Pending invitations addressed to the given contact.
    async fn pending_invitations(
        &self,
        contact: &str,
    ) -> Result<Vec<InvitedDeposit>, CollaboratorError>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// In-memory implementations
// ═══════════════════════════════════════════════════════════════════════════════

/// In-memory membership provider backed by `DashMap`.
#[derive(Debug, Default)]
pub struct InMemoryMembership {
    moderators: DashMap<UserId, Vec<CommunityId>>,
    owners: DashMap<UserId, Vec<CommunityId>>,
}

impl InMemoryMembership {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the user as moderator of a community.
    pub fn add_moderator(&self, user: impl Into<UserId>, community: impl Into<CommunityId>) {
        self.moderators
            .entry(user.into())
            .or_default()
            .push(community.into());
    }

    /// Record the user as owner of a community.
    pub fn add_owner(&self, user: impl Into<UserId>, community: impl Into<CommunityId>) {
        self.owners
            .entry(user.into())
            .or_default()
            .push(community.into());
    }
}

#[async_trait]
impl MembershipProvider for InMemoryMembership {
    async fn moderator_communities(
        &self,
        user: &UserId,
    ) -> Result<Vec<CommunityId>, CollaboratorError> {
        Ok(self
            .moderators
            .get(user)
            .map(|ids| ids.clone())
            .unwrap_or_default())
    }

    async fn owner_communities(
        &self,
        user: &UserId,
    ) -> Result<Vec<CommunityId>, CollaboratorError> {
        Ok(self
            .owners
            .get(user)
            .map(|ids| ids.clone())
            .unwrap_or_default())
    }
}

/// In-memory invitation directory backed by `DashMap`.
#[derive(Debug, Default)]
pub struct InMemoryInvitations {
    by_contact: DashMap<String, Vec<InvitedDeposit>>,
}

impl InMemoryInvitations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pending invitation for a contact address.
    pub fn invite(&self, contact: impl Into<String>, deposit: impl Into<DepositId>) {
        self.by_contact
            .entry(contact.into())
            .or_default()
            .push(InvitedDeposit::pending(deposit));
    }
}

#[async_trait]
impl InvitationDirectory for InMemoryInvitations {
    async fn pending_invitations(
        &self,
        contact: &str,
    ) -> Result<Vec<InvitedDeposit>, CollaboratorError> {
        Ok(self
            .by_contact
            .get(contact)
            .map(|invites| {
                invites
                    .iter()
                    .filter(|invite| invite.status == InviteStatus::Pending)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// Membership provider that always fails; used to exercise the
/// collaborator-unavailable path.
#[cfg(test)]
pub(crate) struct FailingMembership;

#[cfg(test)]
#[async_trait]
impl MembershipProvider for FailingMembership {
    async fn moderator_communities(
        &self,
        _user: &UserId,
    ) -> Result<Vec<CommunityId>, CollaboratorError> {
        Err(CollaboratorError::new("membership", "connection refused"))
    }

    async fn owner_communities(
        &self,
        _user: &UserId,
    ) -> Result<Vec<CommunityId>, CollaboratorError> {
        Err(CollaboratorError::new("membership", "connection refused"))
    }
}
