//! Roles and the role resolver.
//!
//! Roles are derived per request, never stored: the resolver maps a principal
//! (plus two membership lookups) to the set of role-specific rule tables that
//! apply. A principal commonly holds several roles at once, e.g. Registered +
//! Moderator + Owner.

use std::sync::Arc;
use tracing::debug;

use crate::error::Result;
use crate::principal::{CommunityId, Principal};
use crate::providers::MembershipProvider;

/// A named category of principal, selecting a rule table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    /// Everyone, identified or not.
    Visitor,
    /// Identified but not yet onboarded.
    IncompleteRegistered,
    /// Identified and onboarded.
    Registered,
    /// Moderator of the given communities.
    Moderator(Vec<CommunityId>),
    /// Owner of the given communities; implies moderator rules for them.
    Owner(Vec<CommunityId>),
    /// Platform admin.
    Admin,
}

/// Derives the roles applicable to a principal.
#[derive(Clone)]
pub struct RoleResolver {
    membership: Arc<dyn MembershipProvider>,
}

impl RoleResolver {
    pub fn new(membership: Arc<dyn MembershipProvider>) -> Self {
        Self { membership }
    }

    /// Resolve the set of roles for a principal.
    ///
    /// Issues at most two membership lookups (moderated and owned
    /// communities), and only for onboarded identities. Lookup failures
    /// propagate; they are never treated as "no roles".
    pub async fn resolve(&self, principal: &Principal) -> Result<Vec<Role>> {
        let identity = match principal {
            Principal::Anonymous => return Ok(vec![Role::Visitor]),
            Principal::Identified(identity) => identity,
        };

        if !identity.is_onboarded {
            return Ok(vec![Role::Visitor, Role::IncompleteRegistered]);
        }

        let mut roles = vec![Role::Visitor, Role::Registered];

        let moderated = self.membership.moderator_communities(&identity.id).await?;
        if !moderated.is_empty() {
            roles.push(Role::Moderator(moderated));
        }

        let owned = self.membership.owner_communities(&identity.id).await?;
        if !owned.is_empty() {
            roles.push(Role::Owner(owned));
        }

        if identity.is_platform_admin() {
            roles.push(Role::Admin);
        }

        debug!(user_id = %identity.id, roles = roles.len(), "resolved roles");
        Ok(roles)
    }
}
