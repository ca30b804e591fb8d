//! # Atrium Access
//!
//! Permission engine for the Atrium publishing platform: computes, for a
//! given principal, the set of actions permitted on domain resources
//! (deposits, reviews, communities, invitations, comments, sessions,
//! conversations, user profiles) and enforces those decisions at request
//! time.
//!
//! ## Architecture
//!
//! - **Condition Evaluator**: interprets structured predicates against
//!   partially-populated resource instances, fail-closed
//! - **Role Resolver**: derives a principal's roles from identity flags and
//!   membership lookups
//! - **Rule Set Builder**: per-role permission tables, composed by union
//! - **Ability Cache**: short-TTL per-principal storage of composed rules
//! - **Permission Engine**: `can` / `assert_can` / `allowed_actions` queries
//! - **Action Inventory**: the fixed per-kind action catalogue backing
//!   `allowed_actions`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use atrium_access::prelude::*;
//! use std::sync::Arc;
//!
//! let engine = PermissionEngine::new(AccessConfig::default(), membership, invitations);
//!
//! let ability = engine.ability_for(&principal).await?;
//! if ability.can(Action::Update, &deposit) {
//!     // ...
//! }
//! ability.assert_can(Action::Delete, &deposit)?;
//!
//! let actions = engine.allowed_actions(&principal, &deposit).await?;
//! ```
//!
//! Authentication is out of scope: the engine receives an
//! already-authenticated [`Principal`](principal::Principal) or
//! `Principal::Anonymous`.

pub mod ability;
pub mod condition;
pub mod config;
pub mod error;
pub mod principal;
pub mod providers;
pub mod resource;

pub use error::{AccessError, ErrorCode, Result};

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::ability::{
        Ability, AbilityCache, AbilityCacheStats, PermissionEngine, Role, RoleResolver, Rule,
    };
    pub use crate::condition::{AttrValue, Matcher, Predicate, Value};
    pub use crate::config::AccessConfig;
    pub use crate::error::{AccessError, ErrorCode, Result};
    pub use crate::principal::{
        CommunityId, DepositId, Identity, Principal, UserId, PLATFORM_ADMIN_ROLE,
    };
    pub use crate::providers::{
        CollaboratorError, InMemoryInvitations, InMemoryMembership, InvitationDirectory,
        InvitedDeposit, MembershipProvider,
    };
    pub use crate::resource::{
        Action, Comment, Community, CommunityRef, CommunityStatus, Conversation, Deposit,
        DepositRef, DepositStatus, Invite, InviteStatus, Resource, ResourceKind, Review,
        ReviewStatus, Session, UserProfile,
    };
}
