//! Permission rules and the per-role rule tables.
//!
//! A `Rule` grants a set of actions on a resource kind, optionally gated by a
//! condition evaluated against the instance. Rules are pure data; there are
//! no deny rules, so composing role tables is a monotonic union and order
//! only matters for which matching rule is reported during introspection.
//!
//! The tables mirror the platform's role model:
//!
//! | Role                 | Grants                                          |
//! |----------------------|-------------------------------------------------|
//! | Visitor              | public reads                                    |
//! | IncompleteRegistered | update own profile                              |
//! | Registered           | author/reviewer/participant rules (~20 rules)   |
//! | Moderator(ids)       | moderation over resources in those communities  |
//! | Owner(ids)           | moderator rules plus updating the community     |
//! | Admin                | wildcard                                        |
//!
//! Roles compose: the resolver always pairs the richer roles with Visitor, so
//! each table only contains its own delta.

use serde::{Deserialize, Serialize};

use crate::condition::Predicate;
use crate::config::AccessConfig;
use crate::principal::{CommunityId, DepositId, Identity};
use crate::providers::InvitedDeposit;
use crate::resource::{
    Action, CommunityStatus, DepositStatus, InviteStatus, Resource, ResourceKind, ReviewStatus,
};

// ═══════════════════════════════════════════════════════════════════════════════
// Rule
// ═══════════════════════════════════════════════════════════════════════════════

/// Which actions a rule grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionFilter {
    /// Every action (admin wildcard).
    Any,
    Only(Vec<Action>),
}

impl ActionFilter {
    pub fn permits(&self, action: Action) -> bool {
        match self {
            Self::Any => true,
            Self::Only(actions) => actions.contains(&action),
        }
    }
}

/// Which resource kind a rule targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KindFilter {
    /// Every kind (admin wildcard).
    Any,
    Only(ResourceKind),
}

impl KindFilter {
    pub fn permits(&self, kind: ResourceKind) -> bool {
        match self {
            Self::Any => true,
            Self::Only(only) => *only == kind,
        }
    }
}

/// A permission grant: actions on a kind, optionally conditioned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub actions: ActionFilter,
    pub kind: KindFilter,
    /// When absent, the rule matches any instance of the kind.
    pub condition: Option<Predicate>,
}

impl Rule {
    /// Grant `actions` on `kind` unconditionally.
    pub fn allow<const N: usize>(actions: [Action; N], kind: ResourceKind) -> Self {
        Self {
            actions: ActionFilter::Only(actions.to_vec()),
            kind: KindFilter::Only(kind),
            condition: None,
        }
    }

    /// The admin wildcard: all actions on all kinds.
    pub fn manage_all() -> Self {
        Self {
            actions: ActionFilter::Any,
            kind: KindFilter::Any,
            condition: None,
        }
    }

    /// Attach a condition to this rule.
    pub fn when(mut self, condition: Predicate) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Whether this rule covers the action/kind pair, ignoring the condition.
    pub fn applies_to(&self, action: Action, kind: ResourceKind) -> bool {
        self.actions.permits(action) && self.kind.permits(kind)
    }

    /// Whether this rule grants `action` on the given instance.
    pub fn matches(&self, action: Action, instance: &dyn Resource) -> bool {
        self.applies_to(action, instance.kind())
            && self
                .condition
                .as_ref()
                .map_or(true, |condition| condition.matches(instance))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Visitor
// ═══════════════════════════════════════════════════════════════════════════════

/// Rules every principal gets, identified or not.
pub fn visitor_rules() -> Vec<Rule> {
    vec![
        // Anyone may read any user profile.
        Rule::allow([Action::Read], ResourceKind::User),
        // Public deposits.
        Rule::allow([Action::Read], ResourceKind::Deposit)
            .when(Predicate::new().is_in("status", DepositStatus::PUBLIC)),
        // Published reviews that are globally visible.
        Rule::allow([Action::Read], ResourceKind::Review).when(
            Predicate::new()
                .eq("status", ReviewStatus::Published)
                .eq("show_to_everyone", true),
        ),
        // Published communities.
        Rule::allow([Action::Read], ResourceKind::Community)
            .when(Predicate::new().eq("status", CommunityStatus::Published)),
        Rule::allow([Action::Read], ResourceKind::Comment),
        Rule::allow([Action::Read], ResourceKind::Session),
    ]
}

// ═══════════════════════════════════════════════════════════════════════════════
// Incomplete registered
// ═══════════════════════════════════════════════════════════════════════════════

/// Delta for an identified user who has not finished onboarding.
pub fn incomplete_registered_rules(user: &Identity) -> Vec<Rule> {
    vec![
        Rule::allow([Action::Update], ResourceKind::User)
            .when(Predicate::new().eq("id", &user.id)),
    ]
}

// ═══════════════════════════════════════════════════════════════════════════════
// Registered
// ═══════════════════════════════════════════════════════════════════════════════

/// Delta for a fully onboarded user.
///
/// `invited` holds the user's pending review invitations, already fetched
/// from the invitation directory by the engine.
pub fn registered_rules(
    user: &Identity,
    invited: &[InvitedDeposit],
    config: &AccessConfig,
) -> Vec<Rule> {
    let me = &user.id;
    let mut rules = vec![
        // ── Deposits ─────────────────────────────────────────────────────────
        Rule::allow([Action::Read, Action::Edit], ResourceKind::Deposit)
            .when(Predicate::new().eq("creator", me)),
        Rule::allow([Action::Create], ResourceKind::Deposit),
        // Drafts are the only state the author may rewrite or withdraw.
        Rule::allow([Action::Update, Action::Delete], ResourceKind::Deposit).when(
            Predicate::new()
                .eq("creator", me)
                .eq("status", DepositStatus::Draft),
        ),
        // Moving a deposit to another community is only allowed before the
        // first version leaves draft.
        Rule::allow([Action::UpdateCommunity], ResourceKind::Deposit).when(
            Predicate::new()
                .eq("creator", me)
                .eq("status", DepositStatus::Draft)
                .eq("version", 1i64),
        ),
        Rule::allow([Action::CreateVersion], ResourceKind::Deposit).when(
            Predicate::new()
                .eq("creator", me)
                .is_in("status", DepositStatus::PUBLIC)
                .eq("is_latest_version", true),
        ),
        Rule::allow([Action::InviteReviewers], ResourceKind::Deposit).when(
            Predicate::new()
                .eq("creator", me)
                .is_in("status", DepositStatus::PUBLIC)
                .eq("is_latest_version", true)
                .eq("can_invite_reviewers", true),
        ),
        Rule::allow([Action::CreateComment], ResourceKind::Deposit)
            .when(Predicate::new().is_in("status", DepositStatus::PUBLIC)),
        // Open reviewing: public, not own, not already reviewed by self, the
        // community does not restrict reviews to invitation, and the deposit
        // is flagged reviewable.
        Rule::allow([Action::Review], ResourceKind::Deposit).when(
            Predicate::new()
                .is_in("status", DepositStatus::PUBLIC)
                .ne("creator", me)
                .ne("reviewers", me)
                .eq("community.private_reviews", false)
                .eq("can_be_reviewed", true),
        ),
        // ── Reviews ──────────────────────────────────────────────────────────
        Rule::allow([Action::Read, Action::Edit], ResourceKind::Review)
            .when(Predicate::new().eq("creator", me)),
        // Authors see published reviews of their own deposits when the review
        // is configured visible-to-author.
        Rule::allow([Action::Read], ResourceKind::Review).when(
            Predicate::new()
                .eq("status", ReviewStatus::Published)
                .eq("deposit.creator", me)
                .eq("show_to_author", true),
        ),
        Rule::allow([Action::Update, Action::Delete], ResourceKind::Review).when(
            Predicate::new()
                .eq("creator", me)
                .eq("status", ReviewStatus::Draft),
        ),
        Rule::allow([Action::CreateComment], ResourceKind::Review).when(
            Predicate::new()
                .eq("creator", me)
                .eq("status", ReviewStatus::Published),
        ),
        Rule::allow([Action::CreateComment], ResourceKind::Review).when(
            Predicate::new()
                .eq("deposit.creator", me)
                .eq("status", ReviewStatus::Published),
        ),
        // ── Communities ──────────────────────────────────────────────────────
        Rule::allow([Action::Join], ResourceKind::Community),
        Rule::allow([Action::Submit, Action::Update], ResourceKind::Community).when(
            Predicate::new()
                .eq("creator", me)
                .eq("status", CommunityStatus::Draft),
        ),
        Rule::allow([Action::Read], ResourceKind::Community)
            .when(Predicate::new().eq("creator", me)),
        // ── Profile ──────────────────────────────────────────────────────────
        Rule::allow([Action::Update], ResourceKind::User)
            .when(Predicate::new().eq("id", me)),
        // ── Invitations ──────────────────────────────────────────────────────
        Rule::allow([Action::Read], ResourceKind::Invite)
            .when(Predicate::new().eq("addressee", user.email.as_str())),
        Rule::allow([Action::Read], ResourceKind::Invite)
            .when(Predicate::new().eq("sender", me)),
        Rule::allow([Action::Update], ResourceKind::Invite).when(
            Predicate::new()
                .eq("addressee", user.email.as_str())
                .eq("status", InviteStatus::Pending),
        ),
        Rule::allow([Action::Update], ResourceKind::Invite).when(
            Predicate::new()
                .eq("sender", me)
                .eq("status", InviteStatus::Pending),
        ),
        // ── Comments & conversations ─────────────────────────────────────────
        Rule::allow([Action::Delete], ResourceKind::Comment)
            .when(Predicate::new().eq("creator", me)),
        // No replies to replies.
        Rule::allow([Action::Reply], ResourceKind::Comment)
            .when(Predicate::new().eq("has_parent", false)),
        Rule::allow([Action::Read], ResourceKind::Conversation)
            .when(Predicate::new().eq("participants", me)),
    ];

    // Community creation may be restricted to platform admins by deployment
    // configuration.
    if !config.restrict_community_creation {
        rules.push(Rule::allow([Action::Create], ResourceKind::Community));
    }

    // Invited reviewer: review/read the specific deposits this contact was
    // invited to, in any non-draft state.
    let invited_ids: Vec<&DepositId> = invited
        .iter()
        .filter(|invite| invite.status == InviteStatus::Pending)
        .map(|invite| &invite.deposit)
        .collect();
    if !invited_ids.is_empty() {
        rules.push(
            Rule::allow([Action::Review, Action::Read], ResourceKind::Deposit).when(
                Predicate::new()
                    .is_in("id", invited_ids)
                    .is_in("status", DepositStatus::NON_DRAFT),
            ),
        );
    }

    rules
}

// ═══════════════════════════════════════════════════════════════════════════════
// Moderator / Owner
// ═══════════════════════════════════════════════════════════════════════════════

/// Delta for a moderator of the given communities.
pub fn moderator_rules(communities: &[CommunityId]) -> Vec<Rule> {
    if communities.is_empty() {
        return Vec::new();
    }
    vec![
        // Full moderation once a deposit leaves draft (rejected excluded).
        Rule::allow(
            [
                Action::Read,
                Action::Update,
                Action::Moderate,
                Action::Edit,
                Action::InviteReviewers,
            ],
            ResourceKind::Deposit,
        )
        .when(
            Predicate::new()
                .is_in("community.id", communities)
                .is_in("status", DepositStatus::NON_DRAFT),
        ),
        // Drafts stay read-only even for moderators.
        Rule::allow([Action::Read], ResourceKind::Deposit).when(
            Predicate::new()
                .is_in("community.id", communities)
                .eq("status", DepositStatus::Draft),
        ),
        Rule::allow(
            [
                Action::Read,
                Action::Update,
                Action::Edit,
                Action::Moderate,
            ],
            ResourceKind::Review,
        )
        .when(
            Predicate::new()
                .is_in("community", communities)
                .is_in("status", ReviewStatus::ALL),
        ),
        Rule::allow([Action::Moderate], ResourceKind::Community)
            .when(Predicate::new().is_in("id", communities)),
        Rule::allow([Action::Edit, Action::Delete], ResourceKind::Session)
            .when(Predicate::new().is_in("community", communities)),
        Rule::allow([Action::Edit, Action::Delete], ResourceKind::Comment)
            .when(Predicate::new().is_in("community", communities)),
    ]
}

/// Delta for an owner: everything a moderator gets, plus updating the
/// community itself.
pub fn owner_rules(communities: &[CommunityId]) -> Vec<Rule> {
    if communities.is_empty() {
        return Vec::new();
    }
    let mut rules = moderator_rules(communities);
    rules.push(
        Rule::allow([Action::Update], ResourceKind::Community)
            .when(Predicate::new().is_in("id", communities)),
    );
    rules
}

// ═══════════════════════════════════════════════════════════════════════════════
// Admin
// ═══════════════════════════════════════════════════════════════════════════════

/// The platform admin wildcard.
pub fn admin_rules() -> Vec<Rule> {
    vec![Rule::manage_all()]
}
