//! The permission engine: composes role rule sets into abilities and answers
//! point queries against them.
//!
//! The engine is the crate's public face. Callers materialize an `Ability`
//! for a principal, then ask boolean questions (`can`), enforce them
//! (`assert_can`), or enumerate the permitted subset of a kind's action
//! inventory (`allowed_actions`). Queries are side-effect-free; the only
//! shared state is the ability cache.

use metrics::counter;
use std::sync::Arc;
use tracing::{debug, instrument};

use super::cache::AbilityCache;
use super::roles::{Role, RoleResolver};
use super::rules::{
    admin_rules, incomplete_registered_rules, moderator_rules, owner_rules, registered_rules,
    visitor_rules, Rule,
};
use crate::config::AccessConfig;
use crate::error::{AccessError, Result};
use crate::principal::{Principal, UserId};
use crate::providers::{InvitationDirectory, MembershipProvider};
use crate::resource::{Action, Resource};

// ═══════════════════════════════════════════════════════════════════════════════
// Ability
// ═══════════════════════════════════════════════════════════════════════════════

/// The materialized, ordered rule list for one principal at one point in
/// time. Immutable once built; rebuilt on cache miss or expiry.
#[derive(Debug, Clone)]
pub struct Ability {
    rules: Vec<Rule>,
}

impl Ability {
    /// Wrap an already-composed rule list.
    pub fn from_rules(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// The composed rules, in composition order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Whether some rule grants `action` on the instance.
    ///
    /// Composition is a union of grants — the first matching rule decides,
    /// and there are no deny rules to override it.
    pub fn can<R: Resource>(&self, action: Action, instance: &R) -> bool {
        self.matching_rule(action, instance).is_some()
    }

    /// Negation of [`can`](Self::can), for call sites that read better with it.
    pub fn cannot<R: Resource>(&self, action: Action, instance: &R) -> bool {
        !self.can(action, instance)
    }

    /// The first rule granting `action` on the instance, if any. Useful for
    /// introspecting *why* something was allowed.
    pub fn matching_rule<R: Resource>(&self, action: Action, instance: &R) -> Option<&Rule> {
        self.rules
            .iter()
            .find(|rule| rule.matches(action, instance))
    }

    /// The gate: succeed if allowed, otherwise an `AccessError::Denied`
    /// carrying the attempted action and resource kind.
    pub fn assert_can<R: Resource>(&self, action: Action, instance: &R) -> Result<()> {
        if self.can(action, instance) {
            Ok(())
        } else {
            counter!("access_denials_total").increment(1);
            Err(AccessError::Denied {
                action,
                kind: instance.kind(),
            })
        }
    }

    /// The subset of the instance kind's action inventory this ability
    /// grants, preserving inventory order.
    pub fn allowed_actions<R: Resource>(&self, instance: &R) -> Vec<Action> {
        instance
            .kind()
            .actions()
            .iter()
            .copied()
            .filter(|&action| self.can(action, instance))
            .collect()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Permission Engine
// ═══════════════════════════════════════════════════════════════════════════════

/// Composes per-role rule sets into cached abilities and answers permission
/// queries. Cheap to clone; share one per process.
#[derive(Clone)]
pub struct PermissionEngine {
    resolver: RoleResolver,
    invitations: Arc<dyn InvitationDirectory>,
    cache: Arc<AbilityCache>,
    config: AccessConfig,
}

impl PermissionEngine {
    pub fn new(
        config: AccessConfig,
        membership: Arc<dyn MembershipProvider>,
        invitations: Arc<dyn InvitationDirectory>,
    ) -> Self {
        let cache = Arc::new(AbilityCache::new(config.ability_ttl));
        Self {
            resolver: RoleResolver::new(membership),
            invitations,
            cache,
            config,
        }
    }

    /// Materialize the ability for a principal.
    ///
    /// Identified principals are served from the cache within the TTL;
    /// anonymous principals are rebuilt every time (their ability is the
    /// static visitor table and there is no identity to key on).
    #[instrument(skip_all, fields(user_id = principal.user_id().map(UserId::as_str)))]
    pub async fn ability_for(&self, principal: &Principal) -> Result<Arc<Ability>> {
        if let Some(user_id) = principal.user_id() {
            if let Some(cached) = self.cache.get(user_id) {
                return Ok(cached);
            }
        }

        let ability = Arc::new(self.build(principal).await?);

        if let Some(user_id) = principal.user_id() {
            self.cache.insert(user_id.clone(), ability.clone());
        }
        Ok(ability)
    }

    /// Resolve roles and concatenate their rule tables.
    async fn build(&self, principal: &Principal) -> Result<Ability> {
        let roles = self.resolver.resolve(principal).await?;
        let mut rules = Vec::new();

        for role in roles {
            match role {
                Role::Visitor => rules.extend(visitor_rules()),
                Role::IncompleteRegistered => {
                    // Resolver only yields this role for identified principals.
                    if let Some(identity) = principal.identity() {
                        rules.extend(incomplete_registered_rules(identity));
                    }
                }
                Role::Registered => {
                    if let Some(identity) = principal.identity() {
                        let invited =
                            self.invitations.pending_invitations(&identity.email).await?;
                        rules.extend(registered_rules(identity, &invited, &self.config));
                    }
                }
                Role::Moderator(communities) => rules.extend(moderator_rules(&communities)),
                Role::Owner(communities) => rules.extend(owner_rules(&communities)),
                Role::Admin => rules.extend(admin_rules()),
            }
        }

        debug!(rules = rules.len(), "built ability");
        counter!("ability_builds_total").increment(1);
        Ok(Ability::from_rules(rules))
    }

    /// All actions from the instance kind's inventory the principal may
    /// perform on it, in inventory order. This is the list downstream
    /// consumers use to filter and annotate responses.
    pub async fn allowed_actions<R: Resource>(
        &self,
        principal: &Principal,
        instance: &R,
    ) -> Result<Vec<Action>> {
        let ability = self.ability_for(principal).await?;
        Ok(ability.allowed_actions(instance))
    }

    /// Drop a principal's cached ability, forcing the next query to rebuild.
    /// Intended for callers that just performed a role-affecting write.
    pub fn invalidate(&self, user: &UserId) -> bool {
        self.cache.invalidate(user)
    }

    /// Cache statistics snapshot.
    pub fn cache_stats(&self) -> super::cache::AbilityCacheStats {
        self.cache.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::principal::{Identity, PLATFORM_ADMIN_ROLE};
    use crate::providers::{FailingMembership, InMemoryInvitations, InMemoryMembership};
    use crate::resource::{
        Comment, Community, CommunityRef, CommunityStatus, Conversation, Deposit, DepositStatus,
        ResourceKind, Review, ReviewStatus, Session, UserProfile,
    };
    use std::time::Duration;

    struct Fixture {
        engine: PermissionEngine,
        membership: Arc<InMemoryMembership>,
        invitations: Arc<InMemoryInvitations>,
    }

    fn fixture() -> Fixture {
        fixture_with(AccessConfig::default())
    }

    fn fixture_with(config: AccessConfig) -> Fixture {
        let membership = Arc::new(InMemoryMembership::new());
        let invitations = Arc::new(InMemoryInvitations::new());
        let engine = PermissionEngine::new(config, membership.clone(), invitations.clone());
        Fixture {
            engine,
            membership,
            invitations,
        }
    }

    fn registered(id: &str) -> Principal {
        Principal::from(Identity::new(id, format!("{id}@example.org")))
    }

    fn deposit(id: &str, creator: &str, status: DepositStatus) -> Deposit {
        Deposit::new(id, creator, CommunityRef::new("c1"), status)
    }

    #[tokio::test]
    async fn test_anonymous_deposit_read_matrix() {
        let fixture = fixture();
        let ability = fixture
            .engine
            .ability_for(&Principal::Anonymous)
            .await
            .unwrap();

        assert!(ability.can(Action::Read, &deposit("d1", "alice", DepositStatus::Preprint)));
        assert!(ability.can(Action::Read, &deposit("d1", "alice", DepositStatus::Published)));
        assert!(ability.cannot(Action::Read, &deposit("d1", "alice", DepositStatus::Draft)));
        assert!(ability.cannot(
            Action::Read,
            &deposit("d1", "alice", DepositStatus::PendingApproval)
        ));
    }

    #[tokio::test]
    async fn test_admin_wildcard() {
        let fixture = fixture();
        let admin = Principal::from(
            Identity::new("root", "root@example.org").with_platform_role(PLATFORM_ADMIN_ROLE),
        );
        let ability = fixture.engine.ability_for(&admin).await.unwrap();

        assert!(ability.can(Action::Delete, &deposit("d1", "alice", DepositStatus::Draft)));
        assert!(ability.can(Action::Moderate, &Community::new("c1", "alice", CommunityStatus::Draft)));
        assert!(ability.can(Action::Read, &Conversation::new("t1", ["alice", "bob"])));
        assert!(ability.can(Action::Delete, &Session::new("s1", "c9")));
    }

    #[tokio::test]
    async fn test_author_draft_lifecycle() {
        let fixture = fixture();
        let alice = registered("alice");
        let ability = fixture.engine.ability_for(&alice).await.unwrap();

        let draft = deposit("d1", "alice", DepositStatus::Draft);
        assert!(ability.can(Action::Update, &draft));
        assert!(ability.can(Action::Delete, &draft));
        assert!(ability.cannot(Action::CreateVersion, &draft));

        let preprint = deposit("d1", "alice", DepositStatus::Preprint);
        assert!(ability.cannot(Action::Update, &preprint));
        assert!(ability.can(Action::CreateVersion, &preprint));
    }

    #[tokio::test]
    async fn test_moderator_lifecycle() {
        let fixture = fixture();
        fixture.membership.add_moderator("mia", "c1");
        let mia = registered("mia");
        let ability = fixture.engine.ability_for(&mia).await.unwrap();

        let draft = deposit("d1", "alice", DepositStatus::Draft);
        assert!(ability.can(Action::Read, &draft));
        assert!(ability.cannot(Action::Update, &draft));

        let pending = deposit("d1", "alice", DepositStatus::PendingApproval);
        assert!(ability.can(Action::Update, &pending));
        assert!(ability.can(Action::Moderate, &pending));
        assert!(ability.can(Action::Edit, &pending));
    }

    #[tokio::test]
    async fn test_review_visibility_matrix() {
        let fixture = fixture();
        fixture.membership.add_moderator("mia", "c1");

        let review = Review::new("r1", "rex", "c1", ReviewStatus::Published)
            .visible_to_author()
            .on_deposit(crate::resource::DepositRef::new("d1", "alice"));

        // The deposit's author may read it.
        let author = fixture.engine.ability_for(&registered("alice")).await.unwrap();
        assert!(author.can(Action::Read, &review));

        // An unrelated registered user may not.
        let stranger = fixture.engine.ability_for(&registered("bob")).await.unwrap();
        assert!(stranger.cannot(Action::Read, &review));

        // A moderator of the review's community always may.
        let moderator = fixture.engine.ability_for(&registered("mia")).await.unwrap();
        assert!(moderator.can(Action::Read, &review));
    }

    #[tokio::test]
    async fn test_invited_reviewer() {
        let fixture = fixture();
        fixture.invitations.invite("rex@example.org", "d7");
        let ability = fixture.engine.ability_for(&registered("rex")).await.unwrap();

        let invited = Deposit::new(
            "d7",
            "alice",
            CommunityRef::new("c1").private_reviews(),
            DepositStatus::Preprint,
        );
        assert!(ability.can(Action::Review, &invited));
        assert!(ability.can(Action::Read, &invited));

        let other = Deposit::new(
            "d8",
            "alice",
            CommunityRef::new("c1").private_reviews(),
            DepositStatus::Preprint,
        );
        assert!(ability.cannot(Action::Review, &other));
    }

    #[tokio::test]
    async fn test_allowed_actions_is_inventory_filter_in_order() {
        let fixture = fixture();
        let alice = registered("alice");
        let draft = deposit("d1", "alice", DepositStatus::Draft);

        let actions = fixture
            .engine
            .allowed_actions(&alice, &draft)
            .await
            .unwrap();
        assert_eq!(
            actions,
            vec![
                Action::Read,
                Action::Create,
                Action::Update,
                Action::UpdateCommunity,
                Action::Delete,
                Action::Edit,
            ]
        );

        // Exactly the inventory subset `can` grants, in inventory order.
        let ability = fixture.engine.ability_for(&alice).await.unwrap();
        let expected: Vec<Action> = ResourceKind::Deposit
            .actions()
            .iter()
            .copied()
            .filter(|&action| ability.can(action, &draft))
            .collect();
        assert_eq!(actions, expected);
    }

    #[tokio::test]
    async fn test_allowed_actions_for_admin_is_full_inventory() {
        let fixture = fixture();
        let admin = Principal::from(
            Identity::new("root", "root@example.org").with_platform_role(PLATFORM_ADMIN_ROLE),
        );
        let profile = UserProfile::new("alice");
        let actions = fixture
            .engine
            .allowed_actions(&admin, &profile)
            .await
            .unwrap();
        assert_eq!(actions, ResourceKind::User.actions().to_vec());
    }

    #[tokio::test]
    async fn test_gate_denies_with_context() {
        let fixture = fixture();
        let ability = fixture
            .engine
            .ability_for(&Principal::Anonymous)
            .await
            .unwrap();

        let draft = deposit("d1", "alice", DepositStatus::Draft);
        assert!(ability.assert_can(Action::Read, &deposit("d2", "alice", DepositStatus::Published)).is_ok());

        let err = ability.assert_can(Action::Update, &draft).unwrap_err();
        match err {
            AccessError::Denied { action, kind } => {
                assert_eq!(action, Action::Update);
                assert_eq!(kind, ResourceKind::Deposit);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_ability_cached_within_ttl() {
        let fixture = fixture();
        let alice = registered("alice");

        let first = fixture.engine.ability_for(&alice).await.unwrap();
        let second = fixture.engine.ability_for(&alice).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let stats = fixture.engine.cache_stats();
        assert_eq!(stats.hits, 1);
    }

    #[tokio::test]
    async fn test_cached_ability_is_stale_until_invalidated() {
        let fixture = fixture();
        let alice = registered("alice");
        let pending = deposit("d1", "bob", DepositStatus::PendingApproval);

        let before = fixture.engine.ability_for(&alice).await.unwrap();
        assert!(before.cannot(Action::Moderate, &pending));

        // Promotion does not touch the cache; the old ability is served.
        fixture.membership.add_moderator("alice", "c1");
        let stale = fixture.engine.ability_for(&alice).await.unwrap();
        assert!(stale.cannot(Action::Moderate, &pending));

        assert!(fixture.engine.invalidate(&UserId::new("alice")));
        let fresh = fixture.engine.ability_for(&alice).await.unwrap();
        assert!(fresh.can(Action::Moderate, &pending));
    }

    #[tokio::test]
    async fn test_anonymous_is_never_cached() {
        let fixture = fixture();
        fixture
            .engine
            .ability_for(&Principal::Anonymous)
            .await
            .unwrap();
        fixture
            .engine
            .ability_for(&Principal::Anonymous)
            .await
            .unwrap();
        let stats = fixture.engine.cache_stats();
        assert_eq!(stats.entries, 0);
        assert_eq!(stats.hits, 0);
    }

    #[tokio::test]
    async fn test_expired_ability_is_rebuilt() {
        let fixture = fixture_with(AccessConfig {
            ability_ttl: Duration::from_millis(10),
            ..AccessConfig::default()
        });
        let alice = registered("alice");
        let pending = deposit("d1", "bob", DepositStatus::PendingApproval);

        let before = fixture.engine.ability_for(&alice).await.unwrap();
        assert!(before.cannot(Action::Moderate, &pending));

        fixture.membership.add_moderator("alice", "c1");
        tokio::time::sleep(Duration::from_millis(25)).await;

        let after = fixture.engine.ability_for(&alice).await.unwrap();
        assert!(after.can(Action::Moderate, &pending));
    }

    #[tokio::test]
    async fn test_collaborator_failure_propagates() {
        let invitations = Arc::new(InMemoryInvitations::new());
        let engine = PermissionEngine::new(
            AccessConfig::default(),
            Arc::new(FailingMembership),
            invitations,
        );

        let err = engine.ability_for(&registered("alice")).await.unwrap_err();
        assert!(matches!(err, AccessError::Collaborator(_)));

        // Anonymous needs no collaborators and still works.
        assert!(engine.ability_for(&Principal::Anonymous).await.is_ok());
    }

    #[tokio::test]
    async fn test_matching_rule_reports_grant() {
        let fixture = fixture();
        let ability = fixture
            .engine
            .ability_for(&Principal::Anonymous)
            .await
            .unwrap();
        let rule = ability
            .matching_rule(Action::Read, &Comment::new("m1", "alice", "c1"))
            .unwrap();
        assert!(rule.applies_to(Action::Read, ResourceKind::Comment));
        assert!(rule.condition.is_none());
    }
}
