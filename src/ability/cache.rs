//! Per-principal ability cache.
//!
//! Abilities are cheap to query but not free to build (two collaborator
//! lookups plus table construction), and a single logical operation often
//! performs several permission checks in a burst. The cache holds the
//! composed ability per user id for a short TTL.
//!
//! Storage is a `DashMap` keyed by user id: concurrent requests for
//! different principals never contend, and concurrent builders for the same
//! principal resolve by last-write-wins on that one slot. Nothing actively
//! invalidates entries on role-affecting writes; the TTL bounds how long a
//! stale ability can be served, and `invalidate` exists for callers that
//! want to tighten that bound.

use dashmap::DashMap;
use metrics::counter;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use super::engine::Ability;
use crate::principal::UserId;

/// Cache hit/miss snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AbilityCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

struct Slot {
    ability: Arc<Ability>,
    expires_at: Instant,
}

/// TTL-bounded store of composed abilities, keyed by user id.
pub struct AbilityCache {
    slots: DashMap<UserId, Slot>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl AbilityCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            slots: DashMap::new(),
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Get the cached ability for a user, if present and unexpired.
    ///
    /// Expired entries are removed on the way out.
    pub fn get(&self, user: &UserId) -> Option<Arc<Ability>> {
        let ability = match self.slots.get(user) {
            Some(slot) if slot.expires_at > Instant::now() => Some(slot.ability.clone()),
            Some(_) => None,
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                counter!("ability_cache_misses_total", "reason" => "not_found").increment(1);
                return None;
            }
        };

        match ability {
            Some(ability) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                counter!("ability_cache_hits_total").increment(1);
                Some(ability)
            }
            None => {
                self.slots.remove(user);
                self.misses.fetch_add(1, Ordering::Relaxed);
                counter!("ability_cache_misses_total", "reason" => "expired").increment(1);
                debug!(user_id = %user, "ability cache entry expired");
                None
            }
        }
    }

    /// Store an ability for a user. Overwrites any existing slot.
    pub fn insert(&self, user: UserId, ability: Arc<Ability>) {
        let slot = Slot {
            ability,
            expires_at: Instant::now() + self.ttl,
        };
        self.slots.insert(user, slot);
        counter!("ability_cache_inserts_total").increment(1);
    }

    /// Drop a user's cached ability. Returns whether a slot existed.
    pub fn invalidate(&self, user: &UserId) -> bool {
        self.slots.remove(user).is_some()
    }

    /// Drop every cached ability.
    pub fn clear(&self) {
        self.slots.clear();
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn stats(&self) -> AbilityCacheStats {
        AbilityCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.slots.len(),
        }
    }
}
