//! Ability composition: roles, rule tables, cache, and the engine.
//!
//! This module provides:
//! - **Roles**: derivation of a principal's roles (`RoleResolver`)
//! - **Rule tables**: the per-role permission tables (`rules`)
//! - **Cache**: TTL-bounded per-principal ability storage (`AbilityCache`)
//! - **Engine**: `PermissionEngine`, the public query/enforcement surface

pub mod cache;
pub mod engine;
pub mod roles;
pub mod rules;

pub use cache::{AbilityCache, AbilityCacheStats};
pub use engine::{Ability, PermissionEngine};
pub use roles::{Role, RoleResolver};
pub use rules::{ActionFilter, KindFilter, Rule};
