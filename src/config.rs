//! Configuration for the access engine.

use serde::Deserialize;
use std::time::Duration;

/// Access engine configuration.
///
/// Deserializable from the application's configuration tree; every field has
/// a default so an empty table is a valid configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessConfig {
    /// How long a composed ability stays valid in the cache.
    ///
    /// Kept short (seconds): it only needs to absorb the burst of permission
    /// checks inside one logical operation. It also bounds how long a stale
    /// ability can outlive a role-affecting write, since nothing actively
    /// invalidates the cache on such writes.
    #[serde(with = "humantime_serde", default = "default_ability_ttl")]
    pub ability_ttl: Duration,

    /// When `true`, only platform admins may create communities; the
    /// registered rule table omits its `create community` rule.
    #[serde(default)]
    pub restrict_community_creation: bool,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            ability_ttl: default_ability_ttl(),
            restrict_community_creation: false,
        }
    }
}

fn default_ability_ttl() -> Duration {
    Duration::from_secs(5)
}
