//! Principals and strongly-typed identifiers.
//!
//! A `Principal` is the already-authenticated actor a permission decision is
//! computed for. Verifying *who* the actor is happens upstream; this crate
//! only ever sees an identity or "no identity".

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

// ═══════════════════════════════════════════════════════════════════════════════
// Identifiers
// ═══════════════════════════════════════════════════════════════════════════════

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

string_id! {
    /// Strongly-typed user identifier.
    UserId
}

string_id! {
    /// Strongly-typed community identifier.
    CommunityId
}

string_id! {
    /// Strongly-typed deposit identifier.
    DepositId
}

// ═══════════════════════════════════════════════════════════════════════════════
// Principal
// ═══════════════════════════════════════════════════════════════════════════════

/// Platform role string that marks an identity as a platform admin.
pub const PLATFORM_ADMIN_ROLE: &str = "admin";

/// An authenticated identity, immutable per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Unique user id.
    pub id: UserId,
    /// Contact address, used to look up pending review invitations.
    pub email: String,
    /// Whether the user completed onboarding. Until then the identity only
    /// earns the incomplete-registered role on top of visitor.
    pub is_onboarded: bool,
    /// Platform-wide role flags (e.g. `"admin"`).
    pub platform_roles: HashSet<String>,
}

impl Identity {
    /// Create an onboarded identity with no platform roles.
    pub fn new(id: impl Into<UserId>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            is_onboarded: true,
            platform_roles: HashSet::new(),
        }
    }

    /// Mark the identity as not yet onboarded.
    pub fn not_onboarded(mut self) -> Self {
        self.is_onboarded = false;
        self
    }

    /// Grant a platform role flag.
    pub fn with_platform_role(mut self, role: impl Into<String>) -> Self {
        self.platform_roles.insert(role.into());
        self
    }

    /// Whether the identity carries the platform admin flag.
    pub fn is_platform_admin(&self) -> bool {
        self.platform_roles.contains(PLATFORM_ADMIN_ROLE)
    }
}

/// The actor a permission decision is computed for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Principal {
    /// No identity: an unauthenticated visitor.
    Anonymous,
    /// An authenticated identity.
    Identified(Identity),
}

impl Principal {
    /// The identity's user id, if any.
    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            Self::Anonymous => None,
            Self::Identified(identity) => Some(&identity.id),
        }
    }

    /// The identity, if any.
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Anonymous => None,
            Self::Identified(identity) => Some(identity),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }
}

impl From<Identity> for Principal {
    fn from(identity: Identity) -> Self {
        Self::Identified(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_roundtrip() {
        let id = UserId::new("u1");
        assert_eq!(id.as_str(), "u1");
        assert_eq!(id.to_string(), "u1");
        assert_eq!(UserId::from("u1"), id);
    }

    #[test]
    fn test_identity_builder() {
        let identity = Identity::new("u1", "u1@example.org")
            .with_platform_role(PLATFORM_ADMIN_ROLE);
        assert!(identity.is_onboarded);
        assert!(identity.is_platform_admin());

        let fresh = Identity::new("u2", "u2@example.org").not_onboarded();
        assert!(!fresh.is_onboarded);
        assert!(!fresh.is_platform_admin());
    }

    #[test]
    fn test_principal_accessors() {
        assert!(Principal::Anonymous.is_anonymous());
        assert!(Principal::Anonymous.user_id().is_none());

        let principal = Principal::from(Identity::new("u1", "u1@example.org"));
        assert_eq!(principal.user_id(), Some(&UserId::new("u1")));
        assert!(!principal.is_anonymous());
    }
}
