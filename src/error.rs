//! Error handling for the access engine.
//!
//! Two failures can leave this crate: an authorization denial raised by the
//! gate (`assert_can`), and a collaborator lookup failure during ability
//! construction. Both carry stable machine-readable codes so API layers can
//! map them without string matching. Malformed or unresolvable predicate
//! paths are *not* errors: the evaluator treats them as a non-match and logs
//! them, so a typo in a rule table can never grant access.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::providers::CollaboratorError;
use crate::resource::{Action, ResourceKind};

/// A specialized Result type for access decisions.
pub type Result<T> = std::result::Result<T, AccessError>;

/// Machine-readable error codes, stable across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    AccessDenied,
    CollaboratorUnavailable,
}

impl ErrorCode {
    /// Canonical string form, as exposed in API error payloads.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AccessDenied => "ACCESS_DENIED",
            Self::CollaboratorUnavailable => "COLLABORATOR_UNAVAILABLE",
        }
    }
}

/// Errors produced by the access engine.
#[derive(Debug, Error)]
pub enum AccessError {
    /// The gate rejected the request. Never retried; surfaced to the caller
    /// as an access-denied response.
    #[error("not allowed to {action} this {kind}")]
    Denied {
        action: Action,
        kind: ResourceKind,
    },

    /// A membership or invitation lookup failed while building an ability.
    /// Propagated rather than swallowed: treating it as "no roles" would
    /// silently under-grant, and treating it as "all roles" would over-grant.
    #[error("collaborator unavailable: {0}")]
    Collaborator(#[from] CollaboratorError),
}

impl AccessError {
    /// Get the stable error code for this error.
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Denied { .. } => ErrorCode::AccessDenied,
            Self::Collaborator(_) => ErrorCode::CollaboratorUnavailable,
        }
    }
}
