//! Structured attribute conditions and their evaluator.
//!
//! Rules carry an optional `Predicate`: a closed expression tree matched
//! against a concrete resource instance. The grammar is deliberately small —
//! equality, negated equality, set membership, and implicit conjunction
//! across clauses — because that is all the rule tables need, but the
//! evaluator is a recursive interpreter over an AST so richer operators can
//! be added without touching the permission engine.
//!
//! Evaluation is fail-closed: a clause whose attribute path does not resolve
//! on the instance is a non-match, never an error. A typo in a rule table can
//! therefore only ever withhold access, not grant it.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::resource::Resource;

// ═══════════════════════════════════════════════════════════════════════════════
// Values
// ═══════════════════════════════════════════════════════════════════════════════

/// A scalar literal in a condition clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Str(String),
    Bool(bool),
    Int(i64),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{s}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<&crate::principal::UserId> for Value {
    fn from(id: &crate::principal::UserId) -> Self {
        Self::Str(id.as_str().to_string())
    }
}

impl From<&crate::principal::CommunityId> for Value {
    fn from(id: &crate::principal::CommunityId) -> Self {
        Self::Str(id.as_str().to_string())
    }
}

impl From<&crate::principal::DepositId> for Value {
    fn from(id: &crate::principal::DepositId) -> Self {
        Self::Str(id.as_str().to_string())
    }
}

/// What an attribute path resolves to on an instance.
///
/// Lists appear where the domain keeps collections on a resource (e.g. the
/// users who already reviewed a deposit, or a conversation's participants).
/// Equality against a list means containment, mirroring the document shapes
/// the rule tables were written for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Scalar(Value),
    List(Vec<Value>),
}

impl AttrValue {
    pub fn str(s: impl Into<String>) -> Self {
        Self::Scalar(Value::Str(s.into()))
    }

    pub fn bool(b: bool) -> Self {
        Self::Scalar(Value::Bool(b))
    }

    pub fn int(i: impl Into<i64>) -> Self {
        Self::Scalar(Value::Int(i.into()))
    }

    pub fn list<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Predicate AST
// ═══════════════════════════════════════════════════════════════════════════════

/// Comparison applied to one attribute path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Matcher {
    /// Attribute equals the literal; for list attributes, contains it.
    Eq(Value),
    /// Attribute differs from the literal; for list attributes, does not
    /// contain it.
    Ne(Value),
    /// Attribute is one of the literals; for list attributes, any element is.
    In(Vec<Value>),
}

impl Matcher {
    fn matches(&self, attr: &AttrValue) -> bool {
        match (self, attr) {
            (Self::Eq(expected), AttrValue::Scalar(actual)) => expected == actual,
            (Self::Eq(expected), AttrValue::List(items)) => items.contains(expected),
            (Self::Ne(expected), AttrValue::Scalar(actual)) => expected != actual,
            (Self::Ne(expected), AttrValue::List(items)) => !items.contains(expected),
            (Self::In(allowed), AttrValue::Scalar(actual)) => allowed.contains(actual),
            (Self::In(allowed), AttrValue::List(items)) => {
                items.iter().any(|item| allowed.contains(item))
            }
        }
    }
}

/// One `path → matcher` clause of a predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clause {
    /// Dotted attribute path, e.g. `"creator"` or `"deposit.creator"`.
    pub path: String,
    pub matcher: Matcher,
}

/// A conjunction of clauses evaluated against a resource instance.
///
/// Built declaratively by the rule tables:
///
/// ```rust,ignore
/// let own_draft = Predicate::new()
///     .eq("creator", &user.id)
///     .eq("status", DepositStatus::Draft);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Predicate {
    clauses: Vec<Clause>,
}

impl Predicate {
    /// An empty predicate. Matches everything until clauses are added.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `path == value`.
    pub fn eq(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push(Clause {
            path: path.into(),
            matcher: Matcher::Eq(value.into()),
        });
        self
    }

    /// Require `path != value`.
    pub fn ne(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push(Clause {
            path: path.into(),
            matcher: Matcher::Ne(value.into()),
        });
        self
    }

    /// Require `path` to be one of `values`.
    pub fn is_in<I, V>(mut self, path: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.clauses.push(Clause {
            path: path.into(),
            matcher: Matcher::In(values.into_iter().map(Into::into).collect()),
        });
        self
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Evaluate this predicate against a resource instance.
    ///
    /// All clauses must match (implicit conjunction). A clause whose path the
    /// instance does not resolve evaluates to false.
    pub fn matches(&self, instance: &dyn Resource) -> bool {
        self.clauses.iter().all(|clause| {
            match instance.attribute(&clause.path) {
                Some(attr) => clause.matcher.matches(&attr),
                None => {
                    debug!(
                        path = %clause.path,
                        kind = %instance.kind(),
                        "condition path did not resolve, treating as non-match"
                    );
                    false
                }
            }
        })
    }
}
