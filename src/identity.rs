//! Polymorphic user identity with a closed role vocabulary.
//!
//! Every routing or authorization decision goes through the capability
//! predicates below (or `Role` equality on the enum), never through raw
//! role strings, so adding a role cannot silently satisfy an unrelated
//! check.

use serde::{Deserialize, Serialize};

use crate::store::models::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "teacher" => Ok(Role::Teacher),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("{:?} is not a valid role", s)),
        }
    }
}

/// The identity acting on a request: either a persisted user loaded from a
/// valid session, or anonymous when no session resolved.
#[derive(Debug, Clone)]
pub enum Identity {
    Anonymous,
    Known(User),
}

impl Identity {
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Identity::Anonymous)
    }

    pub fn is_student(&self) -> bool {
        matches!(self, Identity::Known(u) if u.role == Role::Student)
    }

    pub fn is_teacher(&self) -> bool {
        matches!(self, Identity::Known(u) if u.role == Role::Teacher)
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Identity::Known(u) if u.role == Role::Admin)
    }

    /// The underlying user, if any.
    pub fn user(&self) -> Option<&User> {
        match self {
            Identity::Anonymous => None,
            Identity::Known(user) => Some(user),
        }
    }
}
