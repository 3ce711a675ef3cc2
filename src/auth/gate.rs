//! The authorization gate: a pure check of (identity, declared requirement)
//! evaluated before any role-specific handler touches the store.
//!
//! Denials distinguish the anonymous caller (`Unauthenticated`, prompt to
//! log in) from the wrong-role caller (`Forbidden`, permission denied).

use crate::config;
use crate::identity::{Identity, Role};
use crate::store::models::User;

use super::AuthError;

/// What a protected route demands, declared at the point of routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleRequirement {
    /// Any logged-in user, role irrelevant.
    Authenticated,
    /// A specific role.
    Role(Role),
}

pub fn require_role(
    identity: &Identity,
    requirement: RoleRequirement,
) -> Result<&User, AuthError> {
    let user = match identity.user() {
        Some(user) => user,
        None => return Err(AuthError::Unauthenticated),
    };

    match requirement {
        RoleRequirement::Authenticated => Ok(user),
        RoleRequirement::Role(role) if user.role == role => Ok(user),
        RoleRequirement::Role(role) => {
            if config::config().security.enable_audit_logging {
                tracing::warn!(
                    email = %user.email,
                    required = %role,
                    actual = %user.role,
                    "request forbidden"
                );
            }
            Err(AuthError::Forbidden)
        }
    }
}

pub fn require_authenticated(identity: &Identity) -> Result<&User, AuthError> {
    require_role(identity, RoleRequirement::Authenticated)
}

pub fn require_student(identity: &Identity) -> Result<&User, AuthError> {
    require_role(identity, RoleRequirement::Role(Role::Student))
}

pub fn require_teacher(identity: &Identity) -> Result<&User, AuthError> {
    require_role(identity, RoleRequirement::Role(Role::Teacher))
}

pub fn require_admin(identity: &Identity) -> Result<&User, AuthError> {
    require_role(identity, RoleRequirement::Role(Role::Admin))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn identity_with(role: Role) -> Identity {
        Identity::Known(User {
            id: Uuid::new_v4(),
            email: format!("{}@example.com", role),
            password_hash: String::new(),
            role,
            display_name: role.to_string(),
            registered_at: Utc::now(),
        })
    }

    #[test]
    fn anonymous_is_unauthenticated_for_every_requirement() {
        let anonymous = Identity::Anonymous;
        let requirements = [
            RoleRequirement::Authenticated,
            RoleRequirement::Role(Role::Student),
            RoleRequirement::Role(Role::Teacher),
            RoleRequirement::Role(Role::Admin),
        ];
        for requirement in requirements {
            let err = require_role(&anonymous, requirement).unwrap_err();
            assert!(matches!(err, AuthError::Unauthenticated), "{:?}", requirement);
        }
    }

    #[test]
    fn wrong_role_is_forbidden_not_unauthenticated() {
        let student = identity_with(Role::Student);
        let err = require_teacher(&student).unwrap_err();
        assert!(matches!(err, AuthError::Forbidden));

        let err = require_admin(&student).unwrap_err();
        assert!(matches!(err, AuthError::Forbidden));
    }

    #[test]
    fn matching_role_passes() {
        assert!(require_student(&identity_with(Role::Student)).is_ok());
        assert!(require_teacher(&identity_with(Role::Teacher)).is_ok());
        assert!(require_admin(&identity_with(Role::Admin)).is_ok());
    }

    #[test]
    fn authenticated_accepts_any_role() {
        for role in [Role::Student, Role::Teacher, Role::Admin] {
            assert!(require_authenticated(&identity_with(role)).is_ok());
        }
        assert!(require_authenticated(&Identity::Anonymous).is_err());
    }

    #[test]
    fn admin_role_does_not_leak_into_teacher_routes() {
        // role checks are exact; there is no implicit privilege ladder
        let admin = identity_with(Role::Admin);
        assert!(matches!(
            require_teacher(&admin).unwrap_err(),
            AuthError::Forbidden
        ));
    }
}
