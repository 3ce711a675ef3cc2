//! Session-based authentication: credential verification at login, opaque
//! session tokens, and current-user resolution for incoming requests.

pub mod gate;

use std::collections::HashMap;

use chrono::{Duration, Utc};
use once_cell::sync::Lazy;
use uuid::Uuid;

use crate::config;
use crate::identity::{Identity, Role};
use crate::password::{hash_password, verify_password, PasswordError};
use crate::store::models::{Session, User};
use crate::store::{CredentialStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Unknown email and wrong password collapse into this one variant so
    /// callers cannot probe which accounts exist.
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("authentication required")]
    Unauthenticated,
    #[error("insufficient privileges")]
    Forbidden,
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("invalid account details")]
    Validation(HashMap<String, String>),
    #[error(transparent)]
    Hash(#[from] PasswordError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A successful login: the freshly issued session token and the resolved user.
#[derive(Debug)]
pub struct LoginOutcome {
    pub token: String,
    pub user: User,
}

// Verified against when the email lookup misses, so a miss costs roughly
// the same as a wrong password.
static DUMMY_HASH: Lazy<String> =
    Lazy::new(|| hash_password("decoy-password").unwrap_or_default());

const MIN_PASSWORD_LENGTH: usize = 8;

/// Validate credentials and establish a new session.
///
/// Every login issues a fresh token; prior sessions stay valid until they
/// expire or are logged out, but a token is never reused.
pub async fn login(
    store: &dyn CredentialStore,
    email: &str,
    password: &str,
) -> Result<LoginOutcome, AuthError> {
    let email = normalize_email(email);

    let user = match store.find_user_by_email(&email).await? {
        Some(user) => user,
        None => {
            let _ = verify_password(password, &DUMMY_HASH);
            tracing::warn!(email = %email, "login failed");
            return Err(AuthError::InvalidCredentials);
        }
    };

    if !verify_password(password, &user.password_hash) {
        tracing::warn!(email = %email, "login failed");
        return Err(AuthError::InvalidCredentials);
    }

    let token = issue_session(store, user.id).await?;
    tracing::info!(email = %user.email, role = %user.role, "login succeeded");

    Ok(LoginOutcome { token, user })
}

/// Destroy the session behind `token`. Logging out twice is not an error.
pub async fn logout(store: &dyn CredentialStore, token: &str) -> Result<(), AuthError> {
    store.delete_session(token).await?;
    tracing::debug!("session destroyed");
    Ok(())
}

/// Resolve the identity acting on a request from its session token.
///
/// A missing, unknown, or expired token resolves to the anonymous identity,
/// as does a session whose user has since been deleted. Expired sessions
/// are removed on sight.
pub async fn resolve_current_user(
    store: &dyn CredentialStore,
    token: Option<&str>,
) -> Result<Identity, AuthError> {
    let token = match token {
        Some(t) => t,
        None => return Ok(Identity::Anonymous),
    };

    let session = match store.find_session(token).await? {
        Some(s) => s,
        None => return Ok(Identity::Anonymous),
    };

    if session.is_expired(Utc::now()) {
        store.delete_session(token).await?;
        tracing::debug!(user_id = %session.user_id, "expired session discarded");
        return Ok(Identity::Anonymous);
    }

    match store.find_user_by_id(session.user_id).await? {
        Some(user) => Ok(Identity::Known(user)),
        None => Ok(Identity::Anonymous),
    }
}

async fn issue_session(store: &dyn CredentialStore, user_id: Uuid) -> Result<String, AuthError> {
    let now = Utc::now();
    let expiry_hours = config::config().security.session_expiry_hours;

    let session = Session {
        token: Uuid::new_v4().simple().to_string(),
        user_id,
        created_at: now,
        expires_at: now + Duration::hours(expiry_hours as i64),
    };
    let token = session.token.clone();
    store.insert_session(session).await?;
    Ok(token)
}

/// Create an account with a fixed role. Used by admin handlers and the
/// startup seed; there is no self-registration surface.
pub async fn create_user(
    store: &dyn CredentialStore,
    email: &str,
    password: &str,
    role: Role,
    display_name: &str,
) -> Result<User, AccountError> {
    let email = normalize_email(email);
    validate_account_fields(&email, password)?;

    let user = User {
        id: Uuid::new_v4(),
        email,
        password_hash: hash_password(password)?,
        role,
        display_name: display_name.trim().to_string(),
        registered_at: Utc::now(),
    };

    let user = store.insert_user(user).await?;
    tracing::info!(email = %user.email, role = %user.role, "account created");
    Ok(user)
}

/// Delete an account and its dependent state.
///
/// Sessions and enrollments are destroyed with the account. Courses owned
/// by a deleted teacher are kept but frozen: with the owner gone no
/// identity can pass the ownership check, so they can no longer be edited.
pub async fn delete_user(store: &dyn CredentialStore, user_id: Uuid) -> Result<(), AccountError> {
    store.delete_user(user_id).await?;
    store.delete_sessions_for_user(user_id).await?;
    store.delete_enrollments_for_user(user_id).await?;
    tracing::info!(%user_id, "account deleted");
    Ok(())
}

/// Seed an admin account into an empty store so a fresh deployment can be
/// logged into at all.
pub async fn ensure_default_admin(store: &dyn CredentialStore) -> Result<(), AccountError> {
    if store.count_users().await? > 0 {
        return Ok(());
    }

    let email = config::config().security.bootstrap_admin_email.clone();
    let password =
        std::env::var("CAMPUS_ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string());

    create_user(store, &email, &password, Role::Admin, "Administrator").await?;
    tracing::warn!(email = %email, "seeded default admin account; change its password");
    Ok(())
}

fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

fn validate_account_fields(email: &str, password: &str) -> Result<(), AccountError> {
    let mut field_errors = HashMap::new();

    if email.is_empty() {
        field_errors.insert("email".to_string(), "email cannot be empty".to_string());
    } else {
        let parts: Vec<&str> = email.split('@').collect();
        if parts.len() != 2 || parts[0].is_empty() || !parts[1].contains('.') {
            field_errors.insert("email".to_string(), "invalid email format".to_string());
        }
    }

    if password.len() < MIN_PASSWORD_LENGTH {
        field_errors.insert(
            "password".to_string(),
            format!("password must be at least {} characters", MIN_PASSWORD_LENGTH),
        );
    }

    if field_errors.is_empty() {
        Ok(())
    } else {
        Err(AccountError::Validation(field_errors))
    }
}
