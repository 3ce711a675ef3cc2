//! Persistence boundary. The rest of the crate only sees the
//! [`CredentialStore`] trait; policy (ownership checks, role gating,
//! cascade decisions) lives above it.

pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use models::{Course, Enrollment, Session, User};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error("{0}")]
    Internal(String),
}

/// Data access for users, courses, enrollments, and sessions.
///
/// Implementations enforce storage-level invariants only: unique email
/// across all roles, unique (student, course) enrollment, and the
/// teacher_id index for ownership-scoped listing.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn health_check(&self) -> Result<(), StoreError>;

    // Users
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    /// Fails with `Conflict` when the email is already registered, in any role.
    async fn insert_user(&self, user: User) -> Result<User, StoreError>;
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;
    /// Removes the user record only; cascades are decided by the caller.
    async fn delete_user(&self, id: Uuid) -> Result<(), StoreError>;
    async fn count_users(&self) -> Result<i64, StoreError>;

    // Courses
    async fn find_courses_by_teacher(&self, teacher_id: Uuid) -> Result<Vec<Course>, StoreError>;
    async fn find_course_by_id(&self, id: Uuid) -> Result<Option<Course>, StoreError>;
    async fn list_courses(&self) -> Result<Vec<Course>, StoreError>;
    async fn insert_course(&self, course: Course) -> Result<Course, StoreError>;
    async fn update_course(&self, course: Course) -> Result<Course, StoreError>;

    // Enrollments
    /// Fails with `Conflict` when the student is already enrolled.
    async fn insert_enrollment(&self, enrollment: Enrollment) -> Result<Enrollment, StoreError>;
    async fn find_enrolled_courses(&self, student_id: Uuid) -> Result<Vec<Course>, StoreError>;
    async fn delete_enrollments_for_user(&self, user_id: Uuid) -> Result<(), StoreError>;

    // Sessions
    async fn insert_session(&self, session: Session) -> Result<(), StoreError>;
    async fn find_session(&self, token: &str) -> Result<Option<Session>, StoreError>;
    /// Idempotent: deleting an absent session is not an error.
    async fn delete_session(&self, token: &str) -> Result<(), StoreError>;
    async fn delete_sessions_for_user(&self, user_id: Uuid) -> Result<(), StoreError>;
}
