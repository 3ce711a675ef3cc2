use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::identity::Role;

/// A persisted account. One record type covers all three roles; the role
/// discriminant is fixed at creation and never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub display_name: String,
    pub registered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Course {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub subject: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Owning teacher; stamped server-side at creation, immutable after.
    pub teacher_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
pub struct Enrollment {
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub enrolled_at: DateTime<Utc>,
}

/// Server-held proof of a prior successful login. The token is opaque to
/// clients; destroying the record invalidates the session.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
