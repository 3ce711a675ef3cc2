//! Postgres-backed credential store.
//!
//! Expected schema: `users` keyed by id with a unique email index,
//! `courses` keyed by id with an index on teacher_id, `enrollments` with a
//! unique (student_id, course_id) pair, and `sessions` keyed by token.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use uuid::Uuid;

use crate::config;
use crate::identity::Role;

use super::models::{Course, Enrollment, Session, User};
use super::{CredentialStore, StoreError};

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let db_config = &config::config().database;

        let pool = PgPoolOptions::new()
            .max_connections(db_config.max_connections)
            .acquire_timeout(Duration::from_secs(db_config.connection_timeout))
            .connect(url)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(Self::new(pool))
    }
}

fn user_from_row(row: &PgRow) -> Result<User, StoreError> {
    let role_str: String = row.try_get("role")?;
    let role = Role::from_str(&role_str)
        .map_err(|e| StoreError::Internal(format!("corrupt role column: {}", e)))?;

    Ok(User {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        role,
        display_name: row.try_get("display_name")?,
        registered_at: row.try_get("registered_at")?,
    })
}

fn course_from_row(row: &PgRow) -> Result<Course, StoreError> {
    Ok(Course {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        subject: row.try_get("subject")?,
        start_date: row.try_get("start_date")?,
        end_date: row.try_get("end_date")?,
        teacher_id: row.try_get("teacher_id")?,
    })
}

fn map_unique_violation(err: sqlx::Error, conflict_message: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            StoreError::Conflict(conflict_message.to_string())
        }
        _ => StoreError::Sqlx(err),
    }
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            "SELECT id, email, password_hash, role, display_name, registered_at \
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            "SELECT id, email, password_hash, role, display_name, registered_at \
             FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn insert_user(&self, user: User) -> Result<User, StoreError> {
        sqlx::query(
            "INSERT INTO users (id, email, password_hash, role, display_name, registered_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(&user.display_name)
        .bind(user.registered_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "email is already registered"))?;

        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, email, password_hash, role, display_name, registered_at \
             FROM users ORDER BY email",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(user_from_row).collect()
    }

    async fn delete_user(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("user {} not found", id)));
        }
        Ok(())
    }

    async fn count_users(&self) -> Result<i64, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("n")?)
    }

    async fn find_courses_by_teacher(&self, teacher_id: Uuid) -> Result<Vec<Course>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, name, description, subject, start_date, end_date, teacher_id \
             FROM courses WHERE teacher_id = $1 ORDER BY name",
        )
        .bind(teacher_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(course_from_row).collect()
    }

    async fn find_course_by_id(&self, id: Uuid) -> Result<Option<Course>, StoreError> {
        let row = sqlx::query(
            "SELECT id, name, description, subject, start_date, end_date, teacher_id \
             FROM courses WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(course_from_row).transpose()
    }

    async fn list_courses(&self) -> Result<Vec<Course>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, name, description, subject, start_date, end_date, teacher_id \
             FROM courses ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(course_from_row).collect()
    }

    async fn insert_course(&self, course: Course) -> Result<Course, StoreError> {
        sqlx::query(
            "INSERT INTO courses (id, name, description, subject, start_date, end_date, teacher_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(course.id)
        .bind(&course.name)
        .bind(&course.description)
        .bind(&course.subject)
        .bind(course.start_date)
        .bind(course.end_date)
        .bind(course.teacher_id)
        .execute(&self.pool)
        .await?;

        Ok(course)
    }

    async fn update_course(&self, course: Course) -> Result<Course, StoreError> {
        let result = sqlx::query(
            "UPDATE courses SET name = $2, description = $3, subject = $4, \
             start_date = $5, end_date = $6 WHERE id = $1",
        )
        .bind(course.id)
        .bind(&course.name)
        .bind(&course.description)
        .bind(&course.subject)
        .bind(course.start_date)
        .bind(course.end_date)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!(
                "course {} not found",
                course.id
            )));
        }
        Ok(course)
    }

    async fn insert_enrollment(&self, enrollment: Enrollment) -> Result<Enrollment, StoreError> {
        sqlx::query(
            "INSERT INTO enrollments (student_id, course_id, enrolled_at) VALUES ($1, $2, $3)",
        )
        .bind(enrollment.student_id)
        .bind(enrollment.course_id)
        .bind(enrollment.enrolled_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "student is already enrolled in this course"))?;

        Ok(enrollment)
    }

    async fn find_enrolled_courses(&self, student_id: Uuid) -> Result<Vec<Course>, StoreError> {
        let rows = sqlx::query(
            "SELECT c.id, c.name, c.description, c.subject, c.start_date, c.end_date, c.teacher_id \
             FROM courses c JOIN enrollments e ON e.course_id = c.id \
             WHERE e.student_id = $1 ORDER BY c.name",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(course_from_row).collect()
    }

    async fn delete_enrollments_for_user(&self, user_id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM enrollments WHERE student_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert_session(&self, session: Session) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO sessions (token, user_id, created_at, expires_at) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(&session.token)
        .bind(session.user_id)
        .bind(session.created_at)
        .bind(session.expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_session(&self, token: &str) -> Result<Option<Session>, StoreError> {
        let row = sqlx::query(
            "SELECT token, user_id, created_at, expires_at FROM sessions WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(match row {
            Some(row) => Some(Session {
                token: row.try_get("token")?,
                user_id: row.try_get("user_id")?,
                created_at: row.try_get("created_at")?,
                expires_at: row.try_get("expires_at")?,
            }),
            None => None,
        })
    }

    async fn delete_session(&self, token: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_sessions_for_user(&self, user_id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
