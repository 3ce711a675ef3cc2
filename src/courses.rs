//! Course ownership logic. Every course read and write in the crate routes
//! through this module, so a new handler cannot skip the ownership check.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::store::models::{Course, Enrollment};
use crate::store::{CredentialStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum CourseError {
    #[error("course not found")]
    NotFound,
    /// The course exists but belongs to another teacher. Surfaced to
    /// clients exactly like `NotFound`; kept distinct for audit logging.
    #[error("course belongs to another teacher")]
    NotOwned,
    #[error("already enrolled")]
    AlreadyEnrolled,
    #[error("invalid course fields")]
    Validation(HashMap<String, String>),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Client-supplied course fields. Deliberately has no `teacher_id`: the
/// owner is always stamped server-side from the authenticated identity.
#[derive(Debug, Clone, Deserialize)]
pub struct CourseDraft {
    pub name: String,
    pub description: String,
    pub subject: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl CourseDraft {
    fn validate(&self) -> Result<(), CourseError> {
        let mut field_errors = HashMap::new();

        if self.name.trim().is_empty() {
            field_errors.insert("name".to_string(), "name cannot be empty".to_string());
        }
        if self.subject.trim().is_empty() {
            field_errors.insert("subject".to_string(), "subject cannot be empty".to_string());
        }
        if self.end_date < self.start_date {
            field_errors.insert(
                "end_date".to_string(),
                "end date cannot precede start date".to_string(),
            );
        }

        if field_errors.is_empty() {
            Ok(())
        } else {
            Err(CourseError::Validation(field_errors))
        }
    }
}

/// Courses owned by `teacher_id`. Owning none is an empty list, not an error.
pub async fn list_owned_courses(
    store: &dyn CredentialStore,
    teacher_id: Uuid,
) -> Result<Vec<Course>, CourseError> {
    Ok(store.find_courses_by_teacher(teacher_id).await?)
}

pub async fn create_course(
    store: &dyn CredentialStore,
    teacher_id: Uuid,
    draft: CourseDraft,
) -> Result<Course, CourseError> {
    draft.validate()?;

    let course = Course {
        id: Uuid::new_v4(),
        name: draft.name.trim().to_string(),
        description: draft.description,
        subject: draft.subject.trim().to_string(),
        start_date: draft.start_date,
        end_date: draft.end_date,
        teacher_id,
    };

    let course = store.insert_course(course).await?;
    tracing::info!(course = %course.name, %teacher_id, "course created");
    Ok(course)
}

/// Fetch a course for editing, refusing courses owned by someone else.
pub async fn get_course_for_edit(
    store: &dyn CredentialStore,
    teacher_id: Uuid,
    course_id: Uuid,
) -> Result<Course, CourseError> {
    let course = store
        .find_course_by_id(course_id)
        .await?
        .ok_or(CourseError::NotFound)?;

    if course.teacher_id != teacher_id {
        if crate::config::config().security.enable_audit_logging {
            tracing::warn!(
                %teacher_id,
                %course_id,
                owner = %course.teacher_id,
                "refused access to course owned by another teacher"
            );
        }
        return Err(CourseError::NotOwned);
    }

    Ok(course)
}

/// Apply `draft` to an owned course. Ownership is re-verified here, at
/// write time, not just at the read that rendered the edit form.
pub async fn update_course(
    store: &dyn CredentialStore,
    teacher_id: Uuid,
    course_id: Uuid,
    draft: CourseDraft,
) -> Result<Course, CourseError> {
    draft.validate()?;

    let mut course = get_course_for_edit(store, teacher_id, course_id).await?;
    course.name = draft.name.trim().to_string();
    course.description = draft.description;
    course.subject = draft.subject.trim().to_string();
    course.start_date = draft.start_date;
    course.end_date = draft.end_date;

    let course = store.update_course(course).await?;
    tracing::info!(course = %course.name, %teacher_id, "course updated");
    Ok(course)
}

/// All courses, for student browsing.
pub async fn course_catalog(store: &dyn CredentialStore) -> Result<Vec<Course>, CourseError> {
    Ok(store.list_courses().await?)
}

pub async fn enroll(
    store: &dyn CredentialStore,
    student_id: Uuid,
    course_id: Uuid,
) -> Result<Enrollment, CourseError> {
    if store.find_course_by_id(course_id).await?.is_none() {
        return Err(CourseError::NotFound);
    }

    let enrollment = Enrollment {
        student_id,
        course_id,
        enrolled_at: Utc::now(),
    };

    match store.insert_enrollment(enrollment).await {
        Ok(enrollment) => {
            tracing::info!(%student_id, %course_id, "student enrolled");
            Ok(enrollment)
        }
        Err(StoreError::Conflict(_)) => Err(CourseError::AlreadyEnrolled),
        Err(e) => Err(e.into()),
    }
}

pub async fn enrolled_courses(
    store: &dyn CredentialStore,
    student_id: Uuid,
) -> Result<Vec<Course>, CourseError> {
    Ok(store.find_enrolled_courses(student_id).await?)
}
