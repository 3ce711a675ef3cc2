//! In-memory credential store for development and tests.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use super::models::{Course, Enrollment, Session, User};
use super::{CredentialStore, StoreError};

/// Both user maps live behind one lock so every method sees them in a
/// consistent state and no two methods can acquire them in opposite order.
#[derive(Debug, Default)]
struct UserTable {
    by_id: HashMap<Uuid, User>,
    by_email: HashMap<String, Uuid>, // email -> user_id
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<UserTable>,
    courses: RwLock<HashMap<Uuid, Course>>,
    enrollments: RwLock<Vec<Enrollment>>,
    sessions: RwLock<HashMap<String, Session>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().unwrap();
        Ok(users
            .by_email
            .get(email)
            .and_then(|id| users.by_id.get(id))
            .cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().unwrap().by_id.get(&id).cloned())
    }

    async fn insert_user(&self, user: User) -> Result<User, StoreError> {
        let mut users = self.users.write().unwrap();
        if users.by_email.contains_key(&user.email) {
            return Err(StoreError::Conflict(format!(
                "email '{}' is already registered",
                user.email
            )));
        }
        users.by_email.insert(user.email.clone(), user.id);
        users.by_id.insert(user.id, user.clone());
        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let mut users: Vec<User> = self.users.read().unwrap().by_id.values().cloned().collect();
        users.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(users)
    }

    async fn delete_user(&self, id: Uuid) -> Result<(), StoreError> {
        let mut users = self.users.write().unwrap();
        let user = users
            .by_id
            .remove(&id)
            .ok_or_else(|| StoreError::NotFound(format!("user {} not found", id)))?;
        users.by_email.remove(&user.email);
        Ok(())
    }

    async fn count_users(&self) -> Result<i64, StoreError> {
        Ok(self.users.read().unwrap().by_id.len() as i64)
    }

    async fn find_courses_by_teacher(&self, teacher_id: Uuid) -> Result<Vec<Course>, StoreError> {
        let mut courses: Vec<Course> = self
            .courses
            .read()
            .unwrap()
            .values()
            .filter(|c| c.teacher_id == teacher_id)
            .cloned()
            .collect();
        courses.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(courses)
    }

    async fn find_course_by_id(&self, id: Uuid) -> Result<Option<Course>, StoreError> {
        Ok(self.courses.read().unwrap().get(&id).cloned())
    }

    async fn list_courses(&self) -> Result<Vec<Course>, StoreError> {
        let mut courses: Vec<Course> = self.courses.read().unwrap().values().cloned().collect();
        courses.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(courses)
    }

    async fn insert_course(&self, course: Course) -> Result<Course, StoreError> {
        self.courses
            .write()
            .unwrap()
            .insert(course.id, course.clone());
        Ok(course)
    }

    async fn update_course(&self, course: Course) -> Result<Course, StoreError> {
        let mut courses = self.courses.write().unwrap();
        if !courses.contains_key(&course.id) {
            return Err(StoreError::NotFound(format!(
                "course {} not found",
                course.id
            )));
        }
        courses.insert(course.id, course.clone());
        Ok(course)
    }

    async fn insert_enrollment(&self, enrollment: Enrollment) -> Result<Enrollment, StoreError> {
        let mut enrollments = self.enrollments.write().unwrap();
        let duplicate = enrollments.iter().any(|e| {
            e.student_id == enrollment.student_id && e.course_id == enrollment.course_id
        });
        if duplicate {
            return Err(StoreError::Conflict(
                "student is already enrolled in this course".to_string(),
            ));
        }
        enrollments.push(enrollment.clone());
        Ok(enrollment)
    }

    async fn find_enrolled_courses(&self, student_id: Uuid) -> Result<Vec<Course>, StoreError> {
        let enrollments = self.enrollments.read().unwrap();
        let courses = self.courses.read().unwrap();
        let mut enrolled: Vec<Course> = enrollments
            .iter()
            .filter(|e| e.student_id == student_id)
            .filter_map(|e| courses.get(&e.course_id))
            .cloned()
            .collect();
        enrolled.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(enrolled)
    }

    async fn delete_enrollments_for_user(&self, user_id: Uuid) -> Result<(), StoreError> {
        self.enrollments
            .write()
            .unwrap()
            .retain(|e| e.student_id != user_id);
        Ok(())
    }

    async fn insert_session(&self, session: Session) -> Result<(), StoreError> {
        self.sessions
            .write()
            .unwrap()
            .insert(session.token.clone(), session);
        Ok(())
    }

    async fn find_session(&self, token: &str) -> Result<Option<Session>, StoreError> {
        Ok(self.sessions.read().unwrap().get(token).cloned())
    }

    async fn delete_session(&self, token: &str) -> Result<(), StoreError> {
        self.sessions.write().unwrap().remove(token);
        Ok(())
    }

    async fn delete_sessions_for_user(&self, user_id: Uuid) -> Result<(), StoreError> {
        self.sessions
            .write()
            .unwrap()
            .retain(|_, s| s.user_id != user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Role;
    use chrono::Utc;

    fn user(email: &str, role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: String::new(),
            role,
            display_name: email.to_string(),
            registered_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn email_uniqueness_spans_roles() {
        let store = MemoryStore::new();
        store
            .insert_user(user("same@example.com", Role::Student))
            .await
            .unwrap();

        let err = store
            .insert_user(user("same@example.com", Role::Teacher))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn deleting_a_user_frees_the_email() {
        let store = MemoryStore::new();
        let u = store
            .insert_user(user("reuse@example.com", Role::Student))
            .await
            .unwrap();
        store.delete_user(u.id).await.unwrap();
        assert!(store
            .insert_user(user("reuse@example.com", Role::Admin))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn duplicate_enrollment_conflicts() {
        let store = MemoryStore::new();
        let enrollment = Enrollment {
            student_id: Uuid::new_v4(),
            course_id: Uuid::new_v4(),
            enrolled_at: Utc::now(),
        };
        store.insert_enrollment(enrollment.clone()).await.unwrap();
        let err = store.insert_enrollment(enrollment).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_user_creates_and_deletes_make_progress() {
        use std::sync::Arc;

        let store = Arc::new(MemoryStore::new());

        let inserter = {
            let store = store.clone();
            tokio::spawn(async move {
                for i in 0..500 {
                    let _ = store
                        .insert_user(user(&format!("churn{}@example.com", i), Role::Student))
                        .await;
                }
            })
        };
        let deleter = {
            let store = store.clone();
            tokio::spawn(async move {
                for _ in 0..500 {
                    let ids: Vec<Uuid> = store
                        .list_users()
                        .await
                        .unwrap()
                        .into_iter()
                        .map(|u| u.id)
                        .collect();
                    for id in ids {
                        let _ = store.delete_user(id).await;
                    }
                }
            })
        };

        tokio::time::timeout(std::time::Duration::from_secs(10), async {
            inserter.await.unwrap();
            deleter.await.unwrap();
        })
        .await
        .expect("concurrent insert/delete wedged");
    }

    #[tokio::test]
    async fn session_delete_is_idempotent() {
        let store = MemoryStore::new();
        store.delete_session("no-such-token").await.unwrap();
        store.delete_session("no-such-token").await.unwrap();
    }
}
