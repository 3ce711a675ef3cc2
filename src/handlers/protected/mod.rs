// Protected handlers. The session-resolution middleware has already
// injected an Identity extension (possibly anonymous); each handler runs
// the authorization gate before touching the store.

pub mod admin;
pub mod auth;
pub mod student;
pub mod teacher;
