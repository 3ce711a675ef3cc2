// Public handlers: token acquisition only. No session is consulted here;
// input is validated without any trusted user context.

pub mod auth;
