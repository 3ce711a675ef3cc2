// Two security tiers: public (no session required) and protected
// (session resolved, role enforced per route by the authorization gate).

pub mod protected;
pub mod public;
