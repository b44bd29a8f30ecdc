//! Domain types for the timetabler client.
//!
//! Pure, I/O-free building blocks shared by the REST and WebSocket clients:
//! identifiers, the error taxonomy, roles and the explicit session context,
//! typed entity contracts, and the generation-run state machine.

pub mod error;
pub mod generation;
pub mod models;
pub mod roles;
pub mod session;
pub mod types;
