//! Network clients for the timetable backend.
//!
//! Provides environment-driven configuration, a typed REST client for the
//! entity collections, and the WebSocket client that drives a timetable
//! generation run and publishes its progress.

pub mod api;
pub mod client;
pub mod config;
pub mod messages;
pub mod progress;
