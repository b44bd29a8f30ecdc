//! Explicit session context.
//!
//! A [`Session`] holds the bearer token and the profile of the signed-in
//! user. It is created once at login, passed by reference to whatever needs
//! it, and cleared on logout. Nothing in the workspace keeps session state in
//! globals.

use crate::error::CoreError;
use crate::models::User;
use crate::roles::Role;

/// Identity of the current operator.
#[derive(Debug, Clone, Default)]
pub struct Session {
    token: Option<String>,
    user: Option<User>,
}

impl Session {
    /// An empty, unauthenticated session.
    pub fn new() -> Self {
        Self::default()
    }

    /// A session that carries a token but no profile yet.
    ///
    /// Used when a token is supplied out of band (e.g. from the environment)
    /// and the profile will be fetched with `GET /api/auth/me`.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            user: None,
        }
    }

    /// A fully signed-in session.
    pub fn signed_in(token: impl Into<String>, user: User) -> Self {
        Self {
            token: Some(token.into()),
            user: Some(user),
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Attach (or replace) the profile of the token holder.
    pub fn set_user(&mut self, user: User) {
        self.user = Some(user);
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|u| u.role)
    }

    pub fn is_coordinator(&self) -> bool {
        self.role() == Some(Role::Coordinator)
    }

    /// HOD or coordinator.
    pub fn is_privileged(&self) -> bool {
        self.role().is_some_and(Role::is_privileged)
    }

    /// Drop the token and profile.
    pub fn clear(&mut self) {
        self.token = None;
        self.user = None;
    }

    /// Return the bearer token or an `Unauthorized` error.
    pub fn require_token(&self) -> Result<&str, CoreError> {
        self.token()
            .ok_or_else(|| CoreError::Unauthorized("Not signed in".to_string()))
    }

    /// Fail unless the session belongs to a coordinator.
    ///
    /// Timetable creation, activation, deletion and generation are
    /// coordinator-only on the backend; checking up front saves a round trip.
    pub fn require_coordinator(&self) -> Result<(), CoreError> {
        self.require_token()?;
        if self.is_coordinator() {
            Ok(())
        } else {
            Err(CoreError::Forbidden(
                "This action requires the coordinator role".to_string(),
            ))
        }
    }
}
