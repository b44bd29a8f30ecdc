//! User roles recognised by the timetable backend.
//!
//! The string constants must match the backend's `UserRole` values.

use serde::{Deserialize, Serialize};

pub const ROLE_COORDINATOR: &str = "coordinator";
pub const ROLE_HOD: &str = "hod";

/// Role carried on every [`User`](crate::models::User) profile.
///
/// Coordinators manage every department and own timetable generation.
/// Heads of department (HODs) manage the entities of their own department.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Coordinator,
    Hod,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Coordinator => ROLE_COORDINATOR,
            Role::Hod => ROLE_HOD,
        }
    }

    /// Whether the role may manage department entities (HOD or above).
    pub fn is_privileged(self) -> bool {
        matches!(self, Role::Coordinator | Role::Hod)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_deserialize_from_backend_strings() {
        let role: Role = serde_json::from_str(r#""coordinator""#).unwrap();
        assert_eq!(role, Role::Coordinator);
        let role: Role = serde_json::from_str(r#""hod""#).unwrap();
        assert_eq!(role, Role::Hod);
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!(serde_json::from_str::<Role>(r#""admin""#).is_err());
    }

    #[test]
    fn both_roles_are_privileged() {
        assert!(Role::Coordinator.is_privileged());
        assert!(Role::Hod.is_privileged());
    }

    #[test]
    fn display_matches_constants() {
        assert_eq!(Role::Coordinator.to_string(), ROLE_COORDINATOR);
        assert_eq!(Role::Hod.to_string(), ROLE_HOD);
    }
}
