use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::DbId;

fn default_true() -> bool {
    true
}

/// A teaching room row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: DbId,
    pub name: String,
    pub building: String,
    pub capacity: i32,
    /// Free-form kind, e.g. `lecture_hall`, `lab`.
    pub room_type: String,
    #[serde(default = "default_true")]
    pub has_projector: bool,
    #[serde(default)]
    pub has_computers: bool,
}

/// DTO for creating a room.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct CreateRoom {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub building: String,
    #[validate(range(min = 1))]
    pub capacity: i32,
    #[validate(length(min = 1))]
    pub room_type: String,
    pub has_projector: bool,
    pub has_computers: bool,
}

/// DTO for updating a room. All fields are optional.
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct UpdateRoom {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1))]
    pub building: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1))]
    pub capacity: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1))]
    pub room_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_projector: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_computers: Option<bool>,
}
