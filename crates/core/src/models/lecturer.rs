use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::DbId;

/// Default teaching load cap when the backend omits it.
pub const DEFAULT_MAX_HOURS_PER_WEEK: i32 = 20;

fn default_max_hours() -> i32 {
    DEFAULT_MAX_HOURS_PER_WEEK
}

/// A lecturer row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lecturer {
    pub id: DbId,
    pub staff_number: String,
    pub full_name: String,
    pub email: String,
    pub department_id: DbId,
    #[serde(default = "default_max_hours")]
    pub max_hours_per_week: i32,
}

/// DTO for creating a lecturer.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct CreateLecturer {
    #[validate(length(min = 1))]
    pub staff_number: String,
    #[validate(length(min = 1))]
    pub full_name: String,
    #[validate(email)]
    pub email: String,
    pub department_id: DbId,
    #[validate(range(min = 1, max = 60))]
    pub max_hours_per_week: i32,
}

/// DTO for updating a lecturer. All fields are optional.
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct UpdateLecturer {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1))]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email)]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 60))]
    pub max_hours_per_week: Option<i32>,
}
