use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::{DbId, Level};

/// A student group (cohort) row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentGroup {
    pub id: DbId,
    pub name: String,
    pub level: Level,
    pub department_id: DbId,
    pub size: i32,
}

/// DTO for creating a student group.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct CreateStudentGroup {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(range(min = 1, max = 5))]
    pub level: Level,
    pub department_id: DbId,
    #[validate(range(min = 1))]
    pub size: i32,
}

/// DTO for updating a student group. All fields are optional.
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct UpdateStudentGroup {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 5))]
    pub level: Option<Level>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1))]
    pub size: Option<i32>,
}
