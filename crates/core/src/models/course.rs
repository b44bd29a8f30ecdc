use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::{DbId, Level};

/// A course row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: DbId,
    pub code: String,
    pub name: String,
    /// `0` marks a general course shared by every department.
    pub department_id: DbId,
    pub level: Level,
    pub credits: i32,
    pub lecture_hours: i32,
    #[serde(default)]
    pub tutorial_hours: i32,
    #[serde(default)]
    pub practical_hours: i32,
}

impl Course {
    /// Contact hours per week across all session types.
    pub fn weekly_hours(&self) -> i32 {
        self.lecture_hours + self.tutorial_hours + self.practical_hours
    }
}

/// DTO for creating a course.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct CreateCourse {
    #[validate(length(min = 1))]
    pub code: String,
    #[validate(length(min = 1))]
    pub name: String,
    pub department_id: DbId,
    #[validate(range(min = 1, max = 5))]
    pub level: Level,
    #[validate(range(min = 0))]
    pub credits: i32,
    #[validate(range(min = 0))]
    pub lecture_hours: i32,
    #[validate(range(min = 0))]
    pub tutorial_hours: i32,
    #[validate(range(min = 0))]
    pub practical_hours: i32,
}

/// DTO for updating a course. All fields are optional; unset fields are not sent.
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct UpdateCourse {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 5))]
    pub level: Option<Level>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0))]
    pub credits: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0))]
    pub lecture_hours: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0))]
    pub tutorial_hours: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0))]
    pub practical_hours: Option<i32>,
}
