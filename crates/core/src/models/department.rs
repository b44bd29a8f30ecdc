use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::DbId;

/// A department row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    pub id: DbId,
    pub name: String,
    pub code: String,
}

/// DTO for creating a department.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct CreateDepartment {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1, max = 16))]
    pub code: String,
}
