use serde::{Deserialize, Serialize};

use crate::roles::Role;
use crate::types::DbId;

/// Profile returned by `GET /api/auth/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub username: String,
    pub full_name: String,
    pub role: Role,
    #[serde(default)]
    pub department_id: Option<DbId>,
    pub is_active: bool,
}

/// Body of `POST /api/auth/login`. The backend authenticates by username only.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
}

/// Response of `POST /api/auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}
