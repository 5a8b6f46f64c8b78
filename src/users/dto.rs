use serde::{Deserialize, Serialize};

use super::repo_types::{RoleRow, UserWithRole};

// The admin console speaks PascalCase, mirroring the table columns.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
    pub role_id: Option<i32>,
}

/// Same fields as create; `Password` and `Phone` may be omitted.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
    pub role_id: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserItem {
    pub user_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role_id: i32,
    pub role_name: String,
}

impl From<UserWithRole> for UserItem {
    fn from(u: UserWithRole) -> Self {
        Self {
            user_id: u.user_id,
            first_name: u.first_name,
            last_name: u.last_name,
            email: u.email,
            phone: u.phone,
            role_id: u.role_id,
            role_name: u.role_name,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RoleItem {
    pub role_id: i32,
    pub role_name: String,
}

impl From<RoleRow> for RoleItem {
    fn from(r: RoleRow) -> Self {
        Self {
            role_id: r.role_id,
            role_name: r.role_name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub success: bool,
    pub users: Vec<UserItem>,
}

#[derive(Debug, Serialize)]
pub struct RolesResponse {
    pub success: bool,
    pub roles: Vec<RoleItem>,
}

#[derive(Debug, Serialize)]
pub struct CreatedUserResponse {
    pub success: bool,
    pub message: String,
    #[serde(rename = "UserId")]
    pub user_id: i32,
}
