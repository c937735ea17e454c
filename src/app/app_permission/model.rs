//! 应用内权限模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub const PERMISSION_VALUES: [&str; 4] = ["read", "write", "delete", "manage"];

pub fn is_valid_permission(value: &str) -> bool {
    PERMISSION_VALUES.contains(&value)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow))]
pub struct AppPermission {
    pub id: String,
    pub app_id: String,
    pub name: String,
    pub description: String,
    pub permission: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 用户与应用权限的关联
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow))]
pub struct AppUserPermission {
    pub id: String,
    pub app_id: String,
    pub user_id: String,
    pub permission_id: String,
    pub assigned_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAppPermissionRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "app_id is required"))]
    pub app_id: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "name is required"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "permission is required"))]
    pub permission: String,
    pub created_by: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateAppPermissionRequest {
    #[validate(length(max = 255, message = "name is too long"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub permission: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AssignPermissionRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "app_id is required"))]
    pub app_id: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "user_id is required"))]
    pub user_id: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "permission_id is required"))]
    pub permission_id: String,
    pub assigned_by: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RevokePermissionRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "app_id is required"))]
    pub app_id: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "user_id is required"))]
    pub user_id: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "permission_id is required"))]
    pub permission_id: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CheckPermissionRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "app_id is required"))]
    pub app_id: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "user_id is required"))]
    pub user_id: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "permission is required"))]
    pub permission: String,
}

#[derive(Debug, Deserialize)]
pub struct UserPermissionQuery {
    pub app_id: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PermissionCheckResponse {
    pub has_permission: bool,
}
