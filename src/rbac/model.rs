//! RBAC 模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub const ADMIN_ROLE: &str = "admin";
pub const RBAC_RESOURCE: &str = "rbac";
pub const RBAC_MANAGE: &str = "manage";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow))]
pub struct Role {
    pub id: String,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow))]
pub struct Permission {
    pub id: String,
    pub name: String,
    pub resource: String,
    pub action: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow))]
pub struct RolePermission {
    pub id: String,
    pub role_id: String,
    pub permission_id: String,
    pub created_at: DateTime<Utc>,
}

/// `role` 保存的是角色名
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow))]
pub struct UserRole {
    pub id: String,
    pub user_id: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePermissionRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 128, message = "name is required"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "resource is required"))]
    pub resource: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "action is required"))]
    pub action: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateRoleRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 64, message = "name is required"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AssignRolePermissionRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "permission_id is required"))]
    pub permission_id: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AssignUserRoleRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "role_id is required"))]
    pub role_id: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CheckRbacRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "user_id is required"))]
    pub user_id: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "resource is required"))]
    pub resource: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "action is required"))]
    pub action: String,
}

#[derive(Debug, Serialize)]
pub struct RbacCheckResponse {
    pub has_permission: bool,
}
