//! 应用模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub const APPLICATION_TYPES: [&str; 3] = ["qrcode", "form", "survey"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow))]
pub struct Application {
    pub id: String,
    pub team_id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    #[cfg_attr(feature = "database", sqlx(rename = "type"))]
    pub app_type: String,
    pub config: String,
    pub is_active: bool,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateApplicationRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "team_id is required"))]
    pub team_id: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "name is required"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "type")]
    #[validate(length(min = 1, message = "type is required"))]
    pub app_type: String,
    #[serde(default)]
    pub config: String,
    pub created_by: Option<String>,
}

/// 只更新非空字段
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateApplicationRequest {
    #[validate(length(max = 255, message = "name is too long"))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub app_type: Option<String>,
    pub config: Option<String>,
    pub is_active: Option<bool>,
}
