//! 表单设计模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow))]
pub struct FormDesign {
    pub id: String,
    pub app_id: String,
    pub name: String,
    pub description: String,
    pub schema: String,
    pub config: String,
    pub is_active: bool,
    pub is_published: bool,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateFormDesignRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "app_id is required"))]
    pub app_id: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "name is required"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "schema is required"))]
    pub schema: String,
    #[serde(default)]
    pub config: String,
    pub created_by: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateFormDesignRequest {
    #[validate(length(max = 255, message = "name is too long"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub schema: Option<String>,
    pub config: Option<String>,
    pub is_active: Option<bool>,
}
