//! 表单模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow))]
pub struct Form {
    pub id: String,
    pub app_id: String,
    pub name: String,
    pub description: String,
    pub schema: String,
    pub is_active: bool,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 表单提交记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow))]
pub struct FormDataEntry {
    pub id: String,
    pub form_id: String,
    pub data: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateFormRequest {
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
    pub created_by: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateFormRequest {
    #[validate(length(max = 255, message = "name is too long"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub schema: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SubmitFormDataRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "form_id is required"))]
    pub form_id: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "data is required"))]
    pub data: String,
    pub created_by: Option<String>,
}
