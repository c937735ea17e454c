//! 数据采集模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow))]
pub struct DataCollection {
    pub id: String,
    pub app_id: String,
    pub name: String,
    pub description: String,
    pub schema: String,
    pub config: String,
    pub is_active: bool,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow))]
pub struct DataEntry {
    pub id: String,
    pub collection_id: String,
    pub data: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateDataCollectionRequest {
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
pub struct UpdateDataCollectionRequest {
    #[validate(length(max = 255, message = "name is too long"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub schema: Option<String>,
    pub config: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SubmitDataEntryRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "collection_id is required"))]
    pub collection_id: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "data is required"))]
    pub data: String,
    pub created_by: Option<String>,
}
