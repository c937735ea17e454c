//! 二维码模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub const QR_CODE_TYPES: [&str; 2] = ["static", "dynamic"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow))]
pub struct QrCode {
    pub id: String,
    pub app_id: String,
    pub name: String,
    pub content: String,
    #[serde(rename = "type")]
    #[cfg_attr(feature = "database", sqlx(rename = "type"))]
    pub qr_type: String,
    pub url: String,
    pub image_path: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateQrCodeRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "app_id is required"))]
    pub app_id: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "name is required"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "content is required"))]
    pub content: String,
    #[serde(default, rename = "type")]
    #[validate(length(min = 1, message = "type is required"))]
    pub qr_type: String,
    #[serde(default)]
    pub url: String,
    pub created_by: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateQrCodeRequest {
    #[validate(length(max = 255, message = "name is too long"))]
    pub name: Option<String>,
    pub content: Option<String>,
    #[serde(rename = "type")]
    pub qr_type: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QrImageResponse {
    pub id: String,
    pub image_path: String,
}
