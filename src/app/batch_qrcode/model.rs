//! 批量二维码模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub const MAX_BATCH_COUNT: i32 = 10_000;

/// 批量任务状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    Pending,
    Generating,
    Completed,
    Failed,
}

impl BatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchStatus::Pending => "pending",
            BatchStatus::Generating => "generating",
            BatchStatus::Completed => "completed",
            BatchStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow))]
pub struct BatchQrCode {
    pub id: String,
    pub app_id: String,
    pub name: String,
    pub description: String,
    pub prefix: String,
    pub count: i32,
    #[serde(rename = "type")]
    #[cfg_attr(feature = "database", sqlx(rename = "type"))]
    pub qr_type: String,
    pub url_template: String,
    pub config: String,
    pub status: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BatchQrCode {
    pub fn is(&self, status: BatchStatus) -> bool {
        self.status == status.as_str()
    }

    /// 第 `index` 个二维码的名称
    pub fn item_name(&self, index: i32) -> String {
        if self.prefix.is_empty() {
            format!("{}_{}", self.name, index)
        } else {
            format!("{}_{}_{}", self.prefix, self.name, index)
        }
    }

    /// 第 `index` 个二维码的内容，模板中的 `{index}` 会被替换
    pub fn item_content(&self, index: i32) -> String {
        if self.url_template.is_empty() {
            format!("https://example.com/{}/{}", self.id, index)
        } else {
            self.url_template.replace("{index}", &index.to_string())
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBatchQrCodeRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "app_id is required"))]
    pub app_id: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "name is required"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub count: i32,
    #[serde(default, rename = "type")]
    #[validate(length(min = 1, message = "type is required"))]
    pub qr_type: String,
    #[serde(default)]
    pub url_template: String,
    #[serde(default)]
    pub config: String,
    pub created_by: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateBatchQrCodeRequest {
    #[validate(length(max = 255, message = "name is too long"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub prefix: Option<String>,
    pub count: Option<i32>,
    #[serde(rename = "type")]
    pub qr_type: Option<String>,
    pub url_template: Option<String>,
    pub config: Option<String>,
}
