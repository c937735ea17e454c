//! 应用中心：应用及其下的二维码、表单、数据采集和应用内权限

pub mod app_permission;
pub mod application;
pub mod batch_qrcode;
pub mod data_collection;
pub mod form;
pub mod form_design;
pub mod qrcode;

use crate::core::error::CoreError;
use crate::store::PlatformStore;

/// 更新请求中的字段非空时才覆盖
pub(crate) fn apply(target: &mut String, value: Option<String>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        *target = value;
    }
}

/// 子资源创建前确认归属应用存在
pub(crate) async fn require_application(
    store: &dyn PlatformStore,
    app_id: &str,
) -> Result<(), CoreError> {
    store
        .get_application(app_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| CoreError::not_found("application not found"))
}

/// 校验字符串是合法 JSON
pub(crate) fn require_json(value: &str, field: &str) -> Result<(), CoreError> {
    serde_json::from_str::<serde_json::Value>(value)
        .map(|_| ())
        .map_err(|_| CoreError::bad_request(format!("{field} must be valid JSON")))
}
