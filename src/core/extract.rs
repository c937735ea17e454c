//! 请求提取器

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize};
use validator::Validate;

use super::{error::CoreError, pagination::Pagination};

/// 反序列化 JSON 并执行 validator 校验，失败统一返回 400
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = CoreError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| CoreError::BadRequest(rejection.body_text()))?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

/// 列表查询参数，`page`/`size` 以字符串接收以便宽松解析
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub app_id: Option<String>,
    pub team_id: Option<String>,
    pub form_id: Option<String>,
    pub collection_id: Option<String>,
    pub page: Option<String>,
    pub size: Option<String>,
}

impl ListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::parse(self.page.as_deref(), self.size.as_deref())
    }

    /// 取出必填的过滤参数
    pub fn require(value: &Option<String>, name: &str) -> Result<String, CoreError> {
        match value.as_deref().map(str::trim) {
            Some(v) if !v.is_empty() => Ok(v.to_string()),
            _ => Err(CoreError::bad_request(format!("{name} is required"))),
        }
    }
}
