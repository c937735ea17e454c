//! 批量二维码处理器

use axum::{
    extract::{Path, Query, State},
    response::Json,
    Extension,
};

use super::model::{BatchQrCode, CreateBatchQrCodeRequest, UpdateBatchQrCodeRequest};
use crate::app::qrcode::model::QrCode;
use crate::auth::jwt::Claims;
use crate::core::{
    error::CoreError,
    extract::{ListQuery, ValidatedJson},
    response::{ApiResponse, MessageResponse, PageResponse},
};
use crate::state::AppState;

pub async fn create_batch(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ValidatedJson(req): ValidatedJson<CreateBatchQrCodeRequest>,
) -> Result<Json<ApiResponse<BatchQrCode>>, CoreError> {
    let batch = state.batches.create(req, &claims.user_id).await?;
    Ok(Json(ApiResponse::success(batch)))
}

pub async fn get_batch(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<BatchQrCode>>, CoreError> {
    let batch = state.batches.get(&id).await?;
    Ok(Json(ApiResponse::success(batch)))
}

pub async fn update_batch(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateBatchQrCodeRequest>,
) -> Result<Json<ApiResponse<BatchQrCode>>, CoreError> {
    let batch = state.batches.update(&id, req).await?;
    Ok(Json(ApiResponse::success(batch)))
}

pub async fn delete_batch(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, CoreError> {
    state.batches.delete(&id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "batch QR code deleted successfully",
    ))))
}

pub async fn list_batches(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<PageResponse<BatchQrCode>>>, CoreError> {
    let app_id = ListQuery::require(&query.app_id, "app_id")?;
    let page = state.batches.list(&app_id, query.pagination()).await?;
    Ok(Json(ApiResponse::success(page)))
}

pub async fn generate_batch(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<QrCode>>>, CoreError> {
    let codes = state.batches.generate(&id).await?;
    Ok(Json(ApiResponse::success(codes)))
}
