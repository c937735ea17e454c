//! 二维码处理器

use axum::{
    extract::{Path, Query, State},
    response::Json,
    Extension,
};

use super::model::{CreateQrCodeRequest, QrCode, QrImageResponse, UpdateQrCodeRequest};
use crate::auth::jwt::Claims;
use crate::core::{
    error::CoreError,
    extract::{ListQuery, ValidatedJson},
    response::{ApiResponse, MessageResponse, PageResponse},
};
use crate::state::AppState;

pub async fn create_qrcode(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ValidatedJson(req): ValidatedJson<CreateQrCodeRequest>,
) -> Result<Json<ApiResponse<QrCode>>, CoreError> {
    let code = state.qrcodes.create(req, &claims.user_id).await?;
    Ok(Json(ApiResponse::success(code)))
}

pub async fn get_qrcode(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<QrCode>>, CoreError> {
    let code = state.qrcodes.get(&id).await?;
    Ok(Json(ApiResponse::success(code)))
}

pub async fn update_qrcode(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateQrCodeRequest>,
) -> Result<Json<ApiResponse<QrCode>>, CoreError> {
    let code = state.qrcodes.update(&id, req).await?;
    Ok(Json(ApiResponse::success(code)))
}

pub async fn delete_qrcode(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, CoreError> {
    state.qrcodes.delete(&id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "QR code deleted successfully",
    ))))
}

pub async fn list_qrcodes(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<PageResponse<QrCode>>>, CoreError> {
    let app_id = ListQuery::require(&query.app_id, "app_id")?;
    let page = state.qrcodes.list(&app_id, query.pagination()).await?;
    Ok(Json(ApiResponse::success(page)))
}

pub async fn generate_qrcode_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<QrImageResponse>>, CoreError> {
    let code = state.qrcodes.generate_image(&id).await?;
    Ok(Json(ApiResponse::success(QrImageResponse {
        id: code.id,
        image_path: code.image_path,
    })))
}
