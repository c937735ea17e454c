//! 表单设计处理器

use axum::{
    extract::{Path, Query, State},
    response::Json,
    Extension,
};

use super::model::{CreateFormDesignRequest, FormDesign, UpdateFormDesignRequest};
use crate::auth::jwt::Claims;
use crate::core::{
    error::CoreError,
    extract::{ListQuery, ValidatedJson},
    response::{ApiResponse, MessageResponse, PageResponse},
};
use crate::state::AppState;

pub async fn create_form_design(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ValidatedJson(req): ValidatedJson<CreateFormDesignRequest>,
) -> Result<Json<ApiResponse<FormDesign>>, CoreError> {
    let design = state.form_designs.create(req, &claims.user_id).await?;
    Ok(Json(ApiResponse::success(design)))
}

pub async fn get_form_design(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<FormDesign>>, CoreError> {
    let design = state.form_designs.get(&id).await?;
    Ok(Json(ApiResponse::success(design)))
}

pub async fn update_form_design(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateFormDesignRequest>,
) -> Result<Json<ApiResponse<FormDesign>>, CoreError> {
    let design = state.form_designs.update(&id, req).await?;
    Ok(Json(ApiResponse::success(design)))
}

pub async fn delete_form_design(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, CoreError> {
    state.form_designs.delete(&id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "form design deleted successfully",
    ))))
}

pub async fn list_form_designs(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<PageResponse<FormDesign>>>, CoreError> {
    let app_id = ListQuery::require(&query.app_id, "app_id")?;
    let page = state
        .form_designs
        .list(&app_id, query.pagination())
        .await?;
    Ok(Json(ApiResponse::success(page)))
}

pub async fn publish_form_design(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<FormDesign>>, CoreError> {
    let design = state.form_designs.publish(&id).await?;
    Ok(Json(ApiResponse::success(design)))
}
