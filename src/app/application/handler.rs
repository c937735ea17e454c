//! 应用处理器

use axum::{
    extract::{Path, Query, State},
    response::Json,
    Extension,
};

use super::model::{Application, CreateApplicationRequest, UpdateApplicationRequest};
use crate::auth::jwt::Claims;
use crate::core::{
    error::CoreError,
    extract::{ListQuery, ValidatedJson},
    response::{ApiResponse, MessageResponse, PageResponse},
};
use crate::state::AppState;

pub async fn create_application(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ValidatedJson(req): ValidatedJson<CreateApplicationRequest>,
) -> Result<Json<ApiResponse<Application>>, CoreError> {
    let app = state.applications.create(req, &claims.user_id).await?;
    Ok(Json(ApiResponse::success(app)))
}

pub async fn get_application(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Application>>, CoreError> {
    let app = state.applications.get(&id).await?;
    Ok(Json(ApiResponse::success(app)))
}

pub async fn update_application(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateApplicationRequest>,
) -> Result<Json<ApiResponse<Application>>, CoreError> {
    let app = state.applications.update(&id, req).await?;
    Ok(Json(ApiResponse::success(app)))
}

pub async fn delete_application(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, CoreError> {
    state.applications.delete(&id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "application deleted successfully",
    ))))
}

pub async fn list_applications(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<PageResponse<Application>>>, CoreError> {
    let team_id = ListQuery::require(&query.team_id, "team_id")?;
    let page = state
        .applications
        .list(&team_id, query.pagination())
        .await?;
    Ok(Json(ApiResponse::success(page)))
}
