//! 应用内权限处理器

use axum::{
    extract::{Path, Query, State},
    response::Json,
    Extension,
};

use super::model::{
    AppPermission, AppUserPermission, AssignPermissionRequest, CheckPermissionRequest,
    CreateAppPermissionRequest, PermissionCheckResponse, RevokePermissionRequest,
    UpdateAppPermissionRequest, UserPermissionQuery,
};
use crate::auth::jwt::Claims;
use crate::core::{
    error::CoreError,
    extract::{ListQuery, ValidatedJson},
    response::{ApiResponse, MessageResponse, PageResponse},
};
use crate::state::AppState;

pub async fn create_permission(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ValidatedJson(req): ValidatedJson<CreateAppPermissionRequest>,
) -> Result<Json<ApiResponse<AppPermission>>, CoreError> {
    let permission = state.app_permissions.create(req, &claims.user_id).await?;
    Ok(Json(ApiResponse::success(permission)))
}

pub async fn get_permission(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<AppPermission>>, CoreError> {
    let permission = state.app_permissions.get(&id).await?;
    Ok(Json(ApiResponse::success(permission)))
}

pub async fn update_permission(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateAppPermissionRequest>,
) -> Result<Json<ApiResponse<AppPermission>>, CoreError> {
    let permission = state.app_permissions.update(&id, req).await?;
    Ok(Json(ApiResponse::success(permission)))
}

pub async fn delete_permission(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, CoreError> {
    state.app_permissions.delete(&id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "application permission deleted successfully",
    ))))
}

pub async fn list_permissions(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<PageResponse<AppPermission>>>, CoreError> {
    let app_id = ListQuery::require(&query.app_id, "app_id")?;
    let page = state
        .app_permissions
        .list(&app_id, query.pagination())
        .await?;
    Ok(Json(ApiResponse::success(page)))
}

pub async fn assign_permission(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ValidatedJson(req): ValidatedJson<AssignPermissionRequest>,
) -> Result<Json<ApiResponse<AppUserPermission>>, CoreError> {
    let grant = state.app_permissions.assign(req, &claims.user_id).await?;
    Ok(Json(ApiResponse::success(grant)))
}

pub async fn revoke_permission(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RevokePermissionRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, CoreError> {
    state.app_permissions.revoke(req).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "permission revoked successfully",
    ))))
}

pub async fn list_user_permissions(
    State(state): State<AppState>,
    Query(query): Query<UserPermissionQuery>,
) -> Result<Json<ApiResponse<Vec<AppPermission>>>, CoreError> {
    let app_id = ListQuery::require(&query.app_id, "app_id")?;
    let user_id = ListQuery::require(&query.user_id, "user_id")?;
    let permissions = state
        .app_permissions
        .list_user_permissions(&app_id, &user_id)
        .await?;
    Ok(Json(ApiResponse::success(permissions)))
}

pub async fn check_permission(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CheckPermissionRequest>,
) -> Result<Json<ApiResponse<PermissionCheckResponse>>, CoreError> {
    let has_permission = state.app_permissions.check(req).await?;
    Ok(Json(ApiResponse::success(PermissionCheckResponse {
        has_permission,
    })))
}
