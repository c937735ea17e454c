//! RBAC 处理器，除自查外都需要 `rbac.manage`

use axum::{
    extract::{Path, State},
    response::Json,
    Extension,
};

use super::model::{
    AssignRolePermissionRequest, AssignUserRoleRequest, CheckRbacRequest,
    CreatePermissionRequest, CreateRoleRequest, Permission, RbacCheckResponse, Role,
    RolePermission, UserRole, RBAC_MANAGE, RBAC_RESOURCE,
};
use crate::auth::jwt::Claims;
use crate::core::{error::CoreError, extract::ValidatedJson, response::ApiResponse};
use crate::state::AppState;

async fn require_manage(state: &AppState, claims: &Claims) -> Result<(), CoreError> {
    state
        .rbac
        .authorize(Some(claims), RBAC_RESOURCE, RBAC_MANAGE)
        .await
}

pub async fn create_permission(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ValidatedJson(req): ValidatedJson<CreatePermissionRequest>,
) -> Result<Json<ApiResponse<Permission>>, CoreError> {
    require_manage(&state, &claims).await?;
    let permission = state.rbac.create_permission(req).await?;
    Ok(Json(ApiResponse::success(permission)))
}

pub async fn get_permission(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<Permission>>, CoreError> {
    require_manage(&state, &claims).await?;
    let permission = state.rbac.get_permission_by_name(&name).await?;
    Ok(Json(ApiResponse::success(permission)))
}

pub async fn create_role(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ValidatedJson(req): ValidatedJson<CreateRoleRequest>,
) -> Result<Json<ApiResponse<Role>>, CoreError> {
    require_manage(&state, &claims).await?;
    let role = state.rbac.create_role(req).await?;
    Ok(Json(ApiResponse::success(role)))
}

pub async fn get_role(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<Role>>, CoreError> {
    require_manage(&state, &claims).await?;
    let role = state.rbac.get_role_by_name(&name).await?;
    Ok(Json(ApiResponse::success(role)))
}

pub async fn assign_permission_to_role(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(role_id): Path<String>,
    ValidatedJson(req): ValidatedJson<AssignRolePermissionRequest>,
) -> Result<Json<ApiResponse<RolePermission>>, CoreError> {
    require_manage(&state, &claims).await?;
    let link = state
        .rbac
        .assign_permission_to_role(&role_id, &req.permission_id)
        .await?;
    Ok(Json(ApiResponse::success(link)))
}

pub async fn assign_role_to_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<String>,
    ValidatedJson(req): ValidatedJson<AssignUserRoleRequest>,
) -> Result<Json<ApiResponse<UserRole>>, CoreError> {
    require_manage(&state, &claims).await?;
    let user_role = state.rbac.assign_role_to_user(&user_id, &req.role_id).await?;
    Ok(Json(ApiResponse::success(user_role)))
}

pub async fn get_user_roles(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<Role>>>, CoreError> {
    require_manage(&state, &claims).await?;
    let roles = state.rbac.get_user_roles(&user_id).await?;
    Ok(Json(ApiResponse::success(roles)))
}

/// 用户可以检查自己的权限，检查他人需要 `rbac.manage`
pub async fn check_permission(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ValidatedJson(req): ValidatedJson<CheckRbacRequest>,
) -> Result<Json<ApiResponse<RbacCheckResponse>>, CoreError> {
    if req.user_id != claims.user_id {
        require_manage(&state, &claims).await?;
    }
    let has_permission = state
        .rbac
        .check_permission(&req.user_id, &req.resource, &req.action)
        .await?;
    Ok(Json(ApiResponse::success(RbacCheckResponse { has_permission })))
}
