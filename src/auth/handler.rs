//! 认证处理器

use axum::{
    extract::{Path, State},
    response::Json,
    Extension,
};

use super::jwt::Claims;
use super::model::{
    AuthResponse, ChangePasswordRequest, LoginRequest, LogoutRequest, RefreshTokenRequest,
    RegisterRequest, TokenPair, User,
};
use crate::core::{
    error::CoreError,
    extract::ValidatedJson,
    response::{ApiResponse, MessageResponse},
};
use crate::state::AppState;

pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<Json<ApiResponse<User>>, CoreError> {
    let user = state.auth.register(req).await?;
    Ok(Json(ApiResponse::success(user)))
}

pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, CoreError> {
    let resp = state.auth.login(req).await?;
    Ok(Json(ApiResponse::success(resp)))
}

pub async fn get_user_info(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<User>>, CoreError> {
    let user = state.auth.get_user_info(&id).await?;
    Ok(Json(ApiResponse::success(user)))
}

/// 只能修改当前登录用户的密码
pub async fn change_password(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ValidatedJson(req): ValidatedJson<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, CoreError> {
    state.auth.change_password(&claims.user_id, req).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "password changed successfully",
    ))))
}

pub async fn logout(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LogoutRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, CoreError> {
    state.auth.logout(&req.token).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "logged out successfully",
    ))))
}

pub async fn refresh_token(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RefreshTokenRequest>,
) -> Result<Json<ApiResponse<TokenPair>>, CoreError> {
    let tokens = state.auth.refresh(&req.refresh_token).await?;
    Ok(Json(ApiResponse::success(tokens)))
}
