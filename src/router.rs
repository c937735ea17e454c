//! 路由装配

use axum::{
    extract::State,
    middleware,
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde::Serialize;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::app::{
    app_permission::handler as app_permission, application::handler as application,
    batch_qrcode::handler as batch_qrcode, data_collection::handler as data_collection,
    form::handler as form, form_design::handler as form_design, qrcode::handler as qrcode,
};
use crate::auth::handler as auth;
use crate::core::{
    error::CoreError,
    middleware::{auth_middleware, request_logging_middleware},
    response::ApiResponse,
};
use crate::rbac::handler as rbac;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub storage: &'static str,
}

async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<HealthStatus>>, CoreError> {
    state
        .store
        .health_check()
        .await
        .map_err(|e| CoreError::internal("storage is unavailable", e))?;
    Ok(Json(ApiResponse::success(HealthStatus {
        status: "ok",
        storage: state.store.backend(),
    })))
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/logout", post(auth::logout))
        .route("/api/v1/auth/refresh", post(auth::refresh_token))
}

fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/user/:id", get(auth::get_user_info))
        .route("/auth/password", put(auth::change_password))
        // 应用
        .route(
            "/apps",
            post(application::create_application).get(application::list_applications),
        )
        .route(
            "/apps/:id",
            get(application::get_application)
                .put(application::update_application)
                .delete(application::delete_application),
        )
        // 二维码
        .route(
            "/qrcodes",
            post(qrcode::create_qrcode).get(qrcode::list_qrcodes),
        )
        .route(
            "/qrcodes/:id",
            get(qrcode::get_qrcode)
                .put(qrcode::update_qrcode)
                .delete(qrcode::delete_qrcode),
        )
        .route("/qrcodes/:id/generate", post(qrcode::generate_qrcode_image))
        // 批量二维码
        .route(
            "/batch-qrcodes",
            post(batch_qrcode::create_batch).get(batch_qrcode::list_batches),
        )
        .route(
            "/batch-qrcodes/:id",
            get(batch_qrcode::get_batch)
                .put(batch_qrcode::update_batch)
                .delete(batch_qrcode::delete_batch),
        )
        .route(
            "/batch-qrcodes/:id/generate",
            post(batch_qrcode::generate_batch),
        )
        // 表单
        .route("/forms", post(form::create_form).get(form::list_forms))
        .route(
            "/forms/data",
            post(form::submit_form_data).get(form::list_form_data),
        )
        .route(
            "/forms/:id",
            get(form::get_form)
                .put(form::update_form)
                .delete(form::delete_form),
        )
        // 表单设计
        .route(
            "/form-designs",
            post(form_design::create_form_design).get(form_design::list_form_designs),
        )
        .route(
            "/form-designs/:id",
            get(form_design::get_form_design)
                .put(form_design::update_form_design)
                .delete(form_design::delete_form_design),
        )
        .route(
            "/form-designs/:id/publish",
            post(form_design::publish_form_design),
        )
        // 数据采集
        .route(
            "/data-collections",
            post(data_collection::create_collection).get(data_collection::list_collections),
        )
        .route(
            "/data-collections/entries",
            post(data_collection::submit_entry).get(data_collection::list_entries),
        )
        .route(
            "/data-collections/entries/export/:id",
            get(data_collection::export_entries),
        )
        .route(
            "/data-collections/:id",
            get(data_collection::get_collection)
                .put(data_collection::update_collection)
                .delete(data_collection::delete_collection),
        )
        // 应用内权限
        .route(
            "/app-permissions",
            post(app_permission::create_permission).get(app_permission::list_permissions),
        )
        .route(
            "/app-permissions/assign",
            post(app_permission::assign_permission),
        )
        .route(
            "/app-permissions/revoke",
            post(app_permission::revoke_permission),
        )
        .route(
            "/app-permissions/user",
            get(app_permission::list_user_permissions),
        )
        .route(
            "/app-permissions/check",
            post(app_permission::check_permission),
        )
        .route(
            "/app-permissions/:id",
            get(app_permission::get_permission)
                .put(app_permission::update_permission)
                .delete(app_permission::delete_permission),
        )
        // RBAC
        .route("/rbac/permissions", post(rbac::create_permission))
        .route("/rbac/permissions/:name", get(rbac::get_permission))
        .route("/rbac/roles", post(rbac::create_role))
        // GET 按角色名查询，授权接口按角色 ID
        .route("/rbac/roles/:role", get(rbac::get_role))
        .route(
            "/rbac/roles/:role/permissions",
            post(rbac::assign_permission_to_role),
        )
        .route(
            "/rbac/users/:id/roles",
            post(rbac::assign_role_to_user).get(rbac::get_user_roles),
        )
        .route("/rbac/check", post(rbac::check_permission))
}

pub fn build_router(state: AppState, request_timeout: Duration) -> Router {
    let protected = protected_routes().route_layer(middleware::from_fn_with_state(
        state.clone(),
        auth_middleware,
    ));

    Router::new()
        .merge(public_routes())
        .nest("/api/v1", protected)
        .layer(middleware::from_fn(request_logging_middleware))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
