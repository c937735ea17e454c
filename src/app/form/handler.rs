//! 表单处理器

use axum::{
    extract::{Path, Query, State},
    response::Json,
    Extension,
};

use super::model::{
    CreateFormRequest, Form, FormDataEntry, SubmitFormDataRequest, UpdateFormRequest,
};
use crate::auth::jwt::Claims;
use crate::core::{
    error::CoreError,
    extract::{ListQuery, ValidatedJson},
    response::{ApiResponse, MessageResponse, PageResponse},
};
use crate::state::AppState;

pub async fn create_form(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ValidatedJson(req): ValidatedJson<CreateFormRequest>,
) -> Result<Json<ApiResponse<Form>>, CoreError> {
    let form = state.forms.create(req, &claims.user_id).await?;
    Ok(Json(ApiResponse::success(form)))
}

pub async fn get_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Form>>, CoreError> {
    let form = state.forms.get(&id).await?;
    Ok(Json(ApiResponse::success(form)))
}

pub async fn update_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateFormRequest>,
) -> Result<Json<ApiResponse<Form>>, CoreError> {
    let form = state.forms.update(&id, req).await?;
    Ok(Json(ApiResponse::success(form)))
}

pub async fn delete_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, CoreError> {
    state.forms.delete(&id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "form deleted successfully",
    ))))
}

pub async fn list_forms(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<PageResponse<Form>>>, CoreError> {
    let app_id = ListQuery::require(&query.app_id, "app_id")?;
    let page = state.forms.list(&app_id, query.pagination()).await?;
    Ok(Json(ApiResponse::success(page)))
}

pub async fn submit_form_data(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ValidatedJson(req): ValidatedJson<SubmitFormDataRequest>,
) -> Result<Json<ApiResponse<FormDataEntry>>, CoreError> {
    let entry = state.forms.submit(req, &claims.user_id).await?;
    Ok(Json(ApiResponse::success(entry)))
}

pub async fn list_form_data(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<PageResponse<FormDataEntry>>>, CoreError> {
    let form_id = ListQuery::require(&query.form_id, "form_id")?;
    let page = state
        .forms
        .list_entries(&form_id, query.pagination())
        .await?;
    Ok(Json(ApiResponse::success(page)))
}
