//! 数据采集处理器

use axum::{
    extract::{Path, Query, State},
    response::Json,
    Extension,
};

use super::model::{
    CreateDataCollectionRequest, DataCollection, DataEntry, SubmitDataEntryRequest,
    UpdateDataCollectionRequest,
};
use crate::auth::jwt::Claims;
use crate::core::{
    error::CoreError,
    extract::{ListQuery, ValidatedJson},
    response::{ApiResponse, MessageResponse, PageResponse},
};
use crate::state::AppState;

pub async fn create_collection(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ValidatedJson(req): ValidatedJson<CreateDataCollectionRequest>,
) -> Result<Json<ApiResponse<DataCollection>>, CoreError> {
    let collection = state.data_collections.create(req, &claims.user_id).await?;
    Ok(Json(ApiResponse::success(collection)))
}

pub async fn get_collection(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<DataCollection>>, CoreError> {
    let collection = state.data_collections.get(&id).await?;
    Ok(Json(ApiResponse::success(collection)))
}

pub async fn update_collection(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateDataCollectionRequest>,
) -> Result<Json<ApiResponse<DataCollection>>, CoreError> {
    let collection = state.data_collections.update(&id, req).await?;
    Ok(Json(ApiResponse::success(collection)))
}

pub async fn delete_collection(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, CoreError> {
    state.data_collections.delete(&id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "data collection deleted successfully",
    ))))
}

pub async fn list_collections(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<PageResponse<DataCollection>>>, CoreError> {
    let app_id = ListQuery::require(&query.app_id, "app_id")?;
    let page = state
        .data_collections
        .list(&app_id, query.pagination())
        .await?;
    Ok(Json(ApiResponse::success(page)))
}

pub async fn submit_entry(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ValidatedJson(req): ValidatedJson<SubmitDataEntryRequest>,
) -> Result<Json<ApiResponse<DataEntry>>, CoreError> {
    let entry = state.data_collections.submit(req, &claims.user_id).await?;
    Ok(Json(ApiResponse::success(entry)))
}

pub async fn list_entries(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<PageResponse<DataEntry>>>, CoreError> {
    let collection_id = ListQuery::require(&query.collection_id, "collection_id")?;
    let page = state
        .data_collections
        .list_entries(&collection_id, query.pagination())
        .await?;
    Ok(Json(ApiResponse::success(page)))
}

pub async fn export_entries(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<DataEntry>>>, CoreError> {
    let entries = state.data_collections.export(&id).await?;
    Ok(Json(ApiResponse::success(entries)))
}
