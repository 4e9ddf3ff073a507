use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use super::json_body;
use crate::middleware::{ApiResponse, ApiResult};
use crate::server::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /categories - List stored categories in insertion order
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Value> {
    let Query(query) = query?;
    let documents = state.categories.list(query.limit, query.offset).await?;
    Ok(ApiResponse::documents(&documents))
}

/// POST /categories - Create one category, expanding its children into a typed tree
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let document = state.categories.create(json_body(body)?).await?;
    Ok(ApiResponse::created(document.to_api_output()))
}

/// POST /categories/sync/create - Create an array of categories atomically
pub async fn bulk_create(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let documents = state.categories.bulk_create(json_body(body)?).await?;
    Ok(ApiResponse::created(
        crate::database::store::Document::to_api_output_array(&documents),
    ))
}

/// GET /categories/:id - Fetch one category
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    let document = state.categories.get(&id).await?;
    Ok(ApiResponse::document(&document))
}

/// PUT /categories/:id - Merge changes into a stored category
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let document = state.categories.update(&id, json_body(body)?).await?;
    Ok(ApiResponse::document(&document))
}

/// DELETE /categories/:id - Remove a category, returning what was stored
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    let document = state.categories.delete(&id).await?;
    Ok(ApiResponse::document(&document))
}
