use super::engine::SearchEngine;
use super::types::{RankedSearchRequest, SearchRequest, SearchResponse};
use crate::error::SearchError;
use axum::extract::rejection::JsonRejection;
use axum::{Extension, Json};
use std::sync::Arc;

fn parse_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, SearchError> {
    body.map(|Json(req)| req)
        .map_err(|rejection| SearchError::InvalidRequest(rejection.body_text()))
}

/// `POST /v1/search/basic`
pub async fn handle_exact_search(
    Extension(engine): Extension<Arc<SearchEngine>>,
    body: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, SearchError> {
    let req = parse_body(body)?;
    let employees = engine.exact(&req.search_key).await?;
    Ok(Json(SearchResponse { employees }))
}

/// `POST /v1/search/full`
pub async fn handle_ranked_search(
    Extension(engine): Extension<Arc<SearchEngine>>,
    body: Result<Json<RankedSearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, SearchError> {
    let req = parse_body(body)?;
    let employees = engine.ranked(&req.search_key, req.limit).await?;
    Ok(Json(SearchResponse { employees }))
}

/// `POST /v1/search/suggest`
pub async fn handle_suggest(
    Extension(engine): Extension<Arc<SearchEngine>>,
    body: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, SearchError> {
    let req = parse_body(body)?;
    let employees = engine.suggest(&req.search_key).await?;
    Ok(Json(SearchResponse { employees }))
}
