use super::queue::IndexQueue;
use super::types::QueueStats;
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Serialize, Deserialize)]
pub struct ClearTasksResponse {
    pub drained: usize,
}

/// `POST /v1/clear-tasks`: forgets every tracked indexing task. Running tasks are not stopped.
pub async fn handle_clear_tasks(
    Extension(queue): Extension<Arc<IndexQueue>>,
) -> (StatusCode, Json<ClearTasksResponse>) {
    let drained = queue.drain_all();
    (StatusCode::OK, Json(ClearTasksResponse { drained }))
}

/// `GET /v1/index/stats`
pub async fn handle_queue_stats(Extension(queue): Extension<Arc<IndexQueue>>) -> Json<QueueStats> {
    Json(queue.stats())
}
