// src/handlers/indices.rs
use crate::handlers::error::ApiError;
use crate::services::dashboard::Dashboard;
use serde_json::json;
use std::sync::Arc;
use warp::reply::Json;
use warp::Rejection;

pub async fn get_indices(dashboard: Arc<Dashboard>) -> Result<Json, Rejection> {
    let snapshot = dashboard.indices.snapshot().await;
    match snapshot.data {
        Some(indices) => Ok(warp::reply::json(&json!({
            "indices": &*indices,
            "updated_at": snapshot.updated_at,
        }))),
        None => Err(ApiError::unavailable("Index strip", snapshot.status).reject()),
    }
}
