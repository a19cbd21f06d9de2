// src/handlers/heatmap.rs
use crate::handlers::error::ApiError;
use crate::models::PeriodKey;
use crate::services::dashboard::Dashboard;
use crate::services::format::DisplayMode;
use crate::services::store::LoadStatus;
use crate::services::views::heatmap_view;
use log::info;
use serde::Deserialize;
use std::sync::Arc;
use warp::reply::Json;
use warp::Rejection;

#[derive(Debug, Default, Deserialize)]
pub struct HeatmapQuery {
    pub period: Option<String>,
    pub display: Option<String>,
}

pub(crate) fn parse_period(raw: Option<&str>) -> Result<PeriodKey, ApiError> {
    match raw {
        None => Ok(PeriodKey::OneDay),
        Some(raw) => raw.parse().map_err(ApiError::bad_request),
    }
}

pub async fn get_heatmap(query: HeatmapQuery, dashboard: Arc<Dashboard>) -> Result<Json, Rejection> {
    let period = parse_period(query.period.as_deref()).map_err(ApiError::reject)?;
    let display = match query.display.as_deref() {
        None => DisplayMode::Pct,
        Some(raw) => raw
            .parse::<DisplayMode>()
            .map_err(|e| ApiError::bad_request(e).reject())?,
    };

    let snapshot = dashboard.heatmap.snapshot().await;
    if snapshot.status != LoadStatus::Ready {
        return Err(ApiError::unavailable("Heat map", snapshot.status).reject());
    }

    let view = heatmap_view(&snapshot, period, display);
    info!("Serving heat map: {} tiles for {}", view.tiles.len(), period);
    Ok(warp::reply::json(&view))
}
