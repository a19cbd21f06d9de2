// src/handlers/sectors.rs
use crate::handlers::error::ApiError;
use crate::handlers::heatmap::parse_period;
use crate::services::dashboard::Dashboard;
use crate::services::store::LoadStatus;
use crate::services::views::{sectors_view, SectorMode};
use log::info;
use serde::Deserialize;
use std::sync::Arc;
use warp::reply::Json;
use warp::Rejection;

#[derive(Debug, Default, Deserialize)]
pub struct SectorsQuery {
    pub period: Option<String>,
    pub mode: Option<String>,
}

fn parse_mode(raw: Option<&str>) -> Result<SectorMode, ApiError> {
    match raw.map(|m| m.trim().to_ascii_lowercase()).as_deref() {
        None | Some("heat") => Ok(SectorMode::Heat),
        Some("relvol") => Ok(SectorMode::RelVol),
        Some(other) => Err(ApiError::bad_request(format!("unknown mode '{}'", other))),
    }
}

pub async fn get_sectors(query: SectorsQuery, dashboard: Arc<Dashboard>) -> Result<Json, Rejection> {
    let period = parse_period(query.period.as_deref()).map_err(ApiError::reject)?;
    let mode = parse_mode(query.mode.as_deref()).map_err(ApiError::reject)?;

    let snapshot = dashboard.sectors.snapshot().await;
    if snapshot.status != LoadStatus::Ready {
        return Err(ApiError::unavailable("Sector heat map", snapshot.status).reject());
    }

    let view = sectors_view(&snapshot, period, mode);
    info!("Serving sector heat map: {} sectors", view.sectors.len());
    Ok(warp::reply::json(&view))
}
