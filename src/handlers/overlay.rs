// src/handlers/overlay.rs
use crate::handlers::error::ApiError;
use crate::models::{Geometry, Point};
use crate::services::dashboard::Dashboard;
use crate::services::views::OverlayView;
use chrono::Utc;
use log::{info, warn};
use serde::Deserialize;
use std::sync::Arc;
use warp::reply::Json;
use warp::Rejection;

#[derive(Debug, Deserialize)]
pub struct OpenSectorRequest {
    pub sector: String,
    pub origin: Geometry,
    /// Origin is made relative to this rectangle when given.
    pub container: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
pub struct OpenStockRequest {
    pub symbol: String,
    pub origin: Geometry,
    pub container: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
pub struct BackdropRequest {
    pub point: Point,
    pub content: Geometry,
}

fn relative(origin: Geometry, container: Option<Geometry>) -> Geometry {
    match container {
        Some(container) => origin.relative_to(&container),
        None => origin,
    }
}

pub async fn get_overlay(dashboard: Arc<Dashboard>) -> Result<Json, Rejection> {
    let state = dashboard.drilldown.state().await;
    Ok(warp::reply::json(&OverlayView::new(state, Utc::now())))
}

pub async fn open_sector(body: OpenSectorRequest, dashboard: Arc<Dashboard>) -> Result<Json, Rejection> {
    if !dashboard.has_sector(&body.sector).await {
        warn!("Unknown sector requested: {}", body.sector);
        return Err(ApiError::not_found(format!("Unknown sector: {}", body.sector)).reject());
    }

    let state = dashboard
        .drilldown
        .open_sector(&body.sector, relative(body.origin, body.container))
        .await
        .map_err(|e| ApiError::from(e).reject())?;
    Ok(warp::reply::json(&OverlayView::new(state, Utc::now())))
}

pub async fn open_stock(body: OpenStockRequest, dashboard: Arc<Dashboard>) -> Result<Json, Rejection> {
    let stock = match dashboard.find_stock(body.symbol.trim()).await {
        Some(stock) => stock,
        None => {
            warn!("Unknown symbol requested: {}", body.symbol);
            return Err(ApiError::not_found(format!("Unknown symbol: {}", body.symbol)).reject());
        }
    };

    info!("Opening stock overlay for {}", stock.symbol);
    let state = dashboard
        .drilldown
        .open_stock(stock, relative(body.origin, body.container))
        .await;
    Ok(warp::reply::json(&OverlayView::new(state, Utc::now())))
}

pub async fn back(dashboard: Arc<Dashboard>) -> Result<Json, Rejection> {
    let state = dashboard.drilldown.back().await;
    Ok(warp::reply::json(&OverlayView::new(state, Utc::now())))
}

pub async fn backdrop_click(body: BackdropRequest, dashboard: Arc<Dashboard>) -> Result<Json, Rejection> {
    let state = dashboard
        .drilldown
        .backdrop_click(body.point, body.content)
        .await;
    Ok(warp::reply::json(&OverlayView::new(state, Utc::now())))
}
