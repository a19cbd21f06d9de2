// src/handlers/quote.rs
use crate::handlers::error::ApiError;
use crate::services::dashboard::Dashboard;
use log::{error, info};
use std::sync::Arc;
use warp::reply::Json;
use warp::Rejection;

pub async fn get_quote(symbol: String, dashboard: Arc<Dashboard>) -> Result<Json, Rejection> {
    // warp hands path segments over still percent-encoded
    let symbol = symbol.replace("%5E", "^").replace("%5e", "^");

    match dashboard.search_quote(&symbol).await {
        Ok(quote) => {
            info!("Quote for {}: {}", quote.symbol, quote.price);
            Ok(warp::reply::json(&quote))
        }
        Err(e) => {
            error!("Quote search for {:?} failed: {}", symbol, e);
            Err(ApiError::from(e).reject())
        }
    }
}
