// src/routes.rs
use crate::handlers::error::ApiError;
use crate::handlers::heatmap::{get_heatmap, HeatmapQuery};
use crate::handlers::indices::get_indices;
use crate::handlers::news::get_news;
use crate::handlers::overlay::{back, backdrop_click, get_overlay, open_sector, open_stock};
use crate::handlers::quote::get_quote;
use crate::handlers::sectors::{get_sectors, SectorsQuery};
use crate::services::dashboard::Dashboard;
use log::info;
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::reject::Rejection;
use warp::{Filter, Reply};

const MAX_BODY_BYTES: u64 = 16 * 1024;

pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let code;
    let message: String;

    if err.is_not_found() {
        code = StatusCode::NOT_FOUND;
        message = "Not Found".to_string();
    } else if let Some(api_error) = err.find::<ApiError>() {
        code = api_error.status;
        message = api_error.message.clone();
    } else if let Some(body_error) = err.find::<warp::filters::body::BodyDeserializeError>() {
        code = StatusCode::BAD_REQUEST;
        message = body_error.to_string();
    } else if err.find::<warp::reject::InvalidQuery>().is_some() {
        code = StatusCode::BAD_REQUEST;
        message = "Invalid query string".to_string();
    } else if err.find::<warp::reject::LengthRequired>().is_some() {
        code = StatusCode::LENGTH_REQUIRED;
        message = "Content-Length required".to_string();
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        code = StatusCode::PAYLOAD_TOO_LARGE;
        message = "Payload too large".to_string();
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        code = StatusCode::METHOD_NOT_ALLOWED;
        message = "Method Not Allowed".to_string();
    } else {
        code = StatusCode::INTERNAL_SERVER_ERROR;
        message = "Internal Server Error".to_string();
    }

    Ok(warp::reply::with_status(
        warp::reply::json(&serde_json::json!({
            "error": message,
        })),
        code,
    ))
}

pub fn routes(dashboard: Arc<Dashboard>) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    info!("Configuring routes...");

    let dashboard_filter = warp::any().map(move || dashboard.clone());
    let json_body = warp::body::content_length_limit(MAX_BODY_BYTES);

    let heatmap_route = warp::path!("api" / "v1" / "heatmap")
        .and(warp::get())
        .and(warp::query::<HeatmapQuery>())
        .and(dashboard_filter.clone())
        .and_then(get_heatmap);

    let sectors_route = warp::path!("api" / "v1" / "sectors")
        .and(warp::get())
        .and(warp::query::<SectorsQuery>())
        .and(dashboard_filter.clone())
        .and_then(get_sectors);

    let overlay_route = warp::path!("api" / "v1" / "overlay")
        .and(warp::get())
        .and(dashboard_filter.clone())
        .and_then(get_overlay);

    let open_sector_route = warp::path!("api" / "v1" / "overlay" / "sector")
        .and(warp::post())
        .and(json_body)
        .and(warp::body::json())
        .and(dashboard_filter.clone())
        .and_then(open_sector);

    let open_stock_route = warp::path!("api" / "v1" / "overlay" / "stock")
        .and(warp::post())
        .and(json_body)
        .and(warp::body::json())
        .and(dashboard_filter.clone())
        .and_then(open_stock);

    let back_route = warp::path!("api" / "v1" / "overlay" / "back")
        .and(warp::post())
        .and(dashboard_filter.clone())
        .and_then(back);

    let backdrop_route = warp::path!("api" / "v1" / "overlay" / "backdrop")
        .and(warp::post())
        .and(json_body)
        .and(warp::body::json())
        .and(dashboard_filter.clone())
        .and_then(backdrop_click);

    let quote_route = warp::path!("api" / "v1" / "quote" / String)
        .and(warp::get())
        .and(dashboard_filter.clone())
        .and_then(get_quote);

    let indices_route = warp::path!("api" / "v1" / "indices")
        .and(warp::get())
        .and(dashboard_filter.clone())
        .and_then(get_indices);

    let news_route = warp::path!("api" / "v1" / "news")
        .and(warp::get())
        .and(dashboard_filter.clone())
        .and_then(get_news);

    info!("All routes configured successfully.");

    heatmap_route
        .or(sectors_route)
        .or(overlay_route)
        .or(open_sector_route)
        .or(open_stock_route)
        .or(back_route)
        .or(backdrop_route)
        .or(quote_route)
        .or(indices_route)
        .or(news_route)
        .recover(handle_rejection)
}
