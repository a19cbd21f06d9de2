use dotenv::dotenv;
use log::{info, warn};
use market_heatmap::config::AppConfig;
use market_heatmap::routes;
use market_heatmap::services::dashboard::Dashboard;
use market_heatmap::services::market_data::FinnhubClient;
use market_heatmap::services::scheduler::Scheduler;
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use warp::Filter;

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::init();
    info!("Logger initialized. Starting the application...");

    if env::var("PORT").is_err() {
        warn!("$PORT not set, defaulting to 3030");
    }
    let config = AppConfig::from_env();
    info!("Using PORT: {}", config.port);

    let market_data = Arc::new(FinnhubClient::new(
        config.finnhub_base_url.clone(),
        config.finnhub_api_key.clone(),
    ));

    let addr: SocketAddr = ([0, 0, 0, 0], config.port).into();
    info!("Will bind to: {}", addr);

    let dashboard = Dashboard::new(config, market_data);

    // The guards keep the refresh schedules alive for the life of the server
    let scheduler = Scheduler::new();
    let _schedules = dashboard.start(&scheduler);

    let cors = warp::cors()
        .allow_any_origin()
        .allow_header("content-type")
        .allow_methods(vec!["GET", "POST"]);

    let api = routes::routes(dashboard).with(cors);
    info!("Routes configured successfully with CORS.");

    info!("Starting server on {}", addr);
    warp::serve(api).run(addr).await;
}
