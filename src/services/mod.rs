// src/services/mod.rs
pub mod aggregation;
pub mod colors;
pub mod csv_line;
pub mod dashboard;
pub mod drilldown;
pub mod feed;
pub mod format;
pub mod interaction;
pub mod market_data;
pub mod news;
pub mod records;
pub mod scheduler;
pub mod schema;
pub mod store;
pub mod synthetic;
pub mod views;
