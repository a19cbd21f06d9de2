// src/handlers/mod.rs
pub mod error;
pub mod heatmap;
pub mod indices;
pub mod news;
pub mod overlay;
pub mod quote;
pub mod sectors;
