// src/handlers/error.rs
use crate::services::dashboard::SearchError;
use crate::services::interaction::InteractionError;
use crate::services::market_data::MarketDataError;
use crate::services::store::LoadStatus;
use std::fmt;
use warp::http::StatusCode;
use warp::reject::{Reject, Rejection};

#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        ApiError {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::new(StatusCode::CONFLICT, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn reject(self) -> Rejection {
        warp::reject::custom(self)
    }

    /// Widget has nothing to show yet.
    pub fn unavailable(widget: &str, status: LoadStatus) -> Self {
        let message = match status {
            LoadStatus::Empty => format!("{} data unavailable", widget),
            _ => format!("{} is loading", widget),
        };
        ApiError::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}
impl Reject for ApiError {}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::InvalidSymbol(_) => ApiError::bad_request(err.to_string()),
            SearchError::MarketData(MarketDataError::NotFound(_)) => {
                ApiError::not_found("Stock symbol not found")
            }
            SearchError::MarketData(inner) => ApiError::internal(inner.to_string()),
        }
    }
}

impl From<InteractionError> for ApiError {
    fn from(err: InteractionError) -> Self {
        ApiError::conflict(err.to_string())
    }
}
