//! Errors surfaced by the `/find_ee_shops` endpoint.

use crate::models::ListingError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Terminal outcome of a failed lookup. The display text is the exact
/// `error` message returned to the caller.
#[derive(Debug, Error)]
pub enum ShopFinderError {
    #[error("Location not provided")]
    MissingLocation,

    #[error("Failed to retrieve data from Gemini.")]
    UpstreamUnavailable,

    #[error("No valid JSON found in the response.")]
    NoValidJson,

    #[error("Error processing data: {0}")]
    InvalidListing(#[from] ListingError),
}

impl ShopFinderError {
    pub fn status(&self) -> StatusCode {
        match self {
            ShopFinderError::MissingLocation => StatusCode::BAD_REQUEST,
            ShopFinderError::UpstreamUnavailable
            | ShopFinderError::NoValidJson
            | ShopFinderError::InvalidListing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Metric label for this outcome.
    pub fn outcome(&self) -> &'static str {
        match self {
            ShopFinderError::MissingLocation => "missing_location",
            ShopFinderError::UpstreamUnavailable => "upstream_unavailable",
            ShopFinderError::NoValidJson => "no_valid_json",
            ShopFinderError::InvalidListing(_) => "invalid_listing",
        }
    }
}

impl IntoResponse for ShopFinderError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
