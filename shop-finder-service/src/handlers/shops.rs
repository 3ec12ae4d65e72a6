use crate::error::ShopFinderError;
use crate::models::parse_listing;
use crate::services::{extract_json, metrics};
use crate::startup::AppState;
use axum::{body::Bytes, extract::State, Json};
use serde::Deserialize;
use serde_json::Value;
use validator::{Validate, ValidationError};

/// Body of `POST /find_ee_shops`. Unknown fields are ignored.
#[derive(Debug, Deserialize, Validate)]
pub struct FindShopsRequest {
    #[validate(custom(function = "not_blank"))]
    pub location: String,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

impl FindShopsRequest {
    /// Decode regardless of content type; `None` covers every way the
    /// location can be absent.
    pub fn from_body(body: &[u8]) -> Option<Self> {
        let request: Self = serde_json::from_slice(body).ok()?;
        request.validate().ok()?;
        Some(request)
    }
}

/// `POST /find_ee_shops`: ask the model for shops near a location.
pub async fn find_ee_shops(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ShopFinderError> {
    let result = lookup(&state, &body).await;

    metrics::record_lookup(match &result {
        Ok(_) => "ok",
        Err(e) => e.outcome(),
    });

    result.map(Json)
}

async fn lookup(state: &AppState, body: &[u8]) -> Result<Value, ShopFinderError> {
    // 1. Validate request
    let request = FindShopsRequest::from_body(body).ok_or(ShopFinderError::MissingLocation)?;
    let location = request.location.trim();
    tracing::info!(location = %location, "Looking up electrical and electronics shops");

    // 2. Ask the model
    let reply = state
        .locator
        .fetch_listing(location)
        .await
        .ok_or(ShopFinderError::UpstreamUnavailable)?;

    // 3. Pull the JSON out of the reply
    let value = extract_json(&reply, state.extraction_mode).map_err(|e| {
        metrics::record_extraction_failure(e.kind());
        tracing::warn!(
            kind = e.kind(),
            error = %e,
            reply_len = reply.len(),
            "No usable JSON in model reply"
        );
        ShopFinderError::NoValidJson
    })?;

    // An empty list or object counts as no answer at all.
    if is_empty_collection(&value) {
        metrics::record_extraction_failure("empty");
        tracing::warn!("Model reply contained an empty JSON collection");
        return Err(ShopFinderError::NoValidJson);
    }

    // 4. Check the shape before handing it back
    let shops = parse_listing(&value).map_err(|e| {
        tracing::warn!(error = %e, "Model reply has the wrong shape");
        e
    })?;

    tracing::info!(shop_count = shops.len(), "Shop lookup succeeded");
    Ok(value)
}

fn is_empty_collection(value: &Value) -> bool {
    match value {
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}
