//! Shop records returned by the model and their shape validation.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use validator::{Validate, ValidationError};

/// One shop from the model's answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ShopRecord {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,

    #[validate(custom(function = "validate_latitude"))]
    pub latitude: f64,

    #[validate(custom(function = "validate_longitude"))]
    pub longitude: f64,

    #[validate(url(message = "link must be a valid URL"))]
    pub link: String,
}

fn validate_latitude(value: f64) -> Result<(), ValidationError> {
    coordinate_within(value, 90.0, "latitude must be within [-90, 90]")
}

fn validate_longitude(value: f64) -> Result<(), ValidationError> {
    coordinate_within(value, 180.0, "longitude must be within [-180, 180]")
}

fn coordinate_within(value: f64, bound: f64, message: &'static str) -> Result<(), ValidationError> {
    if value.is_finite() && value.abs() <= bound {
        return Ok(());
    }
    let mut err = ValidationError::new("range");
    err.message = Some(message.into());
    Err(err)
}

/// Why an extracted value is not a usable shop listing.
#[derive(Debug, Error)]
pub enum ListingError {
    #[error("expected a JSON array of shops, found {0}")]
    NotAList(&'static str),

    #[error("shop at index {index}: {reason}")]
    InvalidShop { index: usize, reason: String },
}

/// Check that `value` is an array of well-formed shop records.
///
/// The error text names the offending index and field and nothing else, so it
/// is safe to hand back to the caller.
pub fn parse_listing(value: &Value) -> Result<Vec<ShopRecord>, ListingError> {
    let items = value
        .as_array()
        .ok_or_else(|| ListingError::NotAList(json_type_name(value)))?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let record = ShopRecord::deserialize(item).map_err(|e| ListingError::InvalidShop {
                index,
                reason: e.to_string(),
            })?;
            record.validate().map_err(|e| ListingError::InvalidShop {
                index,
                reason: e.to_string(),
            })?;
            Ok(record)
        })
        .collect()
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
