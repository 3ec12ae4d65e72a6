//! Prompt sent to the generative model for every shop lookup.

use serde_json::{json, Value};

/// Fixed instruction; the caller's location is appended verbatim.
pub const SHOP_FINDER_PROMPT: &str = concat!(
    "As an expert in location-based services and geospatial data, provide a precise and ",
    "accurate list of electrical and electronics shops near the location given below. ",
    "Return the answer as JSON. Each entry must include the shop's name, latitude, ",
    "longitude, and a direct Google Maps link for navigation, following this structure: ",
    "[{\"name\": \"Shop 1\", \"latitude\": 0.0, \"longitude\": 0.0, ",
    "\"link\": \"https://www.google.com/maps/...\"}, ...]. ",
    "Respond with the JSON data only, without any explanations or additional text. ",
    "Location: ",
);

pub fn compose_prompt(location: &str) -> String {
    format!("{}{}", SHOP_FINDER_PROMPT, location)
}

/// Response schema for schema-constrained generation: an array of shop records.
pub fn shop_list_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "name": { "type": "STRING" },
                "latitude": { "type": "NUMBER" },
                "longitude": { "type": "NUMBER" },
                "link": { "type": "STRING" }
            },
            "required": ["name", "latitude", "longitude", "link"],
            "propertyOrdering": ["name", "latitude", "longitude", "link"]
        }
    })
}
