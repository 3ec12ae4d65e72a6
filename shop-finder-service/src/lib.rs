//! shop-finder-service: asks a generative model for electrical and
//! electronics shops near a location and returns them as JSON.
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
