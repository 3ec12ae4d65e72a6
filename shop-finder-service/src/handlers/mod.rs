//! HTTP handlers for the shop finder service.

pub mod health;
pub mod metrics;
pub mod shops;
