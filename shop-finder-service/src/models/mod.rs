//! Domain models for the shop finder service.

pub mod shop;

pub use shop::{parse_listing, ListingError, ShopRecord};
