pub mod extractor;
pub mod metrics;
pub mod prompt;
pub mod providers;
pub mod shop_locator;

pub use extractor::{extract_json, ExtractionError, ExtractionMode};
pub use metrics::{get_metrics, init_metrics};
pub use shop_locator::ShopLocator;
