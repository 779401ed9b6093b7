pub mod classifier;
pub mod error;
pub mod fetch;
pub mod registry;
pub mod units;

pub use classifier::IndustryClassifier;
pub use error::{Error, Result};
pub use fetch::{Page, PageFetcher};
pub use registry::registry;
