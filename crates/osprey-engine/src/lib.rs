pub mod config;
pub mod error;
pub mod metrics;
pub mod orchestrator;
pub mod recommend;

pub use config::EngineConfig;
pub use error::{Error, Result};
pub use orchestrator::Orchestrator;
