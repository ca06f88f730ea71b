pub mod config;
pub mod error;

pub use config::{EngineConfig, VadTuning};
pub use error::EngineError;
