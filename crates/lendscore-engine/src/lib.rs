pub mod categorize;
pub mod commands;
pub mod config;
pub mod contracts;
pub mod date;
pub mod error;
pub mod income;
pub mod input;
pub mod metrics;
pub mod normalize;
pub mod pipeline;
pub mod scoring;
pub mod transaction;

pub use config::{ConfigHandle, EngineConfig};
pub use contracts::envelope::{FailureEnvelope, SuccessEnvelope};
pub use error::{EngineError, EngineResult};
pub use pipeline::{ScoreRequest, ScoringPipeline};

pub const API_VERSION: &str = env!("CARGO_PKG_VERSION");
