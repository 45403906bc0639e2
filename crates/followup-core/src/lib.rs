//! Commitment intelligence engine: record meeting commitments into a
//! relational store plus a similarity index, flag execution risks, score
//! meeting health, and answer questions over the accumulated memory.

pub mod compose;
pub mod engine;
pub mod error;
pub mod index;
pub mod llm;
pub mod recorder;
pub mod risk;
pub mod score;
pub mod store;
pub mod types;

pub use engine::{Answer, Engine, HealthReport, IngestOutcome, Listing, RiskReport};
pub use error::{EngineError, Result};
