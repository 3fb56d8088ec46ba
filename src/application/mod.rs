//! Application layer: Use cases and services.
//!
//! This module orchestrates domain logic with ports to implement
//! risk prediction.

mod predictor;

pub use predictor::{PredictOptions, RiskPredictor};
