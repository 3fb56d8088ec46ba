//! Adapters layer: Concrete implementations of ports.
//!
//! These modules contain the artifact-facing code:
//! - `logistic`: the logistic-regression classifier and its JSON artifact
//! - `preprocessor`: the persisted transformer descriptor
//! - `integrity`: Ed25519-signed manifest verification

pub mod integrity;
pub mod logistic;
pub mod preprocessor;

pub use integrity::ArtifactVerifier;
pub use logistic::LogisticModel;

/// Classifier artifact filename inside a model directory.
pub const MODEL_FILE: &str = "log_model_v1.json";

/// Transformer artifact filename inside a model directory.
pub const PREPROCESSOR_FILE: &str = "preprocessor.json";
