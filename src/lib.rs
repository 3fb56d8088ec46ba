//! # cardiorisk
//!
//! Heart-disease risk inference from 13 clinical measurements.
//!
//! This crate provides:
//! - A deterministic feature transformer that relabels coded categoricals
//! - A risk predictor that loads a fitted classifier and transformer from
//!   versioned, optionally signed artifacts and formats risk percentages
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core types (feature schema, dataset, category maps, transformer)
//! - `ports`: Trait definitions for the classifier capability
//! - `adapters`: Concrete implementations (logistic model, artifact loading)
//! - `application`: The prediction use case
//! - `config` / `telemetry`: Runtime configuration and logging setup

use std::path::PathBuf;

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;

pub use application::{PredictOptions, RiskPredictor};
pub use config::PredictorConfig;
pub use domain::{format_risk, Dataset, FeatureSchema, FeatureTransformer, Value};

/// Result type for cardiorisk operations
pub type Result<T> = std::result::Result<T, CardioriskError>;

/// Main error type for cardiorisk
#[derive(Debug, thiserror::Error)]
pub enum CardioriskError {
    #[error("Failed to load artifact {path:?}: {reason}")]
    ArtifactLoad { path: PathBuf, reason: String },

    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("Unmapped category in column {column}: {value}")]
    UnmappedCategory { column: String, value: String },

    #[error("Classifier error: {0}")]
    Classifier(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CardioriskError {
    pub(crate) fn artifact(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ArtifactLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
