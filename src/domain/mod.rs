//! Domain layer: Core types and logic.
//!
//! Pure Rust types with no I/O: the feature schema, tabular data, the
//! categorical lookup tables and the transformer built on them.

pub mod category;
mod dataset;
mod risk;
mod schema;
mod transformer;

pub use category::CategoryMap;
pub use dataset::{Dataset, Value};
pub use risk::{format_risk, ClassProbabilities};
pub use schema::{Column, ColumnKind, FeatureSchema, HEART_DISEASE_COLUMNS};
pub use transformer::FeatureTransformer;
