//! Ports layer: Trait definitions for external collaborators.
//!
//! Following Hexagonal Architecture, these traits define the boundary
//! between the prediction use case and the fitted model artifacts.

mod classifier;

pub use classifier::ProbabilisticClassifier;
