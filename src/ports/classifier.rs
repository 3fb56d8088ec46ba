//! Classifier port: the capability a fitted model artifact must provide.
//!
//! This trait abstracts the concrete model (logistic regression today) from
//! the prediction use case.

use crate::domain::{ClassProbabilities, Dataset, FeatureSchema, Value};

/// A fitted binary classifier exposing class-probability inference.
///
/// Implementations are read-only after construction and must be safe to
/// share across threads.
pub trait ProbabilisticClassifier: Send + Sync {
    /// Schema the classifier was fitted on.
    fn schema(&self) -> FeatureSchema;

    /// Class probabilities for one preprocessed row.
    ///
    /// # Errors
    /// Returns `CardioriskError::Classifier` if a value cannot be used
    /// (e.g. an unexpected category level).
    fn predict_proba_row(&self, row: &[Value]) -> crate::Result<ClassProbabilities>;

    /// Class probabilities for every row of a preprocessed dataset, in order.
    ///
    /// # Errors
    /// Fails on the first row that cannot be scored; no partial results.
    fn predict_proba(&self, data: &Dataset) -> crate::Result<Vec<ClassProbabilities>> {
        data.rows().map(|row| self.predict_proba_row(row)).collect()
    }
}
