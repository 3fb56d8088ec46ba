//! Risk predictor: end-to-end inference from raw rows to risk percentages.
//!
//! This service coordinates:
//! - Artifact loading (with optional signature verification)
//! - Schema alignment of raw rows
//! - Categorical relabeling
//! - Probability inference and formatting

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use crate::adapters::integrity::{read_artifact, ArtifactVerifier};
use crate::adapters::preprocessor::load_transformer;
use crate::adapters::{LogisticModel, MODEL_FILE, PREPROCESSOR_FILE};
use crate::config::PredictorConfig;
use crate::domain::{format_risk, Dataset, FeatureSchema, FeatureTransformer, Value};
use crate::ports::ProbabilisticClassifier;

/// Optional per-call settings.
///
/// Accepted for forward compatibility; no setting currently changes the
/// prediction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredictOptions {
    settings: BTreeMap<String, serde_json::Value>,
}

impl PredictOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.settings.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.settings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }
}

/// Heart-disease risk predictor.
///
/// Holds a fitted classifier and a transformer for its whole lifetime;
/// neither is mutated after construction, so a predictor can be shared
/// across threads (e.g. behind an `Arc`) without locking.
pub struct RiskPredictor {
    classifier: Arc<dyn ProbabilisticClassifier>,
    transformer: FeatureTransformer,
    schema: FeatureSchema,
}

impl std::fmt::Debug for RiskPredictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RiskPredictor")
            .field("schema_version", &self.schema.version())
            .field("transformer", &self.transformer)
            .finish_non_exhaustive()
    }
}

impl RiskPredictor {
    /// Compose a predictor from already-loaded collaborators.
    pub fn new(
        classifier: Arc<dyn ProbabilisticClassifier>,
        transformer: FeatureTransformer,
    ) -> Self {
        let schema = classifier.schema();
        Self {
            classifier,
            transformer,
            schema,
        }
    }

    /// Load a predictor from `model_dir` with default configuration.
    ///
    /// Reads `log_model_v1.json` and `preprocessor.json`.
    ///
    /// # Errors
    /// Returns `ArtifactLoad` if either artifact is missing, unreadable, or
    /// incompatible. No predictor is constructed in that case.
    pub fn from_path(model_dir: impl AsRef<Path>) -> crate::Result<Self> {
        Self::from_path_with_config(model_dir, &PredictorConfig::default())
    }

    /// Load a predictor from `model_dir`.
    ///
    /// When `config` carries a verifying key, the directory's signed
    /// manifest is verified first and both artifacts must match its hashes.
    ///
    /// # Errors
    /// Returns `Config` for an unusable configuration and `ArtifactLoad`
    /// for any artifact problem.
    pub fn from_path_with_config(
        model_dir: impl AsRef<Path>,
        config: &PredictorConfig,
    ) -> crate::Result<Self> {
        let model_dir = model_dir.as_ref();
        let schema = FeatureSchema::heart_disease();
        tracing::info!("Loading risk predictor artifacts from {:?}", model_dir);

        let verifier = ArtifactVerifier::from_config(config)?;
        let manifest = verifier.verify_dir(model_dir)?;

        let (model_path, model_bytes) = read_artifact(model_dir, MODEL_FILE, manifest.as_ref())?;
        let (prep_path, prep_bytes) =
            read_artifact(model_dir, PREPROCESSOR_FILE, manifest.as_ref())?;

        let classifier = LogisticModel::from_json(&model_path, &model_bytes, schema)?;
        let transformer =
            load_transformer(&prep_path, &prep_bytes, &schema, config.strict_categories)?;

        tracing::info!(
            "Risk predictor ready (schema v{}, signed={}, strict_categories={})",
            schema.version(),
            manifest.is_some(),
            config.strict_categories
        );
        Ok(Self::new(Arc::new(classifier), transformer))
    }

    #[must_use]
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    #[must_use]
    pub fn transformer(&self) -> &FeatureTransformer {
        &self.transformer
    }

    /// Disease probabilities for each row, in input order.
    ///
    /// # Errors
    /// Returns `SchemaMismatch` for malformed rows, `UnmappedCategory` in
    /// strict mode, or the classifier's error. One bad row fails the batch.
    pub fn predict_proba(&self, instances: &[Vec<Value>]) -> crate::Result<Vec<f64>> {
        tracing::debug!("Scoring batch of {} rows", instances.len());

        let data = Dataset::from_rows(self.schema, instances.to_vec())?;
        let prepared = self.transformer.transform(data)?;
        let distributions = self.classifier.predict_proba(&prepared)?;

        Ok(distributions.iter().map(|d| d.positive()).collect())
    }

    /// Risk percentage strings for each row, in input order.
    ///
    /// Each string is the disease probability rounded to two decimals,
    /// scaled to a percentage, e.g. `"57.0%"`.
    ///
    /// # Errors
    /// Same as [`RiskPredictor::predict_proba`].
    pub fn predict(
        &self,
        instances: &[Vec<Value>],
        options: &PredictOptions,
    ) -> crate::Result<Vec<String>> {
        if !options.is_empty() {
            tracing::debug!("Ignoring {} predict options", options.len());
        }

        let probabilities = self.predict_proba(instances)?;
        Ok(probabilities.into_iter().map(format_risk).collect())
    }
}
