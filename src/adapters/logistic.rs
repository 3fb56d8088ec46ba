//! Logistic-regression classifier loaded from a versioned JSON artifact.
//!
//! The artifact is the exported form of a fitted pipeline of standard
//! scaling for numeric columns, one-hot encoding for the relabeled
//! categorical columns, and a logistic regression on top:
//!
//! `p(disease) = sigmoid(intercept + Σ coef·(x - mean)/scale + Σ coef[level])`

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{category, ClassProbabilities, ColumnKind, FeatureSchema, Value};
use crate::ports::ProbabilisticClassifier;
use crate::CardioriskError;

/// `kind` tag expected in a logistic model artifact.
pub const LOGISTIC_KIND: &str = "logistic-regression";

const FORMAT_VERSION: u32 = 1;

/// What to do with a categorical level the model was not fitted on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownLevel {
    /// Fail the prediction.
    #[default]
    Error,
    /// Treat the level as all-zeros (no contribution).
    Ignore,
}

/// One additive term of the linear predictor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Term {
    /// Standardized numeric feature.
    Numeric {
        column: String,
        mean: f64,
        scale: f64,
        coef: f64,
    },
    /// One-hot encoded categorical feature; one coefficient per label.
    OneHot {
        column: String,
        levels: BTreeMap<String, f64>,
        #[serde(default)]
        handle_unknown: UnknownLevel,
    },
}

impl Term {
    fn column(&self) -> &str {
        match self {
            Self::Numeric { column, .. } | Self::OneHot { column, .. } => column,
        }
    }
}

/// Model parameters as persisted on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticArtifact {
    pub kind: String,
    pub format_version: u32,
    pub schema_version: u32,
    pub feature_names: Vec<String>,
    pub intercept: f64,
    pub terms: Vec<Term>,
}

impl LogisticArtifact {
    /// Structural checks against `schema`.
    ///
    /// # Errors
    /// Returns a description of the first problem found.
    pub fn validate(&self, schema: &FeatureSchema) -> Result<(), String> {
        if self.kind != LOGISTIC_KIND {
            return Err(format!(
                "Expected artifact kind {LOGISTIC_KIND:?}, got {:?}",
                self.kind
            ));
        }
        if self.format_version != FORMAT_VERSION {
            return Err(format!(
                "Unsupported format_version {} (expected {FORMAT_VERSION})",
                self.format_version
            ));
        }
        if self.schema_version != schema.version() {
            return Err(format!(
                "Artifact fitted on schema v{}, predictor uses v{}",
                self.schema_version,
                schema.version()
            ));
        }
        schema.check_feature_names(&self.feature_names)?;
        if !self.intercept.is_finite() {
            return Err("Intercept is not finite".into());
        }

        let mut seen = HashSet::new();
        for term in &self.terms {
            let name = term.column();
            let column = schema
                .column(name)
                .ok_or_else(|| format!("Term refers to unknown column {name:?}"))?;
            if !seen.insert(name) {
                return Err(format!("Column {name:?} has more than one term"));
            }

            match term {
                Term::Numeric {
                    mean, scale, coef, ..
                } => {
                    if column.kind != ColumnKind::Numeric {
                        return Err(format!("Numeric term on categorical column {name:?}"));
                    }
                    if !(mean.is_finite() && scale.is_finite() && coef.is_finite()) {
                        return Err(format!("Non-finite parameter for column {name:?}"));
                    }
                    if *scale == 0.0 {
                        return Err(format!("Zero scale for column {name:?}"));
                    }
                }
                Term::OneHot {
                    levels,
                    handle_unknown,
                    ..
                } => {
                    if column.kind != ColumnKind::Coded {
                        return Err(format!("One-hot term on numeric column {name:?}"));
                    }
                    if levels.is_empty() {
                        return Err(format!("One-hot term for {name:?} has no levels"));
                    }
                    if levels.values().any(|c| !c.is_finite()) {
                        return Err(format!("Non-finite level coefficient for column {name:?}"));
                    }
                    check_levels(name, levels, *handle_unknown)?;
                }
            }
        }
        Ok(())
    }
}

/// Levels must be labels the transformer emits for `column`. Under the
/// `error` policy every label also needs a level.
fn check_levels(
    column: &str,
    levels: &BTreeMap<String, f64>,
    handle_unknown: UnknownLevel,
) -> Result<(), String> {
    let map = category::for_column(column)
        .ok_or_else(|| format!("No category table for column {column:?}"))?;
    if let Some(level) = levels.keys().find(|l| !map.is_label(l)) {
        return Err(format!("Level {level:?} for column {column:?} is not a transformer label"));
    }
    if handle_unknown == UnknownLevel::Error {
        if let Some((_, label)) = map.entries().find(|(_, l)| !levels.contains_key(*l)) {
            return Err(format!(
                "Column {column:?} has no level for label {label:?} and handle_unknown is error"
            ));
        }
    }
    Ok(())
}

#[derive(Debug, Clone)]
enum CompiledTerm {
    Numeric {
        index: usize,
        mean: f64,
        scale: f64,
        coef: f64,
    },
    OneHot {
        index: usize,
        levels: BTreeMap<String, f64>,
        handle_unknown: UnknownLevel,
    },
}

/// Fitted logistic-regression classifier.
#[derive(Debug, Clone)]
pub struct LogisticModel {
    schema: FeatureSchema,
    intercept: f64,
    terms: Vec<CompiledTerm>,
}

impl LogisticModel {
    /// Build a model from validated artifact parameters.
    ///
    /// # Errors
    /// Returns a description of the structural problem if validation fails.
    pub fn from_artifact(
        artifact: LogisticArtifact,
        schema: FeatureSchema,
    ) -> Result<Self, String> {
        artifact.validate(&schema)?;

        let terms = artifact
            .terms
            .into_iter()
            .map(|term| -> Result<CompiledTerm, String> {
                let index = schema
                    .index_of(term.column())
                    .ok_or_else(|| format!("Term refers to unknown column {:?}", term.column()))?;
                Ok(match term {
                    Term::Numeric {
                        mean, scale, coef, ..
                    } => CompiledTerm::Numeric {
                        index,
                        mean,
                        scale,
                        coef,
                    },
                    Term::OneHot {
                        levels,
                        handle_unknown,
                        ..
                    } => CompiledTerm::OneHot {
                        index,
                        levels,
                        handle_unknown,
                    },
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            schema,
            intercept: artifact.intercept,
            terms,
        })
    }

    /// Decode and validate artifact bytes read from `path`.
    ///
    /// # Errors
    /// Returns `ArtifactLoad` if the bytes are not a valid artifact.
    pub fn from_json(path: &Path, bytes: &[u8], schema: FeatureSchema) -> crate::Result<Self> {
        let artifact: LogisticArtifact = serde_json::from_slice(bytes)
            .map_err(|e| CardioriskError::artifact(path, format!("Invalid model format: {e}")))?;
        let n_terms = artifact.terms.len();
        let model = Self::from_artifact(artifact, schema)
            .map_err(|reason| CardioriskError::artifact(path, reason))?;

        tracing::info!(
            "Loaded logistic model from {:?} (schema v{}, n_terms={})",
            path,
            schema.version(),
            n_terms
        );
        Ok(model)
    }

    /// Load an artifact file without signature verification.
    ///
    /// # Errors
    /// Returns `ArtifactLoad` if the file is missing, unreadable or invalid.
    pub fn from_file(path: &Path, schema: FeatureSchema) -> crate::Result<Self> {
        let bytes = super::integrity::read_bytes(path)?;
        Self::from_json(path, &bytes, schema)
    }

    /// Linear predictor (log-odds of disease) for one row.
    fn decision_function(&self, row: &[Value]) -> crate::Result<f64> {
        if row.len() != self.schema.width() {
            return Err(CardioriskError::Classifier(format!(
                "Expected {} features, got {}",
                self.schema.width(),
                row.len()
            )));
        }

        let mut z = self.intercept;
        for term in &self.terms {
            z += match term {
                CompiledTerm::Numeric {
                    index,
                    mean,
                    scale,
                    coef,
                } => {
                    let x = row[*index].as_number().ok_or_else(|| {
                        CardioriskError::Classifier(format!(
                            "Column {} expects a number, got {}",
                            self.column_name(*index),
                            row[*index]
                        ))
                    })?;
                    coef * (x - mean) / scale
                }
                CompiledTerm::OneHot {
                    index,
                    levels,
                    handle_unknown,
                } => {
                    let level = row[*index].as_label().and_then(|l| levels.get(l));
                    match (level, handle_unknown) {
                        (Some(coef), _) => *coef,
                        (None, UnknownLevel::Ignore) => 0.0,
                        (None, UnknownLevel::Error) => {
                            return Err(CardioriskError::Classifier(format!(
                                "Found unknown category {} in column {} during transform",
                                row[*index],
                                self.column_name(*index)
                            )));
                        }
                    }
                }
            };
        }
        Ok(z)
    }

    fn column_name(&self, index: usize) -> &'static str {
        self.schema.columns()[index].name
    }
}

/// Logistic function, stable for large |z|.
fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

impl ProbabilisticClassifier for LogisticModel {
    fn schema(&self) -> FeatureSchema {
        self.schema
    }

    fn predict_proba_row(&self, row: &[Value]) -> crate::Result<ClassProbabilities> {
        let z = self.decision_function(row)?;
        Ok(ClassProbabilities::from_disease(sigmoid(z)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Dataset, FeatureTransformer};

    fn feature_names() -> Vec<String> {
        FeatureSchema::heart_disease().names().map(String::from).collect()
    }

    fn artifact(intercept: f64, terms: Vec<Term>) -> LogisticArtifact {
        LogisticArtifact {
            kind: LOGISTIC_KIND.into(),
            format_version: 1,
            schema_version: 1,
            feature_names: feature_names(),
            intercept,
            terms,
        }
    }

    fn thal_term(handle_unknown: UnknownLevel) -> Term {
        Term::OneHot {
            column: "thal".into(),
            levels: BTreeMap::from([
                ("normal".to_string(), -1.0),
                ("fixed defect".to_string(), 0.5),
                ("reversable defect".to_string(), 1.0),
            ]),
            handle_unknown,
        }
    }

    fn labeled_row(thal: f64) -> Dataset {
        let row = [63.0, 1.0, 1.0, 145.0, 233.0, 1.0, 2.0, 150.0, 0.0, 2.3, 3.0, 0.0, thal]
            .into_iter()
            .map(Value::from)
            .collect();
        let raw = Dataset::from_rows(FeatureSchema::heart_disease(), vec![row]).expect("Valid row");
        FeatureTransformer::new().preprocess_x(&raw).expect("Should transform")
    }

    #[test]
    fn test_intercept_only_is_half() {
        let model =
            LogisticModel::from_artifact(artifact(0.0, vec![]), FeatureSchema::heart_disease())
                .expect("Valid artifact");
        let probs = model.predict_proba(&labeled_row(6.0)).expect("Should predict");
        assert_eq!(probs.len(), 1);
        assert!((probs[0].disease - 0.5).abs() < 1e-12);
        assert!((probs[0].no_disease - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_numeric_and_one_hot_terms() {
        let terms = vec![
            Term::Numeric {
                column: "age".into(),
                mean: 53.0,
                scale: 10.0,
                coef: 2.0,
            },
            thal_term(UnknownLevel::Error),
        ];
        let model =
            LogisticModel::from_artifact(artifact(-1.0, terms), FeatureSchema::heart_disease())
                .expect("Valid artifact");

        // z = -1 + 2*(63-53)/10 + 0.5 = 1.5
        let p = model.predict_proba(&labeled_row(6.0)).expect("Should predict")[0].disease;
        assert!((p - sigmoid(1.5)).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_level_error_policy() {
        let model = LogisticModel::from_artifact(
            artifact(0.0, vec![thal_term(UnknownLevel::Error)]),
            FeatureSchema::heart_disease(),
        )
        .expect("Valid artifact");
        let err = model
            .predict_proba(&labeled_row(99.0))
            .expect_err("thal=99 is not a fitted level");
        assert!(matches!(err, CardioriskError::Classifier(_)));
        assert!(err.to_string().contains("column thal"));
    }

    #[test]
    fn test_unknown_level_ignore_policy() {
        let model = LogisticModel::from_artifact(
            artifact(0.0, vec![thal_term(UnknownLevel::Ignore)]),
            FeatureSchema::heart_disease(),
        )
        .expect("Valid artifact");
        let p = model.predict_proba(&labeled_row(99.0)).expect("Should predict")[0].disease;
        assert!((p - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_validation_rejects_bad_artifacts() {
        let schema = FeatureSchema::heart_disease();

        let mut a = artifact(0.0, vec![]);
        a.kind = "random-forest".into();
        assert!(a.validate(&schema).unwrap_err().contains("kind"));

        let mut a = artifact(0.0, vec![]);
        a.format_version = 2;
        assert!(a.validate(&schema).is_err());

        let mut a = artifact(0.0, vec![]);
        a.schema_version = 7;
        assert!(a.validate(&schema).unwrap_err().contains("schema v7"));

        let mut a = artifact(0.0, vec![]);
        a.feature_names.reverse();
        assert!(a.validate(&schema).is_err());

        let a = artifact(
            0.0,
            vec![Term::Numeric {
                column: "thal".into(),
                mean: 0.0,
                scale: 1.0,
                coef: 1.0,
            }],
        );
        assert!(a.validate(&schema).unwrap_err().contains("categorical column"));

        let a = artifact(
            0.0,
            vec![Term::Numeric {
                column: "age".into(),
                mean: 0.0,
                scale: 0.0,
                coef: 1.0,
            }],
        );
        assert!(a.validate(&schema).unwrap_err().contains("Zero scale"));

        let a = artifact(
            0.0,
            vec![thal_term(UnknownLevel::Error), thal_term(UnknownLevel::Ignore)],
        );
        assert!(a.validate(&schema).unwrap_err().contains("more than one term"));

        let a = artifact(
            0.0,
            vec![Term::Numeric {
                column: "bmi".into(),
                mean: 0.0,
                scale: 1.0,
                coef: 1.0,
            }],
        );
        assert!(a.validate(&schema).unwrap_err().contains("unknown column"));
    }

    #[test]
    fn test_levels_must_match_transformer_labels() {
        let schema = FeatureSchema::heart_disease();
        let one_hot = |levels: &[&str], handle_unknown| Term::OneHot {
            column: "thal".into(),
            levels: levels.iter().map(|l| ((*l).to_string(), 0.1)).collect(),
            handle_unknown,
        };

        let misspelled = artifact(
            0.0,
            vec![one_hot(
                &["normal", "fixed defect", "reversible defect"],
                UnknownLevel::Error,
            )],
        );
        let err = misspelled.validate(&schema).expect_err("misspelled level");
        assert!(err.contains("\"reversible defect\""), "{err}");

        let partial = artifact(0.0, vec![one_hot(&["normal"], UnknownLevel::Error)]);
        let err = partial.validate(&schema).expect_err("labels without a level");
        assert!(err.contains("no level for label"), "{err}");

        // A subset is fine when unknown levels are ignored.
        let partial = artifact(0.0, vec![one_hot(&["normal"], UnknownLevel::Ignore)]);
        assert!(partial.validate(&schema).is_ok());
    }

    #[test]
    fn test_parse_json_artifact() {
        let json = serde_json::json!({
            "kind": "logistic-regression",
            "format_version": 1,
            "schema_version": 1,
            "feature_names": feature_names(),
            "intercept": 0.25,
            "terms": [
                {"type": "numeric", "column": "chol", "mean": 240.0, "scale": 50.0, "coef": 0.3},
                {
                    "type": "one_hot",
                    "column": "cp",
                    "levels": {"asymptomatic": 1.2},
                    "handle_unknown": "ignore"
                },
                {
                    "type": "one_hot",
                    "column": "restecg",
                    "levels": {
                        "normal": -0.1,
                        "wave abnormality": 0.2,
                        "ventricular hypertrophy": 0.1
                    }
                }
            ]
        });
        let bytes = serde_json::to_vec(&json).expect("serialize");
        let model = LogisticModel::from_json(
            Path::new("inline.json"),
            &bytes,
            FeatureSchema::heart_disease(),
        )
        .expect("Valid artifact");
        assert_eq!(model.terms.len(), 3);
        assert!(matches!(
            model.terms[2],
            CompiledTerm::OneHot {
                handle_unknown: UnknownLevel::Error,
                ..
            }
        ));
    }

    #[test]
    fn test_malformed_json_is_artifact_error() {
        let err = LogisticModel::from_json(
            Path::new("bad.json"),
            b"{not json",
            FeatureSchema::heart_disease(),
        )
        .expect_err("must fail");
        assert!(matches!(err, CardioriskError::ArtifactLoad { .. }));
    }

    #[test]
    fn test_load_bundled_model() {
        let model = LogisticModel::from_file(
            Path::new("models/log_model_v1.json"),
            FeatureSchema::heart_disease(),
        )
        .expect("Bundled model should load");
        let p = model.predict_proba(&labeled_row(6.0)).expect("Should predict")[0].disease;
        assert!((0.0..=1.0).contains(&p));
    }

    #[test]
    fn test_sigmoid_extremes() {
        assert!((sigmoid(0.0) - 0.5).abs() < f64::EPSILON);
        assert!(sigmoid(-800.0) >= 0.0);
        assert!(sigmoid(800.0) <= 1.0);
        assert!(sigmoid(-800.0).is_finite() && sigmoid(800.0).is_finite());
    }
}
