//! Feature schema for heart-disease risk prediction.
//!
//! Based on the Cleveland heart-disease dataset (13 clinical attributes).
//! The column order is the order the classifier was fitted on.

use serde::{Deserialize, Serialize};

/// How a column's values are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Continuous or binary measurement, always a number.
    Numeric,
    /// Integer code standing in for a named category.
    Coded,
}

/// A single named column in a [`FeatureSchema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
}

impl Column {
    const fn numeric(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnKind::Numeric,
        }
    }

    const fn coded(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnKind::Coded,
        }
    }
}

/// Columns of the heart-disease schema, version 1.
/// Order: age, sex, cp, trestbps, chol, fbs, restecg, thalach, exang, oldpeak, slope, ca, thal
pub static HEART_DISEASE_COLUMNS: [Column; 13] = [
    Column::numeric("age"),
    Column::numeric("sex"),
    Column::coded("cp"),
    Column::numeric("trestbps"),
    Column::numeric("chol"),
    Column::numeric("fbs"),
    Column::coded("restecg"),
    Column::numeric("thalach"),
    Column::numeric("exang"),
    Column::numeric("oldpeak"),
    Column::numeric("slope"),
    Column::numeric("ca"),
    Column::coded("thal"),
];

/// An explicit, versioned column schema.
///
/// Artifacts record the schema version they were fitted against; the
/// predictor refuses artifacts whose version or column list differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSchema {
    version: u32,
    columns: &'static [Column],
}

impl FeatureSchema {
    /// The canonical 13-column heart-disease schema.
    #[must_use]
    pub fn heart_disease() -> Self {
        Self {
            version: 1,
            columns: &HEART_DISEASE_COLUMNS,
        }
    }

    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    #[must_use]
    pub fn columns(&self) -> &'static [Column] {
        self.columns
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Position of a column by name.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&'static Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Column names in schema order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        self.columns.iter().map(|c| c.name)
    }

    /// Check that an artifact's declared feature list matches this schema exactly.
    ///
    /// # Errors
    /// Returns a description of the first difference.
    pub fn check_feature_names(&self, names: &[String]) -> Result<(), String> {
        if names.len() != self.width() {
            return Err(format!(
                "Expected {} features, artifact declares {}",
                self.width(),
                names.len()
            ));
        }
        for (i, (declared, column)) in names.iter().zip(self.columns).enumerate() {
            if declared != column.name {
                return Err(format!(
                    "Feature {i} is {declared:?}, schema expects {:?}",
                    column.name
                ));
            }
        }
        Ok(())
    }
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self::heart_disease()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_order() {
        let schema = FeatureSchema::heart_disease();
        let names: Vec<_> = schema.names().collect();
        assert_eq!(
            names,
            vec![
                "age", "sex", "cp", "trestbps", "chol", "fbs", "restecg", "thalach", "exang",
                "oldpeak", "slope", "ca", "thal"
            ]
        );
        assert_eq!(schema.width(), 13);
        assert_eq!(schema.version(), 1);
    }

    #[test]
    fn test_coded_columns() {
        let schema = FeatureSchema::heart_disease();
        let coded: Vec<_> = schema
            .columns()
            .iter()
            .filter(|c| c.kind == ColumnKind::Coded)
            .map(|c| c.name)
            .collect();
        assert_eq!(coded, vec!["cp", "restecg", "thal"]);
        assert_eq!(schema.index_of("thal"), Some(12));
        assert_eq!(schema.index_of("missing"), None);
    }

    #[test]
    fn test_check_feature_names() {
        let schema = FeatureSchema::heart_disease();
        let mut names: Vec<String> = schema.names().map(String::from).collect();
        assert!(schema.check_feature_names(&names).is_ok());

        names.swap(0, 1);
        let err = schema.check_feature_names(&names).expect_err("order matters");
        assert!(err.contains("Feature 0"));

        names.pop();
        assert!(schema.check_feature_names(&names).is_err());
    }
}
