//! Tabular input data bound to a feature schema.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::schema::{ColumnKind, FeatureSchema};
use crate::CardioriskError;

/// A single cell: a raw number or a descriptive label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Label(String),
}

impl Value {
    /// Integer code carried by this value, if it is an integral number.
    #[must_use]
    pub fn as_code(&self) -> Option<i64> {
        match self {
            Self::Number(n) if n.is_finite() && n.fract() == 0.0 => Some(*n as i64),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Label(_) => None,
        }
    }

    #[must_use]
    pub fn as_label(&self) -> Option<&str> {
        match self {
            Self::Number(_) => None,
            Self::Label(s) => Some(s),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Label(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Label(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Label(s)
    }
}

/// Rows of fixed width, in insertion order, bound to a [`FeatureSchema`].
///
/// Construction validates every row, so a `Dataset` always has exactly
/// `schema.width()` values per row with kinds compatible with their columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    schema: FeatureSchema,
    rows: Vec<Vec<Value>>,
}

impl Dataset {
    /// Wrap raw rows positionally into the schema's columns.
    ///
    /// # Errors
    /// Returns `SchemaMismatch` if a row has the wrong number of values, a
    /// numeric column holds a label, or any number is not finite.
    pub fn from_rows(schema: FeatureSchema, rows: Vec<Vec<Value>>) -> crate::Result<Self> {
        for (i, row) in rows.iter().enumerate() {
            validate_row(&schema, i, row)?;
        }
        Ok(Self { schema, rows })
    }

    #[must_use]
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Value]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Cell at `(row, column name)`.
    #[must_use]
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let col = self.schema.index_of(column)?;
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Apply `f` to every cell of one column, in place.
    pub(crate) fn map_column<F>(mut self, name: &str, mut f: F) -> crate::Result<Self>
    where
        F: FnMut(&Value) -> crate::Result<Value>,
    {
        let col = self.schema.index_of(name).ok_or_else(|| {
            CardioriskError::SchemaMismatch(format!("Dataset has no column {name:?}"))
        })?;

        for row in &mut self.rows {
            row[col] = f(&row[col])?;
        }
        Ok(self)
    }
}

fn validate_row(schema: &FeatureSchema, index: usize, row: &[Value]) -> crate::Result<()> {
    if row.len() != schema.width() {
        return Err(CardioriskError::SchemaMismatch(format!(
            "Row {index}: expected {} values, got {}",
            schema.width(),
            row.len()
        )));
    }

    for (column, value) in schema.columns().iter().zip(row) {
        match (column.kind, value) {
            (_, Value::Number(n)) if !n.is_finite() => {
                return Err(CardioriskError::SchemaMismatch(format!(
                    "Row {index}: column {} holds non-finite number {n}",
                    column.name
                )));
            }
            (ColumnKind::Numeric, Value::Label(s)) => {
                return Err(CardioriskError::SchemaMismatch(format!(
                    "Row {index}: numeric column {} holds label {s:?}",
                    column.name
                )));
            }
            _ => {}
        }
    }
    Ok(())
}
