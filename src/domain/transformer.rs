//! Feature transformer: relabels coded categoricals before inference.
//!
//! The classifier is fitted on descriptive labels (`"typical angina"`), while
//! callers send the raw integer codes (`1`). The transformer bridges the two.

use super::category::{self, CategoryMap};
use super::dataset::{Dataset, Value};
use crate::CardioriskError;

/// Deterministic transformer over the three coded categorical columns.
///
/// By default unmapped codes pass through unchanged. With
/// `strict_categories` enabled they are rejected with
/// [`CardioriskError::UnmappedCategory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureTransformer {
    maps: [CategoryMap; 3],
    strict_categories: bool,
}

impl FeatureTransformer {
    /// Create a permissive transformer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            maps: category::ALL,
            strict_categories: false,
        }
    }

    /// Set whether unmapped codes are rejected.
    #[must_use]
    pub fn with_strict_categories(mut self, strict: bool) -> Self {
        self.strict_categories = strict;
        self
    }

    #[must_use]
    pub fn strict_categories(&self) -> bool {
        self.strict_categories
    }

    /// The lookup tables, one per coded column.
    #[must_use]
    pub fn category_maps(&self) -> &[CategoryMap; 3] {
        &self.maps
    }

    /// Label for `code` in `column`, if both are known.
    #[must_use]
    pub fn translate(&self, column: &str, code: i64) -> Option<&'static str> {
        self.maps
            .iter()
            .find(|m| m.column() == column)
            .and_then(|m| m.translate(code))
    }

    /// Replace coded categorical values with their labels.
    ///
    /// Returns a new dataset; `data` is not modified. Numeric columns and
    /// values that are already labels are carried over unchanged, so applying
    /// this twice yields the same result as applying it once.
    ///
    /// # Errors
    /// In strict mode, returns `UnmappedCategory` for the first code (or
    /// label) that is not in its column's table.
    pub fn preprocess_x(&self, data: &Dataset) -> crate::Result<Dataset> {
        self.transform(data.clone())
    }

    /// Same as [`FeatureTransformer::preprocess_x`], consuming `data`.
    ///
    /// # Errors
    /// See [`FeatureTransformer::preprocess_x`].
    pub fn transform(&self, data: Dataset) -> crate::Result<Dataset> {
        self.maps.iter().try_fold(data, |out, map| {
            out.map_column(map.column(), |value| self.relabel(map, value))
        })
    }

    /// Binarize raw severity targets: anything above zero becomes 1.
    #[must_use]
    pub fn preprocess_y(&self, targets: &[f64]) -> Vec<u8> {
        targets.iter().map(|&y| u8::from(y > 0.0)).collect()
    }

    fn relabel(&self, map: &CategoryMap, value: &Value) -> crate::Result<Value> {
        if let Some(label) = value.as_code().and_then(|code| map.translate(code)) {
            return Ok(Value::Label(label.to_string()));
        }

        let known_label = value.as_label().is_some_and(|l| map.is_label(l));
        if self.strict_categories && !known_label {
            return Err(CardioriskError::UnmappedCategory {
                column: map.column().to_string(),
                value: value.to_string(),
            });
        }

        Ok(value.clone())
    }
}

impl Default for FeatureTransformer {
    fn default() -> Self {
        Self::new()
    }
}
