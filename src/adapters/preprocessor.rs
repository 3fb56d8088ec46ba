//! Persisted transformer descriptor.
//!
//! The lookup tables themselves are compiled into [`FeatureTransformer`];
//! the artifact records which tables the classifier was fitted with so a
//! model directory built against different tables is refused at load time.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{FeatureSchema, FeatureTransformer};
use crate::CardioriskError;

/// `kind` tag expected in a transformer artifact.
pub const TRANSFORMER_KIND: &str = "heart-disease-transformer";

const FORMAT_VERSION: u32 = 1;

/// Column -> (code as string -> label).
pub type CategoryTables = BTreeMap<String, BTreeMap<String, String>>;

/// Transformer artifact as persisted on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformerArtifact {
    pub kind: String,
    pub format_version: u32,
    pub schema_version: u32,
    pub categories: CategoryTables,
}

fn tables_of(transformer: &FeatureTransformer) -> CategoryTables {
    transformer
        .category_maps()
        .iter()
        .map(|map| {
            let entries = map
                .entries()
                .map(|(code, label)| (code.to_string(), label.to_string()))
                .collect();
            (map.column().to_string(), entries)
        })
        .collect()
}

impl TransformerArtifact {
    /// Describe `transformer` as a persistable artifact.
    #[must_use]
    pub fn describe(transformer: &FeatureTransformer, schema: &FeatureSchema) -> Self {
        Self {
            kind: TRANSFORMER_KIND.into(),
            format_version: FORMAT_VERSION,
            schema_version: schema.version(),
            categories: tables_of(transformer),
        }
    }

    /// Check that this artifact matches the built-in transformer.
    ///
    /// # Errors
    /// Returns a description of the first difference.
    pub fn validate(
        &self,
        transformer: &FeatureTransformer,
        schema: &FeatureSchema,
    ) -> Result<(), String> {
        if self.kind != TRANSFORMER_KIND {
            return Err(format!(
                "Expected artifact kind {TRANSFORMER_KIND:?}, got {:?}",
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

        let expected = tables_of(transformer);
        for column in expected.keys() {
            if !self.categories.contains_key(column) {
                return Err(format!("Missing category table for column {column:?}"));
            }
        }
        for (column, table) in &self.categories {
            match expected.get(column) {
                None => return Err(format!("Unexpected category table for column {column:?}")),
                Some(built_in) if built_in != table => {
                    return Err(format!(
                        "Category table for column {column:?} differs from the built-in table"
                    ));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

/// Decode and validate transformer artifact bytes read from `path`.
///
/// # Errors
/// Returns `ArtifactLoad` if the bytes are not a valid, compatible artifact.
pub fn load_transformer(
    path: &Path,
    bytes: &[u8],
    schema: &FeatureSchema,
    strict_categories: bool,
) -> crate::Result<FeatureTransformer> {
    let artifact: TransformerArtifact = serde_json::from_slice(bytes).map_err(|e| {
        CardioriskError::artifact(path, format!("Invalid transformer format: {e}"))
    })?;

    let transformer = FeatureTransformer::new().with_strict_categories(strict_categories);
    artifact
        .validate(&transformer, schema)
        .map_err(|reason| CardioriskError::artifact(path, reason))?;

    tracing::info!(
        "Loaded transformer from {:?} (strict_categories={})",
        path,
        strict_categories
    );
    Ok(transformer)
}
