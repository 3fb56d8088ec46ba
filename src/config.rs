//! Runtime configuration for the predictor.
//!
//! Values come from code (`PredictorConfig { .. }`) or from environment
//! variables via [`PredictorConfig::from_env`].

use crate::CardioriskError;

/// Reject unmapped categorical codes instead of passing them through.
pub const STRICT_CATEGORIES_ENV: &str = "CARDIORISK_STRICT_CATEGORIES";

/// Refuse to load artifacts that are not covered by a verified signature.
pub const REQUIRE_SIGNED_ARTIFACTS_ENV: &str = "CARDIORISK_REQUIRE_SIGNED_ARTIFACTS";

/// Base64 Ed25519 public key used to verify `manifest.json`.
pub const SIGNING_PUBKEY_ENV: &str = "CARDIORISK_SIGNING_PUBKEY_B64";

/// Path to a file holding the base64 public key (takes precedence).
pub const SIGNING_PUBKEY_FILE_ENV: &str = "CARDIORISK_SIGNING_PUBKEY_B64_FILE";

fn parse_bool(v: &str) -> bool {
    matches!(v.trim(), "1" | "true" | "TRUE" | "yes" | "YES")
}

/// Predictor settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PredictorConfig {
    /// Reject categorical codes missing from the lookup tables.
    pub strict_categories: bool,
    /// Base64-encoded Ed25519 verifying key for artifact signatures.
    pub verifying_key_b64: Option<String>,
    /// Fail construction unless artifacts carry a valid signature.
    pub require_signed_artifacts: bool,
}

impl PredictorConfig {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    /// Returns `Config` if the public key file is set but cannot be read.
    pub fn from_env() -> crate::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    /// Returns `Config` if the public key file is set but cannot be read.
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let strict_categories = lookup(STRICT_CATEGORIES_ENV).is_some_and(|v| parse_bool(&v));
        let require_signed_artifacts =
            lookup(REQUIRE_SIGNED_ARTIFACTS_ENV).is_some_and(|v| parse_bool(&v));

        let verifying_key_b64 = match lookup(SIGNING_PUBKEY_FILE_ENV) {
            Some(path) => {
                let b64 = std::fs::read_to_string(path.trim()).map_err(|e| {
                    CardioriskError::Config(format!("Failed reading pubkey file {path:?}: {e}"))
                })?;
                Some(b64.trim().to_string())
            }
            None => lookup(SIGNING_PUBKEY_ENV).map(|v| v.trim().to_string()),
        }
        .filter(|v| !v.is_empty());

        Ok(Self {
            strict_categories,
            verifying_key_b64,
            require_signed_artifacts,
        })
    }

    /// Enable or disable strict category checking.
    #[must_use]
    pub fn with_strict_categories(mut self, strict: bool) -> Self {
        self.strict_categories = strict;
        self
    }

    /// Verify artifacts against this base64 Ed25519 public key.
    #[must_use]
    pub fn with_verifying_key(mut self, b64: impl Into<String>) -> Self {
        self.verifying_key_b64 = Some(b64.into());
        self
    }
}
