//! Artifact integrity: Ed25519-signed manifest verification.
//!
//! A model directory may carry `manifest.json` (SHA-256 hashes of the
//! artifact files) and `model.sig` (Ed25519 signature over the exact
//! manifest bytes). When a verifying key is configured, both must be present
//! and valid, and every artifact read afterwards is checked against the
//! manifest hash before it is parsed.
//!
//! Artifact bytes are read once and the same buffer is hashed and decoded,
//! so there is no window between verification and use.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use base64::Engine;
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::PredictorConfig;
use crate::CardioriskError;

/// Manifest filename inside a model directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Detached signature filename inside a model directory.
pub const SIGNATURE_FILE: &str = "model.sig";

const MANIFEST_VERSION: u32 = 1;

/// Signed list of artifact hashes.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SignedManifest {
    pub version: u32,
    /// Relative filename -> lowercase hex SHA-256.
    pub files: BTreeMap<String, String>,
}

impl SignedManifest {
    /// Check `bytes` against the hash recorded for `name`.
    ///
    /// # Errors
    /// Returns `ArtifactLoad` if `name` is not listed or the hash differs.
    pub fn check_file(&self, path: &Path, name: &str, bytes: &[u8]) -> crate::Result<()> {
        let expected = self.files.get(name).ok_or_else(|| {
            CardioriskError::artifact(path, format!("{name} is not listed in {MANIFEST_FILE}"))
        })?;
        if !constant_time_eq_str(&sha256_hex(bytes), &expected.to_ascii_lowercase()) {
            return Err(CardioriskError::artifact(
                path,
                format!("File hash mismatch for {name}"),
            ));
        }
        Ok(())
    }
}

/// Lowercase hex SHA-256 of `bytes`.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

// Constant-time compare for ASCII strings (used for SHA-256 hex digests).
fn constant_time_eq_str(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff: u8 = 0;
    for (x, y) in a.as_bytes().iter().zip(b.as_bytes().iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// Verifies model directories against an optional Ed25519 public key.
#[derive(Debug, Clone)]
pub struct ArtifactVerifier {
    key: Option<VerifyingKey>,
}

impl ArtifactVerifier {
    /// Verifier that accepts unsigned directories.
    #[must_use]
    pub fn unsigned() -> Self {
        Self { key: None }
    }

    /// Verifier that requires a valid signature from `key`.
    #[must_use]
    pub fn with_key(key: VerifyingKey) -> Self {
        Self { key: Some(key) }
    }

    /// Build a verifier from predictor configuration.
    ///
    /// # Errors
    /// Returns `Config` if the key is malformed, or if signed artifacts are
    /// required but no key is configured.
    pub fn from_config(config: &PredictorConfig) -> crate::Result<Self> {
        match &config.verifying_key_b64 {
            Some(b64) => Ok(Self::with_key(verifying_key_from_b64(b64)?)),
            None if config.require_signed_artifacts => Err(CardioriskError::Config(
                "Signed artifacts are required but no verifying key is configured".into(),
            )),
            None => Ok(Self::unsigned()),
        }
    }

    #[must_use]
    pub fn requires_signature(&self) -> bool {
        self.key.is_some()
    }

    /// Verify the manifest signature of `model_dir`.
    ///
    /// Returns `Ok(None)` when no key is configured (unsigned loading).
    ///
    /// # Errors
    /// Returns `ArtifactLoad` if the manifest or signature is missing,
    /// malformed, or does not verify.
    pub fn verify_dir(&self, model_dir: &Path) -> crate::Result<Option<SignedManifest>> {
        let sig_path = model_dir.join(SIGNATURE_FILE);
        let manifest_path = model_dir.join(MANIFEST_FILE);

        let Some(key) = &self.key else {
            if sig_path.exists() {
                tracing::warn!(
                    "Found {SIGNATURE_FILE} in {:?} but no verifying key is configured; \
                     loading unverified artifacts",
                    model_dir
                );
            } else {
                tracing::debug!("Loading unsigned artifacts from {:?}", model_dir);
            }
            return Ok(None);
        };

        if !sig_path.exists() || !manifest_path.exists() {
            tracing::error!(
                "Artifact signature not found at {:?}; a verifying key is configured",
                sig_path
            );
            return Err(CardioriskError::artifact(
                &sig_path,
                "Artifact signature required but manifest or signature is missing",
            ));
        }

        let sig_bytes = read_bytes(&sig_path)?;
        let sig_array: [u8; 64] = sig_bytes.as_slice().try_into().map_err(|_| {
            CardioriskError::artifact(&sig_path, "Invalid signature length (expected 64 bytes)")
        })?;
        let signature = Signature::from_bytes(&sig_array);

        let manifest_bytes = read_bytes(&manifest_path)?;
        key.verify(&manifest_bytes, &signature)
            .map_err(|_| CardioriskError::artifact(&manifest_path, "Invalid artifact signature"))?;

        let manifest: SignedManifest = serde_json::from_slice(&manifest_bytes).map_err(|e| {
            CardioriskError::artifact(&manifest_path, format!("Invalid manifest format: {e}"))
        })?;
        if manifest.version != MANIFEST_VERSION {
            return Err(CardioriskError::artifact(
                &manifest_path,
                format!("Unsupported manifest version: {}", manifest.version),
            ));
        }

        tracing::info!(
            "Artifact manifest signature verified ({} files)",
            manifest.files.len()
        );
        Ok(Some(manifest))
    }
}

impl Default for ArtifactVerifier {
    fn default() -> Self {
        Self::unsigned()
    }
}

/// Decode a base64 Ed25519 public key.
///
/// # Errors
/// Returns `Config` if the input is not 32 bytes of valid base64 key data.
pub fn verifying_key_from_b64(b64: &str) -> crate::Result<VerifyingKey> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(b64.trim())
        .map_err(|_| CardioriskError::Config("Invalid public key base64".into()))?;
    let pubkey: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
        CardioriskError::Config("Invalid public key length (expected 32 bytes)".into())
    })?;
    VerifyingKey::from_bytes(&pubkey)
        .map_err(|_| CardioriskError::Config("Invalid verifying key".into()))
}

/// Read a file, mapping failures to `ArtifactLoad` with the path attached.
pub(crate) fn read_bytes(path: &Path) -> crate::Result<Vec<u8>> {
    fs::read(path)
        .map_err(|e| CardioriskError::artifact(path, format!("missing or unreadable: {e}")))
}

/// Read one artifact from `model_dir`, checked against `manifest` when present.
pub(crate) fn read_artifact(
    model_dir: &Path,
    name: &str,
    manifest: Option<&SignedManifest>,
) -> crate::Result<(PathBuf, Vec<u8>)> {
    let path = model_dir.join(name);
    let bytes = read_bytes(&path)?;
    if let Some(manifest) = manifest {
        manifest.check_file(&path, name, &bytes)?;
    }
    Ok((path, bytes))
}
