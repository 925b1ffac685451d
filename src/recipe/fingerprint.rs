// src/recipe/fingerprint.rs

//! Configuration fingerprints for shared builds
//!
//! Two recipes with the same fingerprint would produce the same prefix, so
//! in shared mode the fingerprint names the prefix directory. Only the
//! inputs that change what gets built take part: the source URL, the
//! generic configure options, the autogen script, the patch command and
//! options, and the `environment` mapping.

use super::configuration::BuildConfiguration;
use crate::hash::{HashAlgorithm, Hasher};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Separates fields so adjacent values cannot run into each other
const FIELD_SEPARATOR: &[u8] = b"\0";

/// SHA-256 hex digest identifying a build configuration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint a resolved configuration
    pub fn compute(config: &BuildConfiguration) -> Self {
        Self::from_parts(
            &config.url,
            &config.extra_options,
            config.autogen.as_deref().unwrap_or(""),
            &config.patch_command,
            &config.patch_options,
            &config.environment,
        )
    }

    /// Fingerprint the raw inputs, in this exact order
    pub fn from_parts(
        url: &str,
        extra_options: &str,
        autogen: &str,
        patch_command: &str,
        patch_options: &str,
        environment: &BTreeMap<String, String>,
    ) -> Self {
        let mut hasher = Hasher::new(HashAlgorithm::Sha256);
        for field in [url, extra_options, autogen, patch_command, patch_options] {
            hasher.update(field.as_bytes());
            hasher.update(FIELD_SEPARATOR);
        }
        for (key, value) in environment {
            hasher.update(key.as_bytes());
            hasher.update(b"=");
            hasher.update(value.as_bytes());
            hasher.update(b"\n");
        }
        Self(hasher.finalize_hex())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
