//! Signed artifacts
//!
//! The first line of a signed artifact is `// @SignedSource (<hex>)`, where the
//! digest is the SHA-256 of the body (everything after that line) with every
//! manual section emptied. Edits inside manual sections therefore keep the
//! signature valid, while any other edit is detected as drift.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;
use strum::{Display, EnumString};

use super::manual;
use super::report::RunWarning;
use crate::error::{CodegenError, CodegenResult};

static HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^// @SignedSource \(([0-9a-fA-F]+)\)\s*$").unwrap());

/// Signature state of one artifact before regeneration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureState {
    NoPriorArtifact,
    /// The file exists but its first line is not a signature header.
    SignatureAbsent,
    SignatureValid,
    SignatureMismatch {
        /// Digest recomputed from the file body.
        expected: String,
        /// Digest recorded in the header.
        found: String,
    },
}

/// Override applied when a signature does not match.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RegenMode {
    #[default]
    Strict,
    /// Accept drift and keep manual sections.
    Merge,
    /// Accept drift and drop the drifted artifact's manual sections.
    Force,
}

impl RegenMode {
    /// Merge wins when both overrides are requested; the caller is told so.
    pub fn from_flags(merge: bool, force: bool) -> (Self, Option<RunWarning>) {
        match (merge, force) {
            (true, true) => (RegenMode::Merge, Some(RunWarning::BothOverridesRequested)),
            (true, false) => (RegenMode::Merge, None),
            (false, true) => (RegenMode::Force, None),
            (false, false) => (RegenMode::Strict, None),
        }
    }
}

/// Outcome of [`resolve`] for an artifact that may be regenerated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub carry_manual: bool,
    pub warning: Option<RunWarning>,
}

pub fn compute_string_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Digest of `body` with manual sections blanked.
pub fn signature_of(body: &str) -> String {
    compute_string_hash(&manual::blank(body))
}

/// Prefix `body` with its signature header.
pub fn sign(body: &str) -> String {
    format!("// @SignedSource ({})\n{body}", signature_of(body))
}

/// Split a signed text into its recorded digest and its body.
pub fn split_header(text: &str) -> Option<(&str, &str)> {
    let (first, body) = text.split_once('\n').unwrap_or((text, ""));
    HEADER
        .captures(first)
        .and_then(|caps| caps.get(1))
        .map(|digest| (digest.as_str(), body))
}

pub fn is_signed(text: &str) -> bool {
    split_header(text).is_some()
}

pub fn classify(prior: Option<&str>) -> SignatureState {
    let Some(text) = prior else {
        return SignatureState::NoPriorArtifact;
    };
    let Some((found, body)) = split_header(text) else {
        return SignatureState::SignatureAbsent;
    };
    let expected = signature_of(body);
    if expected.eq_ignore_ascii_case(found) {
        SignatureState::SignatureValid
    } else {
        SignatureState::SignatureMismatch {
            expected,
            found: found.to_string(),
        }
    }
}

/// Decide whether `path` may be regenerated and whether its manual blocks survive.
pub fn resolve(path: &Path, state: &SignatureState, mode: RegenMode) -> CodegenResult<Decision> {
    let decision = match state {
        SignatureState::NoPriorArtifact => Decision {
            carry_manual: false,
            warning: None,
        },
        SignatureState::SignatureAbsent => Decision {
            carry_manual: true,
            warning: Some(RunWarning::SignatureAbsent {
                path: path.to_path_buf(),
            }),
        },
        SignatureState::SignatureValid => Decision {
            carry_manual: true,
            warning: None,
        },
        SignatureState::SignatureMismatch { expected, found } => match mode {
            RegenMode::Strict => {
                return Err(CodegenError::SignatureMismatch {
                    path: path.to_path_buf(),
                    expected: expected.clone(),
                    found: found.clone(),
                });
            }
            RegenMode::Merge => Decision {
                carry_manual: true,
                warning: Some(RunWarning::DriftAccepted {
                    path: path.to_path_buf(),
                }),
            },
            RegenMode::Force => Decision {
                carry_manual: false,
                warning: Some(RunWarning::ManualSectionsDiscarded {
                    path: path.to_path_buf(),
                }),
            },
        },
    };
    Ok(decision)
}
