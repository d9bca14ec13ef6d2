//! Run report: what happened to every artifact, plus the warnings raised.

use std::fmt;
use std::path::{Path, PathBuf};
use strum::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ArtifactOutcome {
    Created,
    Updated,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactReport {
    /// Path relative to the destination root.
    pub path: PathBuf,
    pub outcome: ArtifactOutcome,
    pub signed: bool,
}

/// Non-fatal conditions. Each one is logged when raised and kept in the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunWarning {
    BothOverridesRequested,
    SignatureAbsent {
        path: PathBuf,
    },
    DriftAccepted {
        path: PathBuf,
    },
    ManualSectionsDiscarded {
        path: PathBuf,
    },
    ShapeMismatch {
        path: PathBuf,
        placeholders: usize,
        extracted: usize,
        discarded: usize,
    },
    OrphanedArtifact {
        path: PathBuf,
    },
}

impl RunWarning {
    pub fn path(&self) -> Option<&Path> {
        match self {
            RunWarning::BothOverridesRequested => None,
            RunWarning::SignatureAbsent { path }
            | RunWarning::DriftAccepted { path }
            | RunWarning::ManualSectionsDiscarded { path }
            | RunWarning::ShapeMismatch { path, .. }
            | RunWarning::OrphanedArtifact { path } => Some(path),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            RunWarning::BothOverridesRequested => "both_overrides",
            RunWarning::SignatureAbsent { .. } => "signature_absent",
            RunWarning::DriftAccepted { .. } => "drift_accepted",
            RunWarning::ManualSectionsDiscarded { .. } => "manual_discarded",
            RunWarning::ShapeMismatch { .. } => "shape_mismatch",
            RunWarning::OrphanedArtifact { .. } => "orphaned_artifact",
        }
    }

    pub(crate) fn emit(&self) {
        tracing::warn!(code = self.code(), "{}", self);
    }
}

impl fmt::Display for RunWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunWarning::BothOverridesRequested => {
                f.write_str("both --merge and --force were given; merging")
            }
            RunWarning::SignatureAbsent { path } => {
                write!(f, "no signature found in {}, so overwriting", path.display())
            }
            RunWarning::DriftAccepted { path } => write!(
                f,
                "{} was edited outside its manual sections; merging anyway",
                path.display()
            ),
            RunWarning::ManualSectionsDiscarded { path } => write!(
                f,
                "{} was edited outside its manual sections; forcing a full overwrite",
                path.display()
            ),
            RunWarning::ShapeMismatch {
                path,
                placeholders,
                extracted,
                discarded,
            } => write!(
                f,
                "{}: {extracted} manual block(s) for {placeholders} placeholder(s), {discarded} discarded",
                path.display()
            ),
            RunWarning::OrphanedArtifact { path } => write!(
                f,
                "{} is signed but no longer generated; leaving it in place",
                path.display()
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub artifacts: Vec<ArtifactReport>,
    pub warnings: Vec<RunWarning>,
    pub dry_run: bool,
}

impl RunReport {
    pub fn outcome(&self, path: impl AsRef<Path>) -> Option<ArtifactOutcome> {
        let path = path.as_ref();
        self.artifacts
            .iter()
            .find(|artifact| artifact.path == path)
            .map(|artifact| artifact.outcome)
    }

    /// Artifacts that were (or, in a dry run, would be) written.
    pub fn written(&self) -> impl Iterator<Item = &ArtifactReport> {
        self.artifacts
            .iter()
            .filter(|artifact| artifact.outcome != ArtifactOutcome::Unchanged)
    }

    pub fn has_warning(&self, code: &str) -> bool {
        self.warnings.iter().any(|warning| warning.code() == code)
    }

    /// Lines printed after a successful run: one `Generated <path>` per written
    /// artifact, then the dry-run note when nothing was committed.
    pub fn summary(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .written()
            .map(|artifact| format!("Generated {}", artifact.path.display()))
            .collect();
        if self.dry_run {
            lines.push("Dry run: nothing was written".to_string());
        }
        lines
    }
}
