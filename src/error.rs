//! Error taxonomy for schema code generation
//!
//! Every fatal condition of a regeneration run is a [`CodegenError`]. All of them
//! halt the batch; because artifacts are rendered in memory before anything is
//! written, the only variant that can surface after a file was touched is
//! [`CodegenError::ArtifactWrite`], and the transaction rolls the run back first.

use std::path::PathBuf;
use strum::{Display, IntoStaticStr};
use thiserror::Error;

use crate::codegen::manual::ManualSectionError;

pub type CodegenResult<T> = Result<T, CodegenError>;

// =============================================================================
// ERROR TYPES
// =============================================================================

#[derive(Debug, Error)]
pub enum CodegenError {
    /// The schema graph is inconsistent (unknown endpoint, duplicate names, ...).
    #[error("schema integrity error: {message}")]
    SchemaIntegrity { message: String },

    #[error("failed to load schema definition {path:?}: {message}")]
    SchemaLoad { path: PathBuf, message: String },

    #[error("cannot read artifact {path:?}: {source}")]
    ArtifactRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed manual section in {path:?}: {source}")]
    ManualSectionSyntax {
        path: PathBuf,
        #[source]
        source: ManualSectionError,
    },

    #[error(
        "invalid file signature in {path:?}\nExpected '{expected}' and got '{found}' \
         (rerun with --merge to keep manual sections or --force to overwrite)"
    )]
    SignatureMismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },

    #[error("failed to render template '{template}': {source}")]
    TemplateRender {
        template: String,
        #[source]
        source: tera::Error,
    },

    /// The composed text could not be parsed or formatted. `raw` is the text as it
    /// was handed to the formatter.
    #[error("failed to format generated artifact {artifact}: {message}")]
    TemplateFormat {
        artifact: String,
        message: String,
        raw: String,
    },

    #[error(
        "manual sections of {path:?} do not fit the regenerated template: \
         {placeholders} placeholder(s), {extracted} extracted block(s), {discarded} non-empty block(s) would be lost"
    )]
    ManualSectionShapeMismatch {
        path: PathBuf,
        placeholders: usize,
        extracted: usize,
        discarded: usize,
    },

    #[error("failed to write artifact {path:?}: {source}")]
    ArtifactWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {message}")]
    Config { message: String },
}

impl CodegenError {
    pub fn schema(message: impl Into<String>) -> Self {
        CodegenError::SchemaIntegrity {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        CodegenError::Config {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CodegenError::SchemaIntegrity { .. } | CodegenError::SchemaLoad { .. } => {
                ErrorKind::Schema
            }
            CodegenError::ArtifactRead { .. } | CodegenError::ArtifactWrite { .. } => ErrorKind::Io,
            CodegenError::ManualSectionSyntax { .. }
            | CodegenError::ManualSectionShapeMismatch { .. } => ErrorKind::ManualSection,
            CodegenError::SignatureMismatch { .. } => ErrorKind::Drift,
            CodegenError::TemplateRender { .. } | CodegenError::TemplateFormat { .. } => {
                ErrorKind::Template
            }
            CodegenError::Config { .. } => ErrorKind::Config,
        }
    }

    /// Raw pre-format text, when the failure happened while formatting.
    pub fn raw_text(&self) -> Option<&str> {
        match self {
            CodegenError::TemplateFormat { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

// =============================================================================
// ERROR KINDS
// =============================================================================

/// Coarse classification used for logging fields and the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
pub enum ErrorKind {
    #[strum(serialize = "schema_error")]
    Schema,
    #[strum(serialize = "io_error")]
    Io,
    #[strum(serialize = "manual_section_error")]
    ManualSection,
    #[strum(serialize = "signature_drift")]
    Drift,
    #[strum(serialize = "template_error")]
    Template,
    #[strum(serialize = "config_error")]
    Config,
}

impl ErrorKind {
    pub fn category(&self) -> &'static str {
        (*self).into()
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            ErrorKind::Config => 2,
            ErrorKind::Schema => 3,
            ErrorKind::Drift => 4,
            ErrorKind::ManualSection => 5,
            ErrorKind::Template => 6,
            ErrorKind::Io => 7,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_mismatch_message_names_overrides() {
        let err = CodegenError::SignatureMismatch {
            path: PathBuf::from("logic/user.rs"),
            expected: "aa".to_string(),
            found: "bb".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("Expected 'aa' and got 'bb'"));
        assert!(message.contains("--merge"));
        assert_eq!(err.kind(), ErrorKind::Drift);
        assert_eq!(err.kind().to_string(), "signature_drift");
        assert_eq!(err.kind().category(), "signature_drift");
    }

    #[test]
    fn test_exit_codes_are_non_zero_and_distinct() {
        let kinds = [
            ErrorKind::Schema,
            ErrorKind::Io,
            ErrorKind::ManualSection,
            ErrorKind::Drift,
            ErrorKind::Template,
            ErrorKind::Config,
        ];
        let mut codes: Vec<u8> = kinds.iter().map(ErrorKind::exit_code).collect();
        assert!(codes.iter().all(|code| *code != 0));
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), kinds.len());
    }

    #[test]
    fn test_raw_text_only_for_format_errors() {
        let err = CodegenError::TemplateFormat {
            artifact: "models/user_node.rs".to_string(),
            message: "expected `}`".to_string(),
            raw: "pub struct {".to_string(),
        };
        assert_eq!(err.raw_text(), Some("pub struct {"));
        assert_eq!(CodegenError::schema("x").raw_text(), None);
    }
}
