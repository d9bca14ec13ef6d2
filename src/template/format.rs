//! Source formatters applied to composed artifacts before signing.
//!
//! The signature covers formatted text, so a formatter must be deterministic
//! and idempotent, and must leave manual-section interiors alone.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::process::Command;
use strum::Display;
use tempfile::NamedTempFile;

use crate::codegen::manual;

pub trait SourceFormatter: Send + Sync {
    fn name(&self) -> &'static str;

    /// Format `text`; syntactically invalid input is an error.
    fn format(&self, text: &str) -> Result<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FormatterKind {
    /// Built-in line normalizer; needs no external tools.
    #[default]
    Canonical,
    /// Pipe through the `rustfmt` binary.
    Rustfmt,
}

impl FormatterKind {
    pub fn build(self) -> Box<dyn SourceFormatter> {
        match self {
            FormatterKind::Canonical => Box::new(CanonicalFormatter),
            FormatterKind::Rustfmt => Box::new(RustfmtFormatter::default()),
        }
    }
}

// =============================================================================
// CANONICAL
// =============================================================================

/// Parses the text as a Rust file, then normalizes blank lines and trailing
/// whitespace outside manual sections.
#[derive(Debug, Clone, Copy, Default)]
pub struct CanonicalFormatter;

impl SourceFormatter for CanonicalFormatter {
    fn name(&self) -> &'static str {
        "canonical"
    }

    fn format(&self, text: &str) -> Result<String> {
        syn::parse_file(text).map_err(|e| anyhow!("{e}"))?;
        Ok(normalize(text))
    }
}

fn normalize(text: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    // Lines below this index belong to manual sections or their markers.
    let mut protected = 0;
    let mut in_manual = false;

    for raw in text.lines() {
        if in_manual {
            if manual::closes_section(raw) {
                in_manual = false;
                out.push(raw.trim_end());
            } else {
                out.push(raw);
            }
            protected = out.len();
            continue;
        }

        let line = raw.trim_end();
        if manual::opens_section(line) {
            in_manual = true;
            out.push(line);
            protected = out.len();
            continue;
        }

        if line.is_empty() {
            let skip = match out.last() {
                None => true,
                Some(prev) => prev.is_empty() || prev.ends_with('{'),
            };
            if !skip {
                out.push(line);
            }
            continue;
        }

        if line.trim_start().starts_with('}') {
            while out.len() > protected && out.last().is_some_and(|prev| prev.is_empty()) {
                out.pop();
            }
        }
        out.push(line);
    }

    while out.len() > protected && out.last().is_some_and(|prev| prev.is_empty()) {
        out.pop();
    }

    let mut formatted = out.join("\n");
    formatted.push('\n');
    formatted
}

// =============================================================================
// RUSTFMT
// =============================================================================

#[derive(Debug, Clone)]
pub struct RustfmtFormatter {
    pub binary: String,
    pub edition: String,
}

impl Default for RustfmtFormatter {
    fn default() -> Self {
        Self {
            binary: "rustfmt".to_string(),
            edition: "2021".to_string(),
        }
    }
}

impl SourceFormatter for RustfmtFormatter {
    fn name(&self) -> &'static str {
        "rustfmt"
    }

    fn format(&self, text: &str) -> Result<String> {
        let mut temp_file = NamedTempFile::new().context("Failed to create temp file for rustfmt")?;
        temp_file.write_all(text.as_bytes())?;
        temp_file.flush()?;
        let temp_path = temp_file.path();

        let output = Command::new(&self.binary)
            .arg("--edition")
            .arg(&self.edition)
            .arg(temp_path)
            .output()
            .with_context(|| format!("Failed to run {}", self.binary))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("{} failed: {}", self.binary, stderr.trim()));
        }

        fs::read_to_string(temp_path).context("Failed to read formatted code")
    }
}
