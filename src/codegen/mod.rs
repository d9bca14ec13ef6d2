//! Regeneration protocol
//!
//! ```text
//! SchemaGraph → plan → validate-all → render-all → write-all
//! ```
//!
//! - **manual**: manual-section markers, extraction, blanking and injection
//! - **signature**: `@SignedSource` headers and drift decisions
//! - **projection**: constraint and index side documents
//! - **transaction**: all-or-nothing file writes
//! - **report**: per-artifact outcomes and run warnings
//! - **regen**: the orchestrator tying them together
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use graph_schema_codegen::codegen::{RegenOptions, Regenerator};
//! use graph_schema_codegen::schema::{SchemaDefinition, SchemaGraph};
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! let definition = SchemaDefinition::load(Path::new("schema.yaml"))?;
//! let graph = SchemaGraph::build(definition)?;
//!
//! let regenerator = Regenerator::new(RegenOptions {
//!     destination: "src/generated".into(),
//!     ..RegenOptions::default()
//! })?;
//! let report = regenerator.run(&graph)?;
//! for artifact in report.written() {
//!     println!("Generated {}", artifact.path.display());
//! }
//! # Ok(())
//! # }
//! ```

pub mod manual;
pub mod projection;
pub mod regen;
pub mod report;
pub mod signature;
pub mod transaction;

pub use manual::{Injection, ManualBlock, ManualSectionError, ShapeMismatchPolicy};
pub use projection::{ConstraintDocument, IndexDocument};
pub use regen::{RegenOptions, Regenerator};
pub use report::{ArtifactOutcome, ArtifactReport, RunReport, RunWarning};
pub use signature::{Decision, RegenMode, SignatureState};
pub use transaction::FileTransaction;
