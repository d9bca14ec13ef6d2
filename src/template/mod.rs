//! Template composition: naming, per-entity views, section sources, the
//! composer that stitches sections into artifacts, and source formatters.

pub mod composer;
pub mod format;
pub mod naming;
pub mod sources;
pub mod views;

pub use composer::{
    ArtifactFamily, ComposedArtifact, Entity, SchemaContext, Section, SectionKind,
    TemplateComposer,
};
pub use format::{CanonicalFormatter, FormatterKind, RustfmtFormatter, SourceFormatter};
pub use naming::NamingContext;
