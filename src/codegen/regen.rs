//! Regeneration orchestrator
//!
//! A run has four phases and writes nothing until the last one:
//!
//! 1. **plan**: the ordered list of artifacts the schema produces.
//! 2. **validate-all**: read every prior artifact, check its signature and pull
//!    out its manual blocks. The first unresolved drift aborts the run.
//! 3. **render-all**: compose, inject, format and sign every artifact in memory.
//! 4. **write-all**: stage the artifacts that changed and commit them together.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use walkdir::WalkDir;

use super::manual::{self, ManualBlock, ManualSectionError, ShapeMismatchPolicy};
use super::projection::{render_json, ConstraintDocument, IndexDocument};
use super::report::{ArtifactOutcome, ArtifactReport, RunReport, RunWarning};
use super::signature::{self, RegenMode};
use super::transaction::FileTransaction;
use crate::error::{CodegenError, CodegenResult};
use crate::schema::{EdgePointerIndex, GraphQlSchema, SchemaGraph};
use crate::template::{
    ArtifactFamily, Entity, FormatterKind, NamingContext, SchemaContext, SourceFormatter,
    TemplateComposer,
};

#[derive(Debug, Clone, Default)]
pub struct RegenOptions {
    /// Root the artifact paths are resolved against.
    pub destination: PathBuf,
    pub merge: bool,
    pub force: bool,
    pub formatter: FormatterKind,
    pub shape_policy: ShapeMismatchPolicy,
    pub naming: NamingContext,
    /// Run every phase except write-all.
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TargetKind {
    Source { family: ArtifactFamily, entity: Entity },
    Constraints,
    Indices,
}

#[derive(Debug, Clone)]
struct Target {
    /// Relative to the destination.
    path: PathBuf,
    kind: TargetKind,
}

impl Target {
    fn is_signed(&self) -> bool {
        matches!(self.kind, TargetKind::Source { .. })
    }
}

/// What validate-all learned about one target.
#[derive(Debug, Default)]
struct Prior {
    text: Option<String>,
    blocks: Vec<ManualBlock>,
}

pub struct Regenerator {
    options: RegenOptions,
    composer: TemplateComposer,
}

impl Regenerator {
    pub fn new(options: RegenOptions) -> CodegenResult<Self> {
        options.naming.validate()?;
        let composer = TemplateComposer::new(options.naming.clone())?;
        Ok(Self { options, composer })
    }

    pub fn run(&self, graph: &SchemaGraph) -> CodegenResult<RunReport> {
        let mut report = RunReport {
            dry_run: self.options.dry_run,
            ..RunReport::default()
        };

        let (mode, warning) = RegenMode::from_flags(self.options.merge, self.options.force);
        if let Some(warning) = warning {
            warn(&mut report, warning);
        }

        let started = Instant::now();
        let targets = self.plan(graph)?;
        crate::log_phase!(
            "plan",
            started,
            destination = %self.options.destination.display(),
            targets = targets.len(),
            mode = %mode,
            "planned artifacts"
        );

        let started = Instant::now();
        let priors = self.validate_all(&targets, mode, &mut report)?;
        crate::log_phase!("validate", started, "validated prior artifacts");

        let started = Instant::now();
        let rendered = self.render_all(graph, &targets, &priors, &mut report)?;
        crate::log_phase!("render", started, artifacts = rendered.len(), "rendered artifacts");

        self.write_all(&targets, priors, rendered, &mut report)?;
        Ok(report)
    }

    // =========================================================================
    // PLAN
    // =========================================================================

    fn plan(&self, graph: &SchemaGraph) -> CodegenResult<Vec<Target>> {
        let mut sources = Vec::new();
        for (id, _) in graph.nodes() {
            sources.push((ArtifactFamily::ModelNode, Entity::Node(id)));
        }
        for (id, _) in graph.edges() {
            sources.push((ArtifactFamily::ModelEdge, Entity::Edge(id)));
        }
        for (id, _) in graph.nodes() {
            sources.push((ArtifactFamily::LogicNode, Entity::Node(id)));
        }
        for (id, _) in graph.edges() {
            sources.push((ArtifactFamily::LogicEdge, Entity::Edge(id)));
        }
        sources.push((ArtifactFamily::GraphQlSchema, Entity::Schema));
        for (id, node) in graph.nodes() {
            if node.graphql.is_some() {
                sources.push((ArtifactFamily::GraphQlNodeResolver, Entity::Node(id)));
            }
        }
        sources.push((ArtifactFamily::GraphQlDataloader, Entity::Schema));

        let mut targets = Vec::with_capacity(sources.len() + 2);
        for (family, entity) in sources {
            targets.push(Target {
                path: self.composer.artifact_path(graph, family, entity)?,
                kind: TargetKind::Source { family, entity },
            });
        }

        let models = PathBuf::from(&self.options.naming.models_module);
        targets.push(Target {
            path: models.join("constraints").join("data").join("constraints.json"),
            kind: TargetKind::Constraints,
        });
        targets.push(Target {
            path: models.join("indices").join("data").join("indices.json"),
            kind: TargetKind::Indices,
        });

        let mut seen = HashSet::new();
        for target in &targets {
            if !seen.insert(&target.path) {
                return Err(CodegenError::schema(format!(
                    "two artifacts would be written to {}",
                    target.path.display()
                )));
            }
        }
        Ok(targets)
    }

    // =========================================================================
    // VALIDATE-ALL
    // =========================================================================

    fn validate_all(
        &self,
        targets: &[Target],
        mode: RegenMode,
        report: &mut RunReport,
    ) -> CodegenResult<Vec<Prior>> {
        let mut priors = Vec::with_capacity(targets.len());
        for target in targets {
            let path = self.options.destination.join(&target.path);
            let text = read_prior(&path)?;
            if !target.is_signed() {
                priors.push(Prior { text, blocks: Vec::new() });
                continue;
            }

            let state = signature::classify(text.as_deref());
            let decision = signature::resolve(&path, &state, mode)?;
            tracing::debug!(
                path = %path.display(),
                state = ?state,
                carry_manual = decision.carry_manual,
                "checked signature"
            );
            if let Some(warning) = decision.warning {
                warn(report, warning);
            }

            let blocks = match &text {
                Some(text) if decision.carry_manual => manual::extract(text)
                    .map_err(|source| CodegenError::ManualSectionSyntax {
                        path: path.clone(),
                        source,
                    })?,
                _ => Vec::new(),
            };
            priors.push(Prior { text, blocks });
        }

        let planned: HashSet<&Path> = targets.iter().map(|t| t.path.as_path()).collect();
        self.scan_orphans(&planned, report);
        Ok(priors)
    }

    /// Warn about signed sources under the destination that no target produces.
    fn scan_orphans(&self, planned: &HashSet<&Path>, report: &mut RunReport) {
        let root = &self.options.destination;
        if !root.is_dir() {
            return;
        }

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!(error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "rs") {
                continue;
            }
            let Ok(relative) = path.strip_prefix(root) else {
                continue;
            };
            if planned.contains(relative) {
                continue;
            }
            match fs::read_to_string(path) {
                Ok(text) if signature::is_signed(&text) => {
                    warn(
                        report,
                        RunWarning::OrphanedArtifact {
                            path: path.to_path_buf(),
                        },
                    );
                }
                Ok(_) => {}
                Err(e) => tracing::debug!(path = %path.display(), error = %e, "skipping unreadable file"),
            }
        }
    }

    // =========================================================================
    // RENDER-ALL
    // =========================================================================

    fn render_all(
        &self,
        graph: &SchemaGraph,
        targets: &[Target],
        priors: &[Prior],
        report: &mut RunReport,
    ) -> CodegenResult<Vec<String>> {
        let pointers = EdgePointerIndex::build(graph);
        let graphql = GraphQlSchema::build(graph)?;
        let schema = SchemaContext {
            graph,
            pointers: &pointers,
            graphql: &graphql,
        };
        let formatter = self.options.formatter.build();

        let mut rendered = Vec::with_capacity(targets.len());
        for (target, prior) in targets.iter().zip(priors) {
            let path = self.options.destination.join(&target.path);
            let text = match target.kind {
                TargetKind::Source { family, entity } => self.render_source(
                    schema,
                    family,
                    entity,
                    &path,
                    prior,
                    formatter.as_ref(),
                    report,
                )?,
                TargetKind::Constraints => {
                    json_document(&path, &ConstraintDocument::from_graph(graph))?
                }
                TargetKind::Indices => json_document(&path, &IndexDocument::from_graph(graph))?,
            };
            rendered.push(text);
        }
        Ok(rendered)
    }

    #[allow(clippy::too_many_arguments)]
    fn render_source(
        &self,
        schema: SchemaContext<'_>,
        family: ArtifactFamily,
        entity: Entity,
        path: &Path,
        prior: &Prior,
        formatter: &dyn SourceFormatter,
        report: &mut RunReport,
    ) -> CodegenResult<String> {
        let composed = self.composer.compose(schema, family, entity)?;

        let injection = manual::inject(&composed.text, &prior.blocks, self.options.shape_policy)
            .map_err(|source| match source {
                ManualSectionError::ShapeMismatch {
                    placeholders,
                    extracted,
                    discarded,
                } => CodegenError::ManualSectionShapeMismatch {
                    path: path.to_path_buf(),
                    placeholders,
                    extracted,
                    discarded,
                },
                source => CodegenError::ManualSectionSyntax {
                    path: path.to_path_buf(),
                    source,
                },
            })?;
        if injection.is_shape_mismatch() {
            warn(
                report,
                RunWarning::ShapeMismatch {
                    path: path.to_path_buf(),
                    placeholders: injection.placeholders,
                    extracted: injection.extracted,
                    discarded: injection.discarded.len(),
                },
            );
        }

        let body = formatter.format(&injection.text).map_err(|e| {
            tracing::error!(
                artifact = %path.display(),
                formatter = formatter.name(),
                raw = %injection.text,
                "failed to format generated artifact"
            );
            CodegenError::TemplateFormat {
                artifact: path.display().to_string(),
                message: format!("{e:#}"),
                raw: injection.text.clone(),
            }
        })?;

        Ok(signature::sign(&body))
    }

    // =========================================================================
    // WRITE-ALL
    // =========================================================================

    fn write_all(
        &self,
        targets: &[Target],
        priors: Vec<Prior>,
        rendered: Vec<String>,
        report: &mut RunReport,
    ) -> CodegenResult<()> {
        let mut txn = FileTransaction::new();
        for ((target, prior), content) in targets.iter().zip(priors).zip(rendered) {
            let outcome = match &prior.text {
                None => ArtifactOutcome::Created,
                Some(text) if *text == content => ArtifactOutcome::Unchanged,
                Some(_) => ArtifactOutcome::Updated,
            };
            tracing::debug!(path = %target.path.display(), outcome = %outcome, "planned write");
            if outcome != ArtifactOutcome::Unchanged {
                let path = self.options.destination.join(&target.path);
                txn.stage_write(&path, content, prior.text);
            }
            report.artifacts.push(ArtifactReport {
                path: target.path.clone(),
                outcome,
                signed: target.is_signed(),
            });
        }

        if self.options.dry_run {
            tracing::info!(pending = txn.len(), "dry run; nothing written");
            return Ok(());
        }

        let started = Instant::now();
        let written = txn.len();
        txn.commit()?;
        crate::log_phase!("write", started, written, "wrote artifacts");
        Ok(())
    }
}

fn warn(report: &mut RunReport, warning: RunWarning) {
    warning.emit();
    report.warnings.push(warning);
}

fn read_prior(path: &Path) -> CodegenResult<Option<String>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(CodegenError::ArtifactRead {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn json_document<T: serde::Serialize>(path: &Path, document: &T) -> CodegenResult<String> {
    render_json(document).map_err(|e| CodegenError::TemplateFormat {
        artifact: path.display().to_string(),
        message: e.to_string(),
        raw: String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{NodeDefinition, SchemaDefinition};
    use assert_matches::assert_matches;
    use tempfile::TempDir;

    fn single_node() -> SchemaGraph {
        SchemaGraph::build(SchemaDefinition {
            nodes: vec![NodeDefinition {
                name: "Tag".to_string(),
                ..NodeDefinition::default()
            }],
        })
        .unwrap()
    }

    #[test]
    fn test_plan_orders_families_and_side_documents() {
        let regen = Regenerator::new(RegenOptions::default()).unwrap();
        let paths: Vec<_> = regen
            .plan(&single_node())
            .unwrap()
            .into_iter()
            .map(|t| t.path)
            .collect();

        assert_eq!(
            paths,
            vec![
                PathBuf::from("models/tag_node.rs"),
                PathBuf::from("logic/tag.rs"),
                PathBuf::from("graphql/schema.rs"),
                PathBuf::from("graphql/resolvers/dataloader_batcher.rs"),
                PathBuf::from("models/constraints/data/constraints.json"),
                PathBuf::from("models/indices/data/indices.json"),
            ]
        );
    }

    #[test]
    fn test_unreadable_prior_is_an_error() {
        // Arrange: a directory where a file is expected.
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("models/tag_node.rs")).unwrap();
        let regen = Regenerator::new(RegenOptions {
            destination: dir.path().to_path_buf(),
            ..RegenOptions::default()
        })
        .unwrap();

        // Act
        let result = regen.run(&single_node());

        // Assert
        assert_matches!(result, Err(CodegenError::ArtifactRead { .. }));
    }
}
