//! End-to-end regeneration runs against a scratch destination.

mod support;

use assert_matches::assert_matches;
use graph_schema_codegen::CodegenError;
use graph_schema_codegen::codegen::signature::{self, SignatureState};
use graph_schema_codegen::codegen::{ArtifactOutcome, ManualSectionError, ShapeMismatchPolicy};
use graph_schema_codegen::schema::{FieldSpec, FieldType, SchemaGraph};
use support::*;

const HELPERS: &str = "pub fn shout(name: &str) -> String {\n    name.to_uppercase()\n}\n\npub fn whisper(name: &str) -> String {   \n    name.to_lowercase()\n}";

fn graph_with_nickname() -> SchemaGraph {
    let mut definition = fixture_definition();
    definition.nodes[0]
        .fields
        .push(FieldSpec::new("nickname", "Nickname", FieldType::String));
    SchemaGraph::build(definition).unwrap()
}

/// Edit generated text outside any manual section.
fn drift(workspace: &TestWorkspace, name: &str) {
    let text = workspace.read(name);
    let edited = text.replacen("pub struct UserNode {", "pub struct UserNode  {", 1);
    assert_ne!(text, edited);
    workspace.write(name, &edited);
}

// ============================================================================
// First run and idempotence
// ============================================================================

#[test]
fn test_first_run_creates_every_artifact() {
    // Arrange
    let workspace = TestWorkspace::new();
    let graph = fixture_graph();

    // Act
    let report = workspace.generate(&graph);

    // Assert
    assert!(
        report
            .artifacts
            .iter()
            .all(|artifact| artifact.outcome == ArtifactOutcome::Created)
    );
    for name in [
        USER_MODEL,
        "models/group_node.rs",
        "models/friends_with_edge.rs",
        "models/member_of_edge.rs",
        USER_LOGIC,
        "logic/group.rs",
        "logic/friends_with.rs",
        "logic/member_of.rs",
        GRAPHQL_SCHEMA,
        "graphql/resolvers/type_user.rs",
        "graphql/resolvers/type_group.rs",
        "graphql/resolvers/dataloader_batcher.rs",
    ] {
        let text = workspace.read(name);
        assert!(text.starts_with("// @SignedSource ("), "{name} is not signed");
        assert_eq!(signature::classify(Some(text.as_str())), SignatureState::SignatureValid);
    }
    assert!(!signature::is_signed(&workspace.read(CONSTRAINTS)));
    assert!(!signature::is_signed(&workspace.read(INDICES)));
    assert!(report.warnings.is_empty());
}

#[test]
fn test_second_run_is_byte_identical_and_unchanged() {
    // Arrange
    let workspace = TestWorkspace::new();
    let graph = fixture_graph();
    workspace.generate(&graph);
    let before = workspace.snapshot();

    // Act
    let report = workspace.generate(&graph);

    // Assert
    assert_eq!(workspace.snapshot(), before);
    assert!(
        report
            .artifacts
            .iter()
            .all(|artifact| artifact.outcome == ArtifactOutcome::Unchanged)
    );
    assert_eq!(report.written().count(), 0);
}

#[test]
fn test_generated_sources_reflect_the_schema() {
    let workspace = TestWorkspace::new();
    workspace.generate(&fixture_graph());

    let logic = workspace.read(USER_LOGIC);
    assert_eq!(logic.matches("pub fn inbound_friends_with(").count(), 1);
    assert!(!logic.contains("pub fn inbound_member_of("));
    assert!(logic.contains("pub fn email(&self) -> Option<&String>"));
    assert!(logic.contains("self.allowed(\"allow_owner\")"));

    let group_logic = workspace.read("logic/group.rs");
    assert!(group_logic.contains("pub fn inbound_member_of(&self, conn: &mut Conn)"));

    let sdl = workspace.read(GRAPHQL_SCHEMA);
    assert_eq!(sdl.matches("type UserFriendsWithUserConnection {").count(), 1);
    assert!(sdl.contains("friendOf(first: Int, after: ID): UserFriendsWithUserConnection!"));
    assert!(sdl.contains("members(first: Int, after: ID): GroupMemberOfUserConnection!"));

    let batcher = workspace.read("graphql/resolvers/dataloader_batcher.rs");
    assert!(batcher.contains("\"Group.members\" => Some("));
    assert!(batcher.contains("        // * START MANUAL SECTION [batch_arms] *"));

    let resolver = workspace.read("graphql/resolvers/type_user.rs");
    assert!(resolver.contains("Some(\"since\")"));
}

// ============================================================================
// Manual sections
// ============================================================================

#[test]
fn test_manual_sections_survive_schema_changes() {
    // Arrange
    let workspace = TestWorkspace::new();
    workspace.generate(&fixture_graph());
    let filled = fill_manual_section(&workspace.read(USER_LOGIC), "extra_functions", HELPERS);
    let filled = fill_manual_section(&filled, "imports", "use std::fmt::Write;");
    workspace.write(USER_LOGIC, &filled);
    assert_eq!(signature::classify(Some(filled.as_str())), SignatureState::SignatureValid);

    // Act
    let report = workspace.generate(&graph_with_nickname());

    // Assert
    let regenerated = workspace.read(USER_LOGIC);
    assert_eq!(report.outcome(USER_LOGIC), Some(ArtifactOutcome::Updated));
    assert!(regenerated.contains(&format!(
        "// * START MANUAL SECTION [extra_functions] *\n{HELPERS}\n// * END MANUAL SECTION *"
    )));
    assert!(regenerated.contains(
        "// * START MANUAL SECTION [imports] *\nuse std::fmt::Write;\n// * END MANUAL SECTION *"
    ));
    assert!(regenerated.contains("pub fn nickname(&self)"));
    assert!(report.warnings.is_empty());
}

#[test]
fn test_manual_section_under_a_retired_tag_moves_to_the_free_placeholder() {
    // Arrange: a signed file whose section was written under an older tag name.
    let workspace = TestWorkspace::new();
    workspace.generate(&fixture_graph());
    let filled = fill_manual_section(&workspace.read(USER_MODEL), "extra", "pub fn mine() {}");
    let (_, body) = signature::split_header(&filled).unwrap();
    let retagged = body.replace(
        "// * START MANUAL SECTION [extra] *",
        "// * START MANUAL SECTION [legacy_extra] *",
    );
    workspace.write(USER_MODEL, &signature::sign(&retagged));

    // Act
    let report = workspace.generate(&fixture_graph());

    // Assert
    assert!(report.warnings.is_empty());
    assert!(workspace.read(USER_MODEL).contains(
        "// * START MANUAL SECTION [extra] *\npub fn mine() {}\n// * END MANUAL SECTION *"
    ));
}

#[test]
fn test_unsigned_file_is_adopted_with_its_manual_sections() {
    // Arrange
    let workspace = TestWorkspace::new();
    workspace.write(
        USER_MODEL,
        "// hand-written\n// * START MANUAL SECTION [extra] *\npub fn legacy() {}\n// * END MANUAL SECTION *\n",
    );

    // Act
    let report = workspace.generate(&fixture_graph());

    // Assert
    assert!(report.has_warning("signature_absent"));
    assert_eq!(report.outcome(USER_MODEL), Some(ArtifactOutcome::Updated));
    let text = workspace.read(USER_MODEL);
    assert!(signature::is_signed(&text));
    assert!(text.contains("pub fn legacy() {}"));
    assert!(!text.contains("// hand-written"));
}

#[test]
fn test_manual_sections_that_do_not_fit_are_reported() {
    // Arrange
    let workspace = TestWorkspace::new();
    workspace.write(
        USER_MODEL,
        "// * START MANUAL SECTION *\nuse std::fmt;\n// * END MANUAL SECTION *\n\
         // * START MANUAL SECTION *\npub fn kept() {}\n// * END MANUAL SECTION *\n\
         // * START MANUAL SECTION *\npub fn dropped() {}\n// * END MANUAL SECTION *\n",
    );

    // Act
    let report = workspace.generate(&fixture_graph());

    // Assert
    assert!(report.has_warning("shape_mismatch"));
    let text = workspace.read(USER_MODEL);
    assert!(text.contains("use std::fmt;"));
    assert!(text.contains("pub fn kept() {}"));
    assert!(!text.contains("pub fn dropped() {}"));
}

#[test]
fn test_strict_manual_sections_refuse_to_drop_content() {
    // Arrange
    let workspace = TestWorkspace::new();
    let unsigned = "// * START MANUAL SECTION *\nuse std::fmt;\n// * END MANUAL SECTION *\n\
         // * START MANUAL SECTION *\npub fn kept() {}\n// * END MANUAL SECTION *\n\
         // * START MANUAL SECTION *\npub fn dropped() {}\n// * END MANUAL SECTION *\n";
    workspace.write(USER_MODEL, unsigned);
    let options = workspace.options_with(|options| {
        options.shape_policy = ShapeMismatchPolicy::Fail;
    });

    // Act
    let result = workspace.run(options, &fixture_graph());

    // Assert
    assert_matches!(
        result,
        Err(CodegenError::ManualSectionShapeMismatch {
            placeholders: 2,
            extracted: 3,
            discarded: 1,
            ..
        })
    );
    assert_eq!(workspace.read(USER_MODEL), unsigned);
    assert!(!workspace.path(USER_LOGIC).exists());
}

#[test]
fn test_unterminated_manual_section_is_rejected() {
    // Arrange
    let workspace = TestWorkspace::new();
    workspace.generate(&fixture_graph());
    let text = workspace.read(USER_MODEL);
    let end = "// * END MANUAL SECTION *\n";
    let at = text.rfind(end).unwrap();
    workspace.write(USER_MODEL, &format!("{}{}", &text[..at], &text[at + end.len()..]));
    let options = workspace.options_with(|options| options.merge = true);

    // Act
    let result = workspace.run(options, &fixture_graph());

    // Assert
    assert_matches!(
        result,
        Err(CodegenError::ManualSectionSyntax {
            source: ManualSectionError::Unterminated { .. },
            ..
        })
    );
}

#[test]
fn test_invalid_manual_code_fails_formatting_with_raw_text() {
    // Arrange
    let workspace = TestWorkspace::new();
    workspace.generate(&fixture_graph());
    let broken = fill_manual_section(&workspace.read(USER_LOGIC), "extra_functions", "pub fn broken( {");
    workspace.write(USER_LOGIC, &broken);
    let before = workspace.snapshot();

    // Act
    let result = workspace.run(workspace.options(), &graph_with_nickname());

    // Assert
    let err = result.unwrap_err();
    assert_matches!(err, CodegenError::TemplateFormat { .. });
    assert!(err.raw_text().unwrap().contains("pub fn broken( {"));
    assert_eq!(workspace.snapshot(), before);
}

// ============================================================================
// Drift detection
// ============================================================================

#[test]
fn test_drift_fails_a_plain_run_without_touching_files() {
    // Arrange
    let workspace = TestWorkspace::new();
    workspace.generate(&fixture_graph());
    drift(&workspace, USER_MODEL);
    let before = workspace.snapshot();

    // Act: the schema change would rewrite several files.
    let result = workspace.run(workspace.options(), &graph_with_nickname());

    // Assert
    assert_matches!(result, Err(CodegenError::SignatureMismatch { .. }));
    assert_eq!(workspace.snapshot(), before);
}

#[test]
fn test_force_overwrites_drift_and_discards_manual_content() {
    // Arrange
    let workspace = TestWorkspace::new();
    workspace.generate(&fixture_graph());
    let filled = fill_manual_section(&workspace.read(USER_MODEL), "extra", "pub fn mine() {}");
    workspace.write(USER_MODEL, &filled);
    drift(&workspace, USER_MODEL);
    let options = workspace.options_with(|options| options.force = true);

    // Act
    let report = workspace.run(options, &fixture_graph()).unwrap();

    // Assert
    assert!(report.has_warning("manual_discarded"));
    let text = workspace.read(USER_MODEL);
    assert!(!text.contains("pub fn mine() {}"));
    assert!(text.contains("pub struct UserNode {"));
    assert_eq!(signature::classify(Some(text.as_str())), SignatureState::SignatureValid);
}

#[test]
fn test_merge_accepts_drift_and_keeps_manual_content() {
    // Arrange
    let workspace = TestWorkspace::new();
    workspace.generate(&fixture_graph());
    let filled = fill_manual_section(&workspace.read(USER_MODEL), "extra", "pub fn mine() {}");
    workspace.write(USER_MODEL, &filled);
    drift(&workspace, USER_MODEL);
    let options = workspace.options_with(|options| options.merge = true);

    // Act
    let report = workspace.run(options, &fixture_graph()).unwrap();

    // Assert
    assert!(report.has_warning("drift_accepted"));
    let text = workspace.read(USER_MODEL);
    assert!(text.contains("pub fn mine() {}"));
    assert!(text.contains("pub struct UserNode {"));
    assert_eq!(signature::classify(Some(text.as_str())), SignatureState::SignatureValid);
}

#[test]
fn test_both_overrides_merge_with_a_warning() {
    // Arrange
    let workspace = TestWorkspace::new();
    workspace.generate(&fixture_graph());
    let filled = fill_manual_section(&workspace.read(USER_MODEL), "extra", "pub fn mine() {}");
    workspace.write(USER_MODEL, &filled);
    drift(&workspace, USER_MODEL);
    let options = workspace.options_with(|options| {
        options.merge = true;
        options.force = true;
    });

    // Act
    let report = workspace.run(options, &fixture_graph()).unwrap();

    // Assert
    assert!(report.has_warning("both_overrides"));
    assert!(report.has_warning("drift_accepted"));
    assert!(workspace.read(USER_MODEL).contains("pub fn mine() {}"));
}

// ============================================================================
// Dry runs and orphans
// ============================================================================

#[test]
fn test_dry_run_writes_nothing() {
    let workspace = TestWorkspace::new();
    let options = workspace.options_with(|options| options.dry_run = true);

    let report = workspace.run(options, &fixture_graph()).unwrap();

    assert!(report.dry_run);
    assert_eq!(report.outcome(USER_MODEL), Some(ArtifactOutcome::Created));
    assert!(workspace.snapshot().is_empty());
}

#[test]
fn test_signed_files_no_longer_generated_are_reported_not_deleted() {
    // Arrange
    let workspace = TestWorkspace::new();
    workspace.generate(&fixture_graph());
    let stale = signature::sign("pub fn stale() {}\n");
    workspace.write("models/stale_node.rs", &stale);
    workspace.write("models/mod.rs", "pub mod user_node;\n");

    // Act
    let report = workspace.generate(&fixture_graph());

    // Assert
    let orphans: Vec<_> = report
        .warnings
        .iter()
        .filter(|warning| warning.code() == "orphaned_artifact")
        .collect();
    assert_eq!(orphans.len(), 1);
    assert_eq!(
        orphans[0].path(),
        Some(workspace.path("models/stale_node.rs").as_path())
    );
    assert_eq!(workspace.read("models/stale_node.rs"), stale);
}
