#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use graph_schema_codegen::codegen::{RegenOptions, Regenerator, RunReport};
use graph_schema_codegen::schema::{SchemaDefinition, SchemaGraph};
use graph_schema_codegen::CodegenResult;
use tempfile::{TempDir, tempdir};

/// Two exposed node types, a self-loop edge with a reverse exposure, and an
/// edge between the two types.
pub const FIXTURE_SCHEMA: &str = r#"
nodes:
  - name: User
    description: A registered account.
    fields:
      - name: email
        code_name: Email
        type: string
        unique: true
        description: Address used to sign in.
        privacy: allow_owner
      - name: age
        code_name: Age
        type: int
        indexed: true
    deletion_privacy: allow_owner
    graphql:
      description: A registered account.
    edges:
      - name: FRIENDS_WITH
        code_name: FriendsWith
        to: User
        fields:
          - name: since
            code_name: Since
            type: int
        privacy:
          forward: allow_all
          reverse: allow_all
        graphql:
          field_name: friends
          order_by: since
          reverse:
            field_name: friendOf
      - name: MEMBER_OF
        code_name: MemberOf
        to: Group
        graphql:
          field_name: groups
          reverse:
            field_name: members
  - name: Group
    fields:
      - name: title
        code_name: Title
        default_value: String::from("untitled")
    graphql: {}
"#;

pub const USER_MODEL: &str = "models/user_node.rs";
pub const USER_LOGIC: &str = "logic/user.rs";
pub const GRAPHQL_SCHEMA: &str = "graphql/schema.rs";
pub const CONSTRAINTS: &str = "models/constraints/data/constraints.json";
pub const INDICES: &str = "models/indices/data/indices.json";

pub fn fixture_definition() -> SchemaDefinition {
    serde_yaml::from_str(FIXTURE_SCHEMA).expect("fixture schema parses")
}

pub fn fixture_graph() -> SchemaGraph {
    SchemaGraph::build(fixture_definition()).expect("fixture schema is consistent")
}

/// Scratch destination directory for one test.
pub struct TestWorkspace {
    _tempdir: TempDir,
    root: PathBuf,
}

impl TestWorkspace {
    pub fn new() -> Self {
        let tempdir = tempdir().expect("tempdir");
        let root = tempdir.path().join("generated");
        Self {
            _tempdir: tempdir,
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.path(name)).expect("read artifact")
    }

    pub fn write(&self, name: &str, contents: &str) {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create dir");
        }
        fs::write(path, contents).expect("write artifact");
    }

    pub fn options(&self) -> RegenOptions {
        RegenOptions {
            destination: self.root.clone(),
            ..RegenOptions::default()
        }
    }

    pub fn options_with<F>(&self, configure: F) -> RegenOptions
    where
        F: FnOnce(&mut RegenOptions),
    {
        let mut options = self.options();
        configure(&mut options);
        options
    }

    pub fn run(&self, options: RegenOptions, graph: &SchemaGraph) -> CodegenResult<RunReport> {
        Regenerator::new(options)?.run(graph)
    }

    /// Run with default options; panics on failure.
    pub fn generate(&self, graph: &SchemaGraph) -> RunReport {
        self.run(self.options(), graph).expect("regeneration succeeds")
    }

    /// Every file under the destination with its contents, sorted by path.
    pub fn snapshot(&self) -> Vec<(PathBuf, String)> {
        if !self.root.exists() {
            return Vec::new();
        }
        let mut files: Vec<(PathBuf, String)> = walkdir::WalkDir::new(&self.root)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| {
                let contents = fs::read_to_string(entry.path()).expect("read file");
                (entry.path().to_path_buf(), contents)
            })
            .collect();
        files.sort();
        files
    }
}

/// Replace the interior of the manual section tagged `tag`.
pub fn fill_manual_section(text: &str, tag: &str, content: &str) -> String {
    let start = format!("// * START MANUAL SECTION [{tag}] *\n");
    let at = text.find(&start).expect("tagged manual section present") + start.len();
    let mut filled = String::with_capacity(text.len() + content.len() + 1);
    filled.push_str(&text[..at]);
    filled.push_str(content);
    filled.push('\n');
    filled.push_str(&text[at..]);
    filled
}
