//! Declarative schema input.
//!
//! These are plain data structs with named fields; the schema-definition
//! collaborator fills them in (usually by deserializing a YAML or JSON file) and
//! hands them to [`SchemaGraph::build`](super::graph::SchemaGraph::build).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use strum::{Display, EnumString};

use crate::error::{CodegenError, CodegenResult};

/// Primitive type of a node or edge field.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FieldType {
    #[default]
    String,
    Float,
    Int,
    Bool,
}

impl FieldType {
    /// Type used for the field in generated Rust code.
    pub fn rust_type(&self) -> &'static str {
        match self {
            FieldType::String => "String",
            FieldType::Float => "f64",
            FieldType::Int => "i64",
            FieldType::Bool => "bool",
        }
    }

    pub fn graphql_type(&self) -> &'static str {
        match self {
            FieldType::String => "String",
            FieldType::Float => "Float",
            FieldType::Int => "Int",
            FieldType::Bool => "Boolean",
        }
    }

    /// Expression used when a field declares no default value.
    pub fn zero_value(&self) -> &'static str {
        match self {
            FieldType::String => "String::new()",
            FieldType::Float => "0.0",
            FieldType::Int => "0",
            FieldType::Bool => "false",
        }
    }
}

/// Name of a privacy policy exported by the downstream runtime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyRef(String);

impl PolicyRef {
    pub const DENY_ALL: &'static str = "deny_all";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PolicyRef {
    fn default() -> Self {
        Self(Self::DENY_ALL.to_string())
    }
}

impl fmt::Display for PolicyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
    /// Storage name of the property (snake_case).
    pub name: String,
    /// Name used in generated code (CamelCase).
    pub code_name: String,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    /// Rust expression; empty means the type's zero value.
    #[serde(default)]
    pub default_value: String,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub indexed: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub privacy: PolicyRef,
    #[serde(default)]
    pub write_privacy: PolicyRef,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, code_name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            code_name: code_name.into(),
            field_type,
            ..Self::default()
        }
    }

    pub fn default_expr(&self) -> &str {
        if self.default_value.trim().is_empty() {
            self.field_type.zero_value()
        } else {
            self.default_value.trim()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EdgePrivacy {
    #[serde(default)]
    pub forward: PolicyRef,
    #[serde(default)]
    pub reverse: PolicyRef,
    #[serde(default)]
    pub write: PolicyRef,
    #[serde(default)]
    pub delete: PolicyRef,
}

/// GraphQL exposure of a node.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GraphQlNodeExposure {
    #[serde(default)]
    pub description: String,
}

/// GraphQL exposure of an edge as a connection field on its source node.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GraphQlEdgeExposure {
    /// Connection field name on the source node (camelCase).
    pub field_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub order_by: Option<String>,
    /// Also expose the edge on the destination node.
    #[serde(default)]
    pub reverse: Option<GraphQlReverseExposure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GraphQlReverseExposure {
    pub field_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub order_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EdgeDefinition {
    /// Label of the edge in the graph store (UPPER_SNAKE).
    pub name: String,
    pub code_name: String,
    /// Name of the destination node; the source is the node declaring the edge.
    pub to: String,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
    #[serde(default)]
    pub privacy: EdgePrivacy,
    #[serde(default)]
    pub graphql: Option<GraphQlEdgeExposure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeDefinition {
    /// Label and type name of the node (CamelCase).
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
    #[serde(default)]
    pub edges: Vec<EdgeDefinition>,
    #[serde(default)]
    pub deletion_privacy: PolicyRef,
    #[serde(default)]
    pub graphql: Option<GraphQlNodeExposure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDefinition {
    pub nodes: Vec<NodeDefinition>,
}

impl SchemaDefinition {
    /// Load a definition from a `.yaml`, `.yml` or `.json` file.
    pub fn load(path: &Path) -> CodegenResult<Self> {
        let load_error = |message: String| CodegenError::SchemaLoad {
            path: path.to_path_buf(),
            message,
        };

        let contents = fs::read_to_string(path).map_err(|e| load_error(e.to_string()))?;
        let ext = path
            .extension()
            .and_then(|os| os.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "yaml" | "yml" => {
                serde_yaml::from_str(&contents).map_err(|e| load_error(e.to_string()))
            }
            "json" => serde_json::from_str(&contents).map_err(|e| load_error(e.to_string())),
            other => Err(load_error(format!("unsupported schema extension: '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_field_type_parses_lowercase() {
        assert_eq!(FieldType::from_str("float").unwrap(), FieldType::Float);
        assert_eq!(FieldType::Int.to_string(), "int");
        assert_eq!(FieldType::Bool.rust_type(), "bool");
    }

    #[test]
    fn test_default_expr_falls_back_to_zero_value() {
        let mut field = FieldSpec::new("age", "Age", FieldType::Int);
        assert_eq!(field.default_expr(), "0");
        field.default_value = " 18 ".to_string();
        assert_eq!(field.default_expr(), "18");
    }

    #[test]
    fn test_yaml_definition_defaults() {
        let yaml = r#"
nodes:
  - name: User
    fields:
      - name: email
        code_name: Email
        unique: true
    edges:
      - name: FRIENDS_WITH
        code_name: FriendsWith
        to: User
"#;
        let definition: SchemaDefinition = serde_yaml::from_str(yaml).unwrap();
        let user = &definition.nodes[0];
        assert_eq!(user.fields[0].field_type, FieldType::String);
        assert!(user.fields[0].unique);
        assert_eq!(user.fields[0].privacy.as_str(), PolicyRef::DENY_ALL);
        assert_eq!(user.edges[0].to, "User");
        assert!(user.graphql.is_none());
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let yaml = "nodes:\n  - name: User\n    colour: blue\n";
        assert!(serde_yaml::from_str::<SchemaDefinition>(yaml).is_err());
    }

    #[test]
    fn test_load_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.toml");
        fs::write(&path, "nodes = []").unwrap();
        let err = SchemaDefinition::load(&path).unwrap_err();
        assert!(err.to_string().contains("unsupported schema extension"));
    }
}
