//! Immutable schema graph.
//!
//! [`SchemaGraph::build`] is the only constructor: it validates the definition
//! and freezes it. Nodes keep their declaration order and edges are stored in
//! traversal order (each node's outgoing edges, nodes in declaration order), so
//! every accessor below yields a stable sequence.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use super::definition::{
    EdgePrivacy, FieldSpec, GraphQlEdgeExposure, GraphQlNodeExposure, PolicyRef, SchemaDefinition,
};
use super::graphql::GraphQlSchema;
use crate::error::{CodegenError, CodegenResult};
use crate::template::naming::snake_case;

static TYPE_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z][A-Za-z0-9]*$").unwrap());
static FIELD_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z][a-z0-9_]*$").unwrap());
static EDGE_LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z][A-Z0-9_]*$").unwrap());
static GRAPHQL_FIELD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z][A-Za-z0-9]*$").unwrap());
static POLICY_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(::[A-Za-z_][A-Za-z0-9_]*)*$").unwrap()
});

/// Ends the raw string literal the SDL is embedded in.
const RAW_STRING_END: &str = "\"#";

const RUST_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "gen", "if", "impl", "in", "let", "loop", "match", "mod",
    "move", "mut", "pub", "ref", "return", "self", "static", "struct", "super", "trait",
    "true", "try", "type", "unsafe", "use", "where", "while", "yield",
];

/// Field names the generated structs already use.
const RESERVED_FIELDS: &[&str] = &["id", "from_id", "to_id"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl EdgeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct NodeSpec {
    pub name: String,
    pub description: String,
    pub fields: Vec<FieldSpec>,
    pub edges: Vec<EdgeId>,
    pub deletion_privacy: PolicyRef,
    pub graphql: Option<GraphQlNodeExposure>,
}

#[derive(Debug, Clone)]
pub struct EdgeSpec {
    pub name: String,
    pub code_name: String,
    pub from: NodeId,
    pub to: NodeId,
    pub fields: Vec<FieldSpec>,
    pub privacy: EdgePrivacy,
    pub graphql: Option<GraphQlEdgeExposure>,
}

#[derive(Debug, Clone)]
pub struct SchemaGraph {
    nodes: IndexMap<String, NodeSpec>,
    edges: Vec<EdgeSpec>,
}

impl SchemaGraph {
    pub fn build(definition: SchemaDefinition) -> CodegenResult<Self> {
        let mut nodes: IndexMap<String, NodeSpec> = IndexMap::new();

        // First pass registers every node so edges may point forward.
        for node in &definition.nodes {
            check_type_name(&node.name, "node")?;
            if nodes.contains_key(&node.name) {
                return Err(CodegenError::schema(format!(
                    "node '{}' is defined more than once",
                    node.name
                )));
            }
            let context = format!("node '{}'", node.name);
            check_fields(&node.fields, &context)?;
            check_policy(&node.deletion_privacy, &context)?;
            check_description(&node.description, &context)?;
            if let Some(exposure) = &node.graphql {
                check_description(&exposure.description, &context)?;
            }
            nodes.insert(
                node.name.clone(),
                NodeSpec {
                    name: node.name.clone(),
                    description: node.description.clone(),
                    fields: node.fields.clone(),
                    edges: Vec::new(),
                    deletion_privacy: node.deletion_privacy.clone(),
                    graphql: node.graphql.clone(),
                },
            );
        }

        let mut edges = Vec::new();
        let mut edge_names = HashSet::new();
        let mut edge_code_names = HashSet::new();

        for (from_index, node) in definition.nodes.iter().enumerate() {
            for edge in &node.edges {
                let context = format!("edge '{}' on node '{}'", edge.name, node.name);
                if !EDGE_LABEL.is_match(&edge.name) {
                    return Err(CodegenError::schema(format!(
                        "{context}: label must be UPPER_SNAKE_CASE"
                    )));
                }
                check_type_name(&edge.code_name, &context)?;
                if !edge_names.insert(edge.name.clone()) {
                    return Err(CodegenError::schema(format!(
                        "{context}: edge label is defined more than once"
                    )));
                }
                if !edge_code_names.insert(edge.code_name.clone()) || nodes.contains_key(&edge.code_name)
                {
                    return Err(CodegenError::schema(format!(
                        "{context}: code name '{}' clashes with another edge or node",
                        edge.code_name
                    )));
                }
                let to_index = nodes.get_index_of(&edge.to).ok_or_else(|| {
                    CodegenError::schema(format!(
                        "{context} points to node '{}' which was never registered",
                        edge.to
                    ))
                })?;
                check_fields(&edge.fields, &context)?;
                check_edge_privacy(&edge.privacy, &context)?;

                if let Some(exposure) = &edge.graphql {
                    check_graphql_exposure(exposure, &context)?;
                    for endpoint in [&node.name, &edge.to] {
                        if nodes[endpoint.as_str()].graphql.is_none() {
                            return Err(CodegenError::schema(format!(
                                "{context} is exposed to GraphQL but node '{endpoint}' is not; \
                                 the graphql edge has no opposite node"
                            )));
                        }
                    }
                }

                let id = EdgeId(edges.len());
                edges.push(EdgeSpec {
                    name: edge.name.clone(),
                    code_name: edge.code_name.clone(),
                    from: NodeId(from_index),
                    to: NodeId(to_index),
                    fields: edge.fields.clone(),
                    privacy: edge.privacy.clone(),
                    graphql: edge.graphql.clone(),
                });
                nodes[from_index].edges.push(id);
            }
        }

        tracing::debug!(
            nodes = nodes.len(),
            edges = edges.len(),
            "schema graph built"
        );

        let graph = Self { nodes, edges };
        // Surfaces GraphQL name clashes before anything is rendered.
        GraphQlSchema::build(&graph)?;
        Ok(graph)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &NodeSpec)> {
        self.nodes
            .values()
            .enumerate()
            .map(|(index, node)| (NodeId(index), node))
    }

    /// All edges in traversal order.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &EdgeSpec)> {
        self.edges
            .iter()
            .enumerate()
            .map(|(index, edge)| (EdgeId(index), edge))
    }

    pub fn node(&self, id: NodeId) -> &NodeSpec {
        &self.nodes[id.0]
    }

    pub fn edge(&self, id: EdgeId) -> &EdgeSpec {
        &self.edges[id.0]
    }

    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.nodes.get_index_of(name).map(NodeId)
    }

    pub fn edge_id(&self, code_name: &str) -> Option<EdgeId> {
        self.edges
            .iter()
            .position(|edge| edge.code_name == code_name)
            .map(EdgeId)
    }

    pub fn fields(&self, id: NodeId) -> &[FieldSpec] {
        &self.node(id).fields
    }

    /// Outgoing edges of a node, in declaration order.
    pub fn outgoing(&self, id: NodeId) -> impl Iterator<Item = (EdgeId, &EdgeSpec)> {
        self.node(id)
            .edges
            .iter()
            .map(move |edge_id| (*edge_id, self.edge(*edge_id)))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

fn is_keyword(ident: &str) -> bool {
    RUST_KEYWORDS.contains(&ident)
}

fn check_type_name(name: &str, context: &str) -> CodegenResult<()> {
    if !TYPE_NAME.is_match(name) {
        return Err(CodegenError::schema(format!(
            "{context}: '{name}' is not a CamelCase identifier"
        )));
    }
    Ok(())
}

fn check_fields(fields: &[FieldSpec], context: &str) -> CodegenResult<()> {
    let mut names = HashSet::new();
    let mut code_names = HashSet::new();
    for field in fields {
        if !FIELD_NAME.is_match(&field.name) || is_keyword(&field.name) {
            return Err(CodegenError::schema(format!(
                "{context}: field name '{}' must be a snake_case identifier and not a keyword",
                field.name
            )));
        }
        if RESERVED_FIELDS.contains(&field.name.as_str()) {
            return Err(CodegenError::schema(format!(
                "{context}: field name '{}' is reserved",
                field.name
            )));
        }
        check_type_name(&field.code_name, context)?;
        check_policy(&field.privacy, context)?;
        check_policy(&field.write_privacy, context)?;
        check_description(&field.description, context)?;
        if !names.insert(field.name.as_str()) || !code_names.insert(field.code_name.as_str()) {
            return Err(CodegenError::schema(format!(
                "{context}: field '{}' is defined more than once",
                field.name
            )));
        }
    }
    Ok(())
}

/// Policy names are emitted inside string literals of the generated sources.
fn check_policy(policy: &PolicyRef, context: &str) -> CodegenResult<()> {
    if !POLICY_NAME.is_match(policy.as_str()) {
        return Err(CodegenError::schema(format!(
            "{context}: privacy policy '{policy}' must be an identifier or a path"
        )));
    }
    Ok(())
}

fn check_edge_privacy(privacy: &EdgePrivacy, context: &str) -> CodegenResult<()> {
    for policy in [&privacy.forward, &privacy.reverse, &privacy.write, &privacy.delete] {
        check_policy(policy, context)?;
    }
    Ok(())
}

fn check_description(description: &str, context: &str) -> CodegenResult<()> {
    if description.contains(RAW_STRING_END) {
        return Err(CodegenError::schema(format!(
            "{context}: description must not contain '{RAW_STRING_END}'"
        )));
    }
    Ok(())
}

fn check_graphql_exposure(exposure: &GraphQlEdgeExposure, context: &str) -> CodegenResult<()> {
    let mut names = vec![exposure.field_name.as_str()];
    check_description(&exposure.description, context)?;
    if let Some(reverse) = &exposure.reverse {
        names.push(reverse.field_name.as_str());
        check_description(&reverse.description, context)?;
    }
    for name in names {
        if !GRAPHQL_FIELD.is_match(name) {
            return Err(CodegenError::schema(format!(
                "{context}: GraphQL field '{name}' must be camelCase"
            )));
        }
        let accessor = snake_case(name);
        if is_keyword(&accessor) {
            return Err(CodegenError::schema(format!(
                "{context}: GraphQL field '{name}' would generate the keyword '{accessor}' as a resolver method"
            )));
        }
    }
    Ok(())
}
