//! Constraint and index documents
//!
//! Two JSON side artifacts consumed by the store's migration tooling. They carry
//! no signature and no manual sections, and are rewritten in full on every run.

use serde::Serialize;

use crate::schema::SchemaGraph;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeProperties {
    #[serde(rename = "type")]
    pub type_name: String,
    pub properties: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstraintDocument {
    pub nodes: Vec<TypeProperties>,
    pub edges: Vec<TypeProperties>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexDocument {
    pub nodes: Vec<TypeProperties>,
}

impl ConstraintDocument {
    /// Unique properties of every node and edge type; types without any are listed empty.
    pub fn from_graph(graph: &SchemaGraph) -> Self {
        let nodes = graph
            .nodes()
            .map(|(_, node)| TypeProperties {
                type_name: node.name.clone(),
                properties: node
                    .fields
                    .iter()
                    .filter(|field| field.unique)
                    .map(|field| field.name.clone())
                    .collect(),
            })
            .collect();
        let edges = graph
            .edges()
            .map(|(_, edge)| TypeProperties {
                type_name: edge.name.clone(),
                properties: edge
                    .fields
                    .iter()
                    .filter(|field| field.unique)
                    .map(|field| field.name.clone())
                    .collect(),
            })
            .collect();
        Self { nodes, edges }
    }
}

impl IndexDocument {
    pub fn from_graph(graph: &SchemaGraph) -> Self {
        let nodes = graph
            .nodes()
            .map(|(_, node)| TypeProperties {
                type_name: node.name.clone(),
                properties: node
                    .fields
                    .iter()
                    .filter(|field| field.indexed)
                    .map(|field| field.name.clone())
                    .collect(),
            })
            .collect();
        Self { nodes }
    }
}

/// Pretty JSON with a trailing newline.
pub fn render_json<T: Serialize>(document: &T) -> serde_json::Result<String> {
    let mut text = serde_json::to_string_pretty(document)?;
    text.push('\n');
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldSpec, FieldType, NodeDefinition, SchemaDefinition};

    fn graph() -> SchemaGraph {
        let mut email = FieldSpec::new("email", "Email", FieldType::String);
        email.unique = true;
        let mut age = FieldSpec::new("age", "Age", FieldType::Int);
        age.indexed = true;
        SchemaGraph::build(SchemaDefinition {
            nodes: vec![
                NodeDefinition {
                    name: "User".to_string(),
                    fields: vec![email, age],
                    ..NodeDefinition::default()
                },
                NodeDefinition {
                    name: "Group".to_string(),
                    ..NodeDefinition::default()
                },
            ],
        })
        .unwrap()
    }

    #[test]
    fn test_constraints_list_unique_fields() {
        let document = ConstraintDocument::from_graph(&graph());
        assert_eq!(document.nodes[0].properties, vec!["email"]);
        assert!(document.nodes[1].properties.is_empty());
        assert!(document.edges.is_empty());
    }

    #[test]
    fn test_indices_render_as_pretty_json() {
        let text = render_json(&IndexDocument::from_graph(&graph())).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["nodes"][0]["type"], "User");
        assert_eq!(value["nodes"][0]["properties"][0], "age");
        assert!(text.ends_with("}\n"));
        assert!(!text.starts_with("// @SignedSource"));
    }
}
