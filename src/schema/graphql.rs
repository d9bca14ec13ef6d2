//! GraphQL projection of the schema graph.
//!
//! Only nodes and edges with a GraphQL exposure take part. An edge exposed with
//! `reverse` is materialized a second time on its destination node with the
//! endpoints swapped, so both directions can be traversed from the API.

use std::collections::HashSet;

use super::definition::FieldSpec;
use super::graph::{EdgeId, NodeId, SchemaGraph};
use crate::error::{CodegenError, CodegenResult};
use crate::template::naming::{lower_camel_case, snake_case};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphQlField {
    /// Name in the SDL (camelCase).
    pub name: String,
    /// Accessor name on the Rust side (snake_case storage name).
    pub accessor: String,
    pub graphql_type: &'static str,
    pub rust_type: &'static str,
    pub description: String,
}

impl GraphQlField {
    fn from_spec(field: &FieldSpec) -> Self {
        Self {
            name: lower_camel_case(&field.name),
            accessor: field.name.clone(),
            graphql_type: field.field_type.graphql_type(),
            rust_type: field.field_type.rust_type(),
            description: field.description.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphQlEdge {
    pub edge: EdgeId,
    /// Node the field is exposed on.
    pub from: String,
    /// Node the connection yields.
    pub to: String,
    pub field_name: String,
    /// Resolver method name (snake_case of `field_name`).
    pub accessor: String,
    /// Logic-layer method that loads the connected nodes.
    pub logic_method: String,
    pub edge_code_name: String,
    pub description: String,
    pub order_by: Option<String>,
    pub fields: Vec<GraphQlField>,
    pub is_reverse: bool,
}

impl GraphQlEdge {
    /// Name of the connection type in the SDL; shared by every exposure of the
    /// same edge between the same ordered pair of nodes.
    pub fn connection_type(&self) -> String {
        format!("{}{}{}Connection", self.from, self.edge_code_name, self.to)
    }

    pub fn edge_type(&self) -> String {
        format!("{}{}{}Edge", self.from, self.edge_code_name, self.to)
    }

    /// Dataloader key of the node-to-node batch for this field.
    pub fn batch_key(&self) -> String {
        format!("{}.{}", self.from, self.accessor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphQlNode {
    pub id: NodeId,
    pub name: String,
    pub description: String,
    pub fields: Vec<GraphQlField>,
    /// Forward and reverse exposures in materialization order.
    pub edges: Vec<GraphQlEdge>,
}

/// One kind of request the dataloader batcher can serve.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BatchKind {
    /// Fetch a node by id.
    Node { node: String },
    /// Fetch the nodes connected through one exposed field.
    NodeToNode {
        from: String,
        to: String,
        key: String,
        logic_method: String,
    },
    /// Fetch an edge by its endpoint ids.
    EdgeField { edge_code_name: String },
}

impl BatchKind {
    pub fn key(&self) -> &str {
        match self {
            BatchKind::Node { node } => node,
            BatchKind::NodeToNode { key, .. } => key,
            BatchKind::EdgeField { edge_code_name } => edge_code_name,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphQlSchema {
    pub nodes: Vec<GraphQlNode>,
    /// Every exposure, forward and reverse, in materialization order.
    pub edges: Vec<GraphQlEdge>,
    pub batch_kinds: Vec<BatchKind>,
}

impl GraphQlSchema {
    pub fn build(graph: &SchemaGraph) -> CodegenResult<Self> {
        let mut nodes: Vec<GraphQlNode> = graph
            .nodes()
            .filter_map(|(id, node)| {
                node.graphql.as_ref().map(|exposure| GraphQlNode {
                    id,
                    name: node.name.clone(),
                    description: if exposure.description.is_empty() {
                        node.description.clone()
                    } else {
                        exposure.description.clone()
                    },
                    fields: node.fields.iter().map(GraphQlField::from_spec).collect(),
                    edges: Vec::new(),
                })
            })
            .collect();

        let mut edges = Vec::new();
        for (edge_id, edge) in graph.edges() {
            let Some(exposure) = &edge.graphql else {
                continue;
            };
            let from = graph.node(edge.from);
            let to = graph.node(edge.to);
            let fields: Vec<GraphQlField> = edge.fields.iter().map(GraphQlField::from_spec).collect();

            let forward = GraphQlEdge {
                edge: edge_id,
                from: from.name.clone(),
                to: to.name.clone(),
                field_name: exposure.field_name.clone(),
                accessor: snake_case(&exposure.field_name),
                logic_method: snake_case(&edge.code_name),
                edge_code_name: edge.code_name.clone(),
                description: exposure.description.clone(),
                order_by: exposure.order_by.clone(),
                fields: fields.clone(),
                is_reverse: false,
            };
            push_onto(&mut nodes, &forward)?;
            edges.push(forward);

            if let Some(reverse) = &exposure.reverse {
                let materialized = GraphQlEdge {
                    edge: edge_id,
                    from: to.name.clone(),
                    to: from.name.clone(),
                    field_name: reverse.field_name.clone(),
                    accessor: snake_case(&reverse.field_name),
                    logic_method: format!("inbound_{}", snake_case(&edge.code_name)),
                    edge_code_name: edge.code_name.clone(),
                    description: reverse.description.clone(),
                    order_by: reverse.order_by.clone(),
                    fields,
                    is_reverse: true,
                };
                push_onto(&mut nodes, &materialized)?;
                edges.push(materialized);
            }
        }

        for node in &nodes {
            check_unique_fields(node)?;
        }

        let batch_kinds = batch_kinds(&nodes, &edges);
        Ok(Self {
            nodes,
            edges,
            batch_kinds,
        })
    }

    pub fn node(&self, id: NodeId) -> Option<&GraphQlNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Exposures deduplicated by connection type, in first-seen order.
    pub fn connection_edges(&self) -> Vec<&GraphQlEdge> {
        let mut seen = HashSet::new();
        self.edges
            .iter()
            .filter(|edge| seen.insert(edge.connection_type()))
            .collect()
    }
}

fn push_onto(nodes: &mut [GraphQlNode], edge: &GraphQlEdge) -> CodegenResult<()> {
    let owner = nodes
        .iter_mut()
        .find(|node| node.name == edge.from)
        .ok_or_else(|| {
            CodegenError::schema(format!(
                "graphql edge '{}' has no opposite node '{}'",
                edge.edge_code_name, edge.from
            ))
        })?;
    owner.edges.push(edge.clone());
    Ok(())
}

fn check_unique_fields(node: &GraphQlNode) -> CodegenResult<()> {
    let mut names = HashSet::from(["id"]);
    let sdl_names = node
        .fields
        .iter()
        .map(|field| field.name.as_str())
        .chain(node.edges.iter().map(|edge| edge.field_name.as_str()));
    for name in sdl_names {
        if !names.insert(name) {
            return Err(CodegenError::schema(format!(
                "GraphQL type '{}' exposes field '{name}' more than once",
                node.name
            )));
        }
    }

    let mut accessors = HashSet::from(["id"]);
    let rust_names = node
        .fields
        .iter()
        .map(|field| field.accessor.as_str())
        .chain(node.edges.iter().map(|edge| edge.accessor.as_str()));
    for accessor in rust_names {
        if !accessors.insert(accessor) {
            return Err(CodegenError::schema(format!(
                "GraphQL type '{}' has two resolver methods named '{accessor}'",
                node.name
            )));
        }
    }
    Ok(())
}

fn batch_kinds(nodes: &[GraphQlNode], edges: &[GraphQlEdge]) -> Vec<BatchKind> {
    let mut kinds: Vec<BatchKind> = nodes
        .iter()
        .map(|node| BatchKind::Node {
            node: node.name.clone(),
        })
        .collect();

    let mut seen_links = HashSet::new();
    for edge in edges {
        if seen_links.insert(edge.batch_key()) {
            kinds.push(BatchKind::NodeToNode {
                from: edge.from.clone(),
                to: edge.to.clone(),
                key: edge.batch_key(),
                logic_method: edge.logic_method.clone(),
            });
        }
    }

    let mut seen_edges = HashSet::new();
    for edge in edges {
        if seen_edges.insert(edge.edge_code_name.clone()) {
            kinds.push(BatchKind::EdgeField {
                edge_code_name: edge.edge_code_name.clone(),
            });
        }
    }
    kinds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::definition::{
        EdgeDefinition, FieldType, GraphQlEdgeExposure, GraphQlNodeExposure,
        GraphQlReverseExposure, NodeDefinition, SchemaDefinition,
    };

    fn exposed_graph() -> SchemaGraph {
        let friends = EdgeDefinition {
            name: "FRIENDS_WITH".to_string(),
            code_name: "FriendsWith".to_string(),
            to: "User".to_string(),
            graphql: Some(GraphQlEdgeExposure {
                field_name: "friends".to_string(),
                reverse: Some(GraphQlReverseExposure {
                    field_name: "friendOf".to_string(),
                    ..GraphQlReverseExposure::default()
                }),
                ..GraphQlEdgeExposure::default()
            }),
            ..EdgeDefinition::default()
        };
        let member_of = EdgeDefinition {
            name: "MEMBER_OF".to_string(),
            code_name: "MemberOf".to_string(),
            to: "Group".to_string(),
            graphql: Some(GraphQlEdgeExposure {
                field_name: "groups".to_string(),
                reverse: Some(GraphQlReverseExposure {
                    field_name: "members".to_string(),
                    ..GraphQlReverseExposure::default()
                }),
                ..GraphQlEdgeExposure::default()
            }),
            ..EdgeDefinition::default()
        };
        SchemaGraph::build(SchemaDefinition {
            nodes: vec![
                NodeDefinition {
                    name: "User".to_string(),
                    fields: vec![FieldSpec::new("created_at", "CreatedAt", FieldType::Int)],
                    edges: vec![friends, member_of],
                    graphql: Some(GraphQlNodeExposure::default()),
                    ..NodeDefinition::default()
                },
                NodeDefinition {
                    name: "Group".to_string(),
                    graphql: Some(GraphQlNodeExposure::default()),
                    ..NodeDefinition::default()
                },
            ],
        })
        .unwrap()
    }

    #[test]
    fn test_reverse_edges_are_materialized_on_destination() {
        let projection = GraphQlSchema::build(&exposed_graph()).unwrap();

        let group = &projection.nodes[1];
        assert_eq!(group.edges.len(), 1);
        assert_eq!(group.edges[0].field_name, "members");
        assert!(group.edges[0].is_reverse);
        assert_eq!(group.edges[0].to, "User");
        assert_eq!(group.edges[0].logic_method, "inbound_member_of");

        let user = &projection.nodes[0];
        let names: Vec<_> = user.edges.iter().map(|e| e.field_name.as_str()).collect();
        assert_eq!(names, vec!["friends", "friendOf", "groups"]);
        assert_eq!(user.fields[0].name, "createdAt");
    }

    #[test]
    fn test_connection_types_are_deduplicated() {
        let projection = GraphQlSchema::build(&exposed_graph()).unwrap();
        let connections: Vec<_> = projection
            .connection_edges()
            .iter()
            .map(|e| e.connection_type())
            .collect();
        assert_eq!(
            connections,
            vec![
                "UserFriendsWithUserConnection",
                "UserMemberOfGroupConnection",
                "GroupMemberOfUserConnection",
            ]
        );
    }

    #[test]
    fn test_batch_kinds_resolved_once() {
        let projection = GraphQlSchema::build(&exposed_graph()).unwrap();
        let keys: Vec<_> = projection.batch_kinds.iter().map(BatchKind::key).collect();
        assert_eq!(
            keys,
            vec![
                "User",
                "Group",
                "User.friends",
                "User.friend_of",
                "User.groups",
                "Group.members",
                "FriendsWith",
                "MemberOf",
            ]
        );
    }
}
