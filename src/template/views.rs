//! Serializable template contexts.
//!
//! Views flatten the schema into plain, `Vec`-backed records with every derived
//! name precomputed, so templates only interpolate and iterate. Iteration order
//! always follows the schema graph, which keeps rendering deterministic.

use serde::Serialize;

use super::naming::{lower_camel_case, snake_case, NamingContext};
use crate::schema::{
    BatchKind, EdgeId, EdgePointer, EdgeSpec, FieldSpec, GraphQlEdge, GraphQlField, GraphQlNode,
    GraphQlSchema, NodeId, SchemaGraph,
};
use crate::schema::pointers::EdgePointerIndex;

/// Collapse whitespace so a description fits on one comment line.
fn one_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldView {
    pub name: String,
    pub code_name: String,
    pub rust_type: &'static str,
    pub default_expr: String,
    pub description: String,
    pub privacy: String,
    pub write_privacy: String,
    pub unique: bool,
    pub indexed: bool,
}

impl FieldView {
    fn new(field: &FieldSpec) -> Self {
        Self {
            name: field.name.clone(),
            code_name: field.code_name.clone(),
            rust_type: field.field_type.rust_type(),
            default_expr: field.default_expr().to_string(),
            description: one_line(&field.description),
            privacy: field.privacy.to_string(),
            write_privacy: field.write_privacy.to_string(),
            unique: field.unique,
            indexed: field.indexed,
        }
    }

    fn all(fields: &[FieldSpec]) -> Vec<Self> {
        fields.iter().map(Self::new).collect()
    }
}

/// Names under which one node is reachable from generated code.
#[derive(Debug, Clone, Serialize)]
pub struct NodeNames {
    pub name: String,
    pub snake: String,
    pub model_path: String,
    pub model_type: String,
    pub query_type: String,
    pub mutator_type: String,
    pub deleter_type: String,
    pub logic_path: String,
    pub logic_type: String,
}

impl NodeNames {
    pub fn new(name: &str, naming: &NamingContext) -> Self {
        let snake = snake_case(name);
        Self {
            model_path: format!("crate::{}::{snake}_node", naming.models_module),
            logic_path: format!("crate::{}::{snake}", naming.logic_module),
            model_type: format!("{name}Node"),
            query_type: format!("{name}NodeQuery"),
            mutator_type: format!("{name}NodeMutator"),
            deleter_type: format!("{name}NodeDeleter"),
            logic_type: name.to_string(),
            name: name.to_string(),
            snake,
        }
    }
}

/// Names under which one edge is reachable from generated code.
#[derive(Debug, Clone, Serialize)]
pub struct EdgeNames {
    /// Store label.
    pub name: String,
    pub code_name: String,
    pub snake: String,
    pub model_path: String,
    pub model_type: String,
    pub query_type: String,
    pub mutator_type: String,
    pub deleter_type: String,
    pub logic_path: String,
    pub logic_type: String,
}

impl EdgeNames {
    pub fn new(edge: &EdgeSpec, naming: &NamingContext) -> Self {
        let code_name = &edge.code_name;
        let snake = snake_case(code_name);
        Self {
            model_path: format!("crate::{}::{snake}_edge", naming.models_module),
            logic_path: format!("crate::{}::{snake}", naming.logic_module),
            model_type: format!("{code_name}Edge"),
            query_type: format!("{code_name}EdgeQuery"),
            mutator_type: format!("{code_name}EdgeMutator"),
            deleter_type: format!("{code_name}EdgeDeleter"),
            logic_type: code_name.clone(),
            name: edge.name.clone(),
            code_name: code_name.clone(),
            snake,
        }
    }
}

/// An edge seen from one of its endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct EdgeRefView {
    #[serde(flatten)]
    pub edge: EdgeNames,
    /// Method name on the owning node's logic type.
    pub method: String,
    /// Policy guarding traversal in this direction.
    pub privacy: String,
    /// Node at the other end.
    pub other: NodeNames,
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeView {
    #[serde(flatten)]
    pub names: NodeNames,
    pub description: String,
    pub deletion_privacy: String,
    pub fields: Vec<FieldView>,
    /// Outgoing edges.
    pub edges: Vec<EdgeRefView>,
    /// Incoming edges, from the pointer index.
    pub pointers: Vec<EdgeRefView>,
}

impl NodeView {
    pub fn new(
        graph: &SchemaGraph,
        pointers: &EdgePointerIndex,
        naming: &NamingContext,
        id: NodeId,
    ) -> Self {
        let node = graph.node(id);
        let edges = graph
            .outgoing(id)
            .map(|(_, edge)| {
                let names = EdgeNames::new(edge, naming);
                EdgeRefView {
                    method: names.snake.clone(),
                    privacy: edge.privacy.forward.to_string(),
                    other: NodeNames::new(&graph.node(edge.to).name, naming),
                    edge: names,
                }
            })
            .collect();
        let pointers = pointers
            .pointers(id)
            .iter()
            .map(|pointer: &EdgePointer| {
                let edge = graph.edge(pointer.edge);
                let names = EdgeNames::new(edge, naming);
                EdgeRefView {
                    method: format!("inbound_{}", names.snake),
                    privacy: edge.privacy.reverse.to_string(),
                    other: NodeNames::new(&graph.node(pointer.from).name, naming),
                    edge: names,
                }
            })
            .collect();

        Self {
            names: NodeNames::new(&node.name, naming),
            description: one_line(&node.description),
            deletion_privacy: node.deletion_privacy.to_string(),
            fields: FieldView::all(&node.fields),
            edges,
            pointers,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PrivacyView {
    pub forward: String,
    pub reverse: String,
    pub write: String,
    pub delete: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EdgeView {
    #[serde(flatten)]
    pub names: EdgeNames,
    pub from: NodeNames,
    pub to: NodeNames,
    pub fields: Vec<FieldView>,
    pub privacy: PrivacyView,
}

impl EdgeView {
    pub fn new(graph: &SchemaGraph, naming: &NamingContext, id: EdgeId) -> Self {
        let edge = graph.edge(id);
        Self {
            names: EdgeNames::new(edge, naming),
            from: NodeNames::new(&graph.node(edge.from).name, naming),
            to: NodeNames::new(&graph.node(edge.to).name, naming),
            fields: FieldView::all(&edge.fields),
            privacy: PrivacyView {
                forward: edge.privacy.forward.to_string(),
                reverse: edge.privacy.reverse.to_string(),
                write: edge.privacy.write.to_string(),
                delete: edge.privacy.delete.to_string(),
            },
        }
    }
}

// =============================================================================
// GRAPHQL
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct GqlFieldView {
    pub name: String,
    pub accessor: String,
    pub graphql_type: &'static str,
    pub rust_type: &'static str,
    pub description: String,
}

impl GqlFieldView {
    fn new(field: &GraphQlField) -> Self {
        Self {
            name: field.name.clone(),
            accessor: field.accessor.clone(),
            graphql_type: field.graphql_type,
            rust_type: field.rust_type,
            description: one_line(&field.description),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GqlEdgeView {
    pub field_name: String,
    pub accessor: String,
    pub description: String,
    pub connection_type: String,
    pub edge_type: String,
    pub to: String,
    pub to_resolver_path: String,
    pub batch_key: String,
    pub order_by: Option<String>,
    pub fields: Vec<GqlFieldView>,
    pub is_reverse: bool,
}

impl GqlEdgeView {
    fn new(edge: &GraphQlEdge, naming: &NamingContext) -> Self {
        Self {
            field_name: edge.field_name.clone(),
            accessor: edge.accessor.clone(),
            description: one_line(&edge.description),
            connection_type: edge.connection_type(),
            edge_type: edge.edge_type(),
            to: edge.to.clone(),
            to_resolver_path: resolver_path(&edge.to, naming),
            batch_key: edge.batch_key(),
            order_by: edge.order_by.clone(),
            fields: edge.fields.iter().map(GqlFieldView::new).collect(),
            is_reverse: edge.is_reverse,
        }
    }
}

fn resolver_path(node: &str, naming: &NamingContext) -> String {
    format!(
        "crate::{}::resolvers::type_{}::{node}Resolver",
        naming.graphql_module,
        snake_case(node)
    )
}

#[derive(Debug, Clone, Serialize)]
pub struct GqlNodeView {
    pub name: String,
    pub snake: String,
    /// Root query field name.
    pub query_name: String,
    pub description: String,
    pub logic_path: String,
    pub logic_type: String,
    pub resolver_type: String,
    pub fields: Vec<GqlFieldView>,
    pub edges: Vec<GqlEdgeView>,
}

impl GqlNodeView {
    pub fn new(node: &GraphQlNode, naming: &NamingContext) -> Self {
        let names = NodeNames::new(&node.name, naming);
        Self {
            query_name: lower_camel_case(&names.snake),
            description: one_line(&node.description),
            logic_path: names.logic_path,
            logic_type: names.logic_type,
            resolver_type: format!("{}Resolver", node.name),
            fields: node.fields.iter().map(GqlFieldView::new).collect(),
            edges: node
                .edges
                .iter()
                .map(|edge| GqlEdgeView::new(edge, naming))
                .collect(),
            name: names.name,
            snake: names.snake,
        }
    }
}

/// One arm of the dataloader batcher.
#[derive(Debug, Clone, Serialize)]
pub struct BatchView {
    pub key: String,
    /// `node`, `node_to_node` or `edge_field`.
    pub kind: &'static str,
    pub logic_path: String,
    pub logic_type: String,
    pub method: String,
}

impl BatchView {
    fn new(kind: &BatchKind, graph: &SchemaGraph, naming: &NamingContext) -> Self {
        match kind {
            BatchKind::Node { node } => {
                let names = NodeNames::new(node, naming);
                Self {
                    key: kind.key().to_string(),
                    kind: "node",
                    logic_path: names.logic_path,
                    logic_type: names.logic_type,
                    method: "get_by_id_batcher".to_string(),
                }
            }
            BatchKind::NodeToNode {
                from, logic_method, ..
            } => {
                let names = NodeNames::new(from, naming);
                Self {
                    key: kind.key().to_string(),
                    kind: "node_to_node",
                    logic_path: names.logic_path,
                    logic_type: names.logic_type,
                    method: format!("{logic_method}_batcher"),
                }
            }
            BatchKind::EdgeField { edge_code_name } => {
                let (logic_path, logic_type) = graph
                    .edge_id(edge_code_name)
                    .map(|id| {
                        let names = EdgeNames::new(graph.edge(id), naming);
                        (names.logic_path, names.logic_type)
                    })
                    .unwrap_or_else(|| {
                        (
                            format!("crate::{}::{}", naming.logic_module, snake_case(edge_code_name)),
                            edge_code_name.clone(),
                        )
                    });
                Self {
                    key: kind.key().to_string(),
                    kind: "edge_field",
                    logic_path,
                    logic_type,
                    method: "get_by_ids_batcher".to_string(),
                }
            }
        }
    }
}

/// Whole-schema view for the SDL and the dataloader batcher.
#[derive(Debug, Clone, Serialize)]
pub struct GraphQlView {
    pub nodes: Vec<GqlNodeView>,
    /// One entry per distinct connection type.
    pub connections: Vec<GqlEdgeView>,
    pub batches: Vec<BatchView>,
}

impl GraphQlView {
    pub fn new(projection: &GraphQlSchema, graph: &SchemaGraph, naming: &NamingContext) -> Self {
        Self {
            nodes: projection
                .nodes
                .iter()
                .map(|node| GqlNodeView::new(node, naming))
                .collect(),
            connections: projection
                .connection_edges()
                .into_iter()
                .map(|edge| GqlEdgeView::new(edge, naming))
                .collect(),
            batches: projection
                .batch_kinds
                .iter()
                .map(|kind| BatchView::new(kind, graph, naming))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{EdgeDefinition, NodeDefinition, SchemaDefinition};

    #[test]
    fn test_node_view_lists_outgoing_edges_and_pointers() {
        let graph = SchemaGraph::build(SchemaDefinition {
            nodes: vec![NodeDefinition {
                name: "User".to_string(),
                description: "A person\n  using the app.".to_string(),
                edges: vec![EdgeDefinition {
                    name: "FRIENDS_WITH".to_string(),
                    code_name: "FriendsWith".to_string(),
                    to: "User".to_string(),
                    ..EdgeDefinition::default()
                }],
                ..NodeDefinition::default()
            }],
        })
        .unwrap();
        let pointers = EdgePointerIndex::build(&graph);
        let naming = NamingContext::default();
        let user = graph.node_id("User").unwrap();

        let view = NodeView::new(&graph, &pointers, &naming, user);

        assert_eq!(view.description, "A person using the app.");
        assert_eq!(view.names.model_path, "crate::models::user_node");
        assert_eq!(view.edges[0].method, "friends_with");
        assert_eq!(view.pointers[0].method, "inbound_friends_with");
        assert_eq!(view.edges[0].edge.model_type, "FriendsWithEdge");

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["model_type"], "UserNode");
        assert_eq!(json["edges"][0]["query_type"], "FriendsWithEdgeQuery");
    }
}
