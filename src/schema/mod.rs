//! Schema model
//!
//! - **definition**: serde input structs loaded from YAML or JSON
//! - **graph**: the validated, immutable [`SchemaGraph`]
//! - **pointers**: the read-only reverse-edge index
//! - **graphql**: the GraphQL projection and dataloader batch kinds

pub mod definition;
pub mod graph;
pub mod graphql;
pub mod pointers;

pub use definition::{
    EdgeDefinition, EdgePrivacy, FieldSpec, FieldType, GraphQlEdgeExposure, GraphQlNodeExposure,
    GraphQlReverseExposure, NodeDefinition, PolicyRef, SchemaDefinition,
};
pub use graph::{EdgeId, EdgeSpec, NodeId, NodeSpec, SchemaGraph};
pub use graphql::{BatchKind, GraphQlEdge, GraphQlField, GraphQlNode, GraphQlSchema};
pub use pointers::{EdgePointer, EdgePointerIndex, EdgePointerIndexBuilder};
