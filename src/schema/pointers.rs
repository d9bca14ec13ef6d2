//! Reverse-edge ("edge pointer") index.
//!
//! An edge pointer is the inbound view of an edge, registered on the edge's
//! destination node. The index is built once per run through
//! [`EdgePointerIndexBuilder`] and is read-only afterwards; composers receive it
//! by reference and never see a half-built index.

use std::collections::HashSet;

use super::graph::{EdgeId, NodeId, SchemaGraph};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgePointer {
    pub edge: EdgeId,
    pub name: String,
    pub code_name: String,
    /// Node that declares the edge.
    pub from: NodeId,
}

pub struct EdgePointerIndexBuilder<'g> {
    graph: &'g SchemaGraph,
    by_node: Vec<Vec<EdgePointer>>,
    registered: HashSet<String>,
}

impl<'g> EdgePointerIndexBuilder<'g> {
    pub fn new(graph: &'g SchemaGraph) -> Self {
        Self {
            graph,
            by_node: vec![Vec::new(); graph.node_count()],
            registered: HashSet::new(),
        }
    }

    /// Register the pointer for `edge` on its destination node.
    ///
    /// Returns `false` when a pointer with the same edge code name is already
    /// registered; the index is left unchanged in that case.
    pub fn add_edge_pointer(&mut self, edge: EdgeId) -> bool {
        let spec = self.graph.edge(edge);
        if !self.registered.insert(spec.code_name.clone()) {
            tracing::trace!(edge = %spec.code_name, "edge pointer already registered");
            return false;
        }
        self.by_node[spec.to.index()].push(EdgePointer {
            edge,
            name: spec.name.clone(),
            code_name: spec.code_name.clone(),
            from: spec.from,
        });
        true
    }

    pub fn finish(self) -> EdgePointerIndex {
        EdgePointerIndex {
            by_node: self.by_node,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EdgePointerIndex {
    by_node: Vec<Vec<EdgePointer>>,
}

impl EdgePointerIndex {
    /// Register every edge of `graph` in traversal order.
    pub fn build(graph: &SchemaGraph) -> Self {
        let mut builder = EdgePointerIndexBuilder::new(graph);
        for (id, _) in graph.edges() {
            builder.add_edge_pointer(id);
        }
        builder.finish()
    }

    /// Pointers registered on `node`, in registration order.
    pub fn pointers(&self, node: NodeId) -> &[EdgePointer] {
        self.by_node
            .get(node.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.by_node.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
