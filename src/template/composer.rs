//! Template composer
//!
//! Turns one schema entity into the unformatted text of one artifact. Every
//! artifact family has a fixed list of sections; generated sections are Tera
//! templates rendered against a view of the entity, manual sections are empty
//! placeholders that the manual-section extractor fills in afterwards.

use std::collections::HashMap;
use std::path::PathBuf;
use strum::{Display, EnumIter, IntoEnumIterator};
use tera::{Context, Tera, Value};

use super::naming::{snake_case, NamingContext};
use super::sources::*;
use super::views::{EdgeView, GqlNodeView, GraphQlView, NodeView};
use crate::codegen::manual;
use crate::error::{CodegenError, CodegenResult};
use crate::schema::{EdgeId, EdgePointerIndex, GraphQlSchema, NodeId, SchemaGraph};

// =============================================================================
// SECTIONS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Generated { source: &'static str },
    Manual { tag: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    pub name: &'static str,
    pub kind: SectionKind,
}

const fn generated(name: &'static str, source: &'static str) -> Section {
    Section {
        name,
        kind: SectionKind::Generated { source },
    }
}

const fn manual_section(tag: &'static str) -> Section {
    Section {
        name: tag,
        kind: SectionKind::Manual { tag },
    }
}

const MODEL_NODE_SECTIONS: &[Section] = &[
    generated("header", HEADER),
    generated("module_docs", MODEL_NODE_DOCS),
    generated("imports", MODEL_NODE_IMPORTS),
    manual_section("imports"),
    generated("type_definition", MODEL_NODE_TYPE),
    generated("query_builder", MODEL_NODE_QUERY),
    generated("mutator", MODEL_NODE_MUTATOR),
    generated("deleter", MODEL_NODE_DELETER),
    manual_section("extra"),
];

const MODEL_EDGE_SECTIONS: &[Section] = &[
    generated("header", HEADER),
    generated("module_docs", MODEL_EDGE_DOCS),
    generated("imports", MODEL_EDGE_IMPORTS),
    manual_section("imports"),
    generated("type_definition", MODEL_EDGE_TYPE),
    generated("query_builder", MODEL_EDGE_QUERY),
    generated("mutator", MODEL_EDGE_MUTATOR),
    generated("deleter", MODEL_EDGE_DELETER),
    manual_section("extra"),
];

const LOGIC_NODE_SECTIONS: &[Section] = &[
    generated("header", HEADER),
    generated("module_docs", LOGIC_NODE_DOCS),
    generated("imports", LOGIC_NODE_IMPORTS),
    manual_section("imports"),
    manual_section("extra_functions"),
    generated("generated_functions_tag", GENERATED_FUNCTIONS_TAG),
    generated("auth_check", LOGIC_NODE_AUTH),
    generated("field_getters", LOGIC_NODE_GETTERS),
    generated("get_by_id", LOGIC_NODE_GET_BY_ID),
    generated("batch_get_by_id", LOGIC_NODE_BATCH),
    generated("connected_nodes", LOGIC_NODE_CONNECTED),
];

const LOGIC_EDGE_SECTIONS: &[Section] = &[
    generated("header", HEADER),
    generated("module_docs", LOGIC_EDGE_DOCS),
    generated("imports", LOGIC_EDGE_IMPORTS),
    manual_section("imports"),
    manual_section("extra_functions"),
    generated("generated_functions_tag", GENERATED_FUNCTIONS_TAG),
    generated("auth_check", LOGIC_EDGE_AUTH),
    generated("field_getters", LOGIC_EDGE_GETTERS),
    generated("get_by_ids", LOGIC_EDGE_GET_BY_IDS),
    generated("batch_get_by_ids", LOGIC_EDGE_BATCH),
];

const GRAPHQL_SCHEMA_SECTIONS: &[Section] = &[
    generated("header", HEADER),
    generated("module_docs", GRAPHQL_SCHEMA_DOCS),
    generated("imports", GRAPHQL_SCHEMA_IMPORTS),
    manual_section("imports"),
    manual_section("extra_functions"),
    generated("generated_functions_tag", GENERATED_FUNCTIONS_TAG),
    generated("schema_string", GRAPHQL_SCHEMA_SDL),
];

const GRAPHQL_RESOLVER_SECTIONS: &[Section] = &[
    generated("header", HEADER),
    generated("module_docs", GRAPHQL_RESOLVER_DOCS),
    generated("imports", GRAPHQL_RESOLVER_IMPORTS),
    manual_section("imports"),
    manual_section("extra_functions"),
    generated("generated_functions_tag", GENERATED_FUNCTIONS_TAG),
    generated("resolver", GRAPHQL_RESOLVER_TYPE),
];

const GRAPHQL_DATALOADER_SECTIONS: &[Section] = &[
    generated("header", HEADER),
    generated("module_docs", GRAPHQL_DATALOADER_DOCS),
    generated("imports", GRAPHQL_DATALOADER_IMPORTS),
    manual_section("imports"),
    manual_section("extra_functions"),
    generated("generated_functions_tag", GENERATED_FUNCTIONS_TAG),
    generated("batcher", GRAPHQL_DATALOADER_BATCHER),
];

// =============================================================================
// FAMILIES AND ENTITIES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum ArtifactFamily {
    ModelNode,
    ModelEdge,
    LogicNode,
    LogicEdge,
    #[strum(to_string = "graphql_schema")]
    GraphQlSchema,
    #[strum(to_string = "graphql_node_resolver")]
    GraphQlNodeResolver,
    #[strum(to_string = "graphql_dataloader")]
    GraphQlDataloader,
}

impl ArtifactFamily {
    pub fn sections(self) -> &'static [Section] {
        match self {
            ArtifactFamily::ModelNode => MODEL_NODE_SECTIONS,
            ArtifactFamily::ModelEdge => MODEL_EDGE_SECTIONS,
            ArtifactFamily::LogicNode => LOGIC_NODE_SECTIONS,
            ArtifactFamily::LogicEdge => LOGIC_EDGE_SECTIONS,
            ArtifactFamily::GraphQlSchema => GRAPHQL_SCHEMA_SECTIONS,
            ArtifactFamily::GraphQlNodeResolver => GRAPHQL_RESOLVER_SECTIONS,
            ArtifactFamily::GraphQlDataloader => GRAPHQL_DATALOADER_SECTIONS,
        }
    }

    fn template_name(self, section: &Section) -> String {
        format!("{self}/{}", section.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Node(NodeId),
    Edge(EdgeId),
    /// Artifacts built from the whole schema.
    Schema,
}

/// Everything derived from the schema once per run and shared by all artifacts.
#[derive(Clone, Copy)]
pub struct SchemaContext<'a> {
    pub graph: &'a SchemaGraph,
    pub pointers: &'a EdgePointerIndex,
    pub graphql: &'a GraphQlSchema,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedArtifact {
    pub family: ArtifactFamily,
    /// Relative to the destination root.
    pub path: PathBuf,
    pub text: String,
}

// =============================================================================
// COMPOSER
// =============================================================================

pub struct TemplateComposer {
    tera: Tera,
    naming: NamingContext,
}

impl TemplateComposer {
    pub fn new(naming: NamingContext) -> CodegenResult<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(Vec::new());

        for family in ArtifactFamily::iter() {
            for section in family.sections() {
                if let SectionKind::Generated { source } = section.kind {
                    let name = family.template_name(section);
                    tera.add_raw_template(&name, source)
                        .map_err(|source| CodegenError::TemplateRender {
                            template: name.clone(),
                            source,
                        })?;
                }
            }
        }
        tera.register_function("manual", manual_placeholder);

        Ok(Self { tera, naming })
    }

    /// Destination-relative path of the artifact `family` builds for `entity`.
    pub fn artifact_path(
        &self,
        graph: &SchemaGraph,
        family: ArtifactFamily,
        entity: Entity,
    ) -> CodegenResult<PathBuf> {
        let naming = &self.naming;
        let path = match (family, entity) {
            (ArtifactFamily::ModelNode, Entity::Node(id)) => PathBuf::from(&naming.models_module)
                .join(format!("{}_node.rs", snake_case(&graph.node(id).name))),
            (ArtifactFamily::ModelEdge, Entity::Edge(id)) => PathBuf::from(&naming.models_module)
                .join(format!("{}_edge.rs", snake_case(&graph.edge(id).code_name))),
            (ArtifactFamily::LogicNode, Entity::Node(id)) => PathBuf::from(&naming.logic_module)
                .join(format!("{}.rs", snake_case(&graph.node(id).name))),
            (ArtifactFamily::LogicEdge, Entity::Edge(id)) => PathBuf::from(&naming.logic_module)
                .join(format!("{}.rs", snake_case(&graph.edge(id).code_name))),
            (ArtifactFamily::GraphQlSchema, Entity::Schema) => {
                PathBuf::from(&naming.graphql_module).join("schema.rs")
            }
            (ArtifactFamily::GraphQlNodeResolver, Entity::Node(id)) => {
                PathBuf::from(&naming.graphql_module)
                    .join("resolvers")
                    .join(format!("type_{}.rs", snake_case(&graph.node(id).name)))
            }
            (ArtifactFamily::GraphQlDataloader, Entity::Schema) => {
                PathBuf::from(&naming.graphql_module)
                    .join("resolvers")
                    .join("dataloader_batcher.rs")
            }
            (family, entity) => return Err(mismatched(family, entity)),
        };
        Ok(path)
    }

    /// Render every section of `family` for `entity`, joined by newlines. Manual
    /// sections come out as empty placeholders.
    pub fn compose(
        &self,
        schema: SchemaContext<'_>,
        family: ArtifactFamily,
        entity: Entity,
    ) -> CodegenResult<ComposedArtifact> {
        let context = self.context(schema, family, entity)?;

        let mut parts = Vec::with_capacity(family.sections().len());
        for section in family.sections() {
            let text = match section.kind {
                SectionKind::Generated { .. } => {
                    let name = family.template_name(section);
                    self.tera
                        .render(&name, &context)
                        .map_err(|source| CodegenError::TemplateRender {
                            template: name,
                            source,
                        })?
                }
                SectionKind::Manual { tag } => {
                    format!("{}\n", manual::placeholder(Some(tag), ""))
                }
            };
            parts.push(text);
        }

        Ok(ComposedArtifact {
            family,
            path: self.artifact_path(schema.graph, family, entity)?,
            text: parts.join("\n"),
        })
    }

    fn context(
        &self,
        schema: SchemaContext<'_>,
        family: ArtifactFamily,
        entity: Entity,
    ) -> CodegenResult<Context> {
        let graph = schema.graph;
        let naming = &self.naming;
        let mut context = Context::new();
        context.insert("naming", naming);

        let label = match (family, entity) {
            (ArtifactFamily::ModelNode | ArtifactFamily::LogicNode, Entity::Node(id)) => {
                context.insert("node", &NodeView::new(graph, schema.pointers, naming, id));
                let layer = if family == ArtifactFamily::ModelNode { "model" } else { "logic" };
                format!("{layer} for the {} node", graph.node(id).name)
            }
            (ArtifactFamily::ModelEdge | ArtifactFamily::LogicEdge, Entity::Edge(id)) => {
                context.insert("edge", &EdgeView::new(graph, naming, id));
                let layer = if family == ArtifactFamily::ModelEdge { "model" } else { "logic" };
                format!("{layer} for the {} edge", graph.edge(id).name)
            }
            (ArtifactFamily::GraphQlNodeResolver, Entity::Node(id)) => {
                let node = schema.graphql.node(id).ok_or_else(|| {
                    CodegenError::schema(format!(
                        "node '{}' is not exposed to GraphQL",
                        graph.node(id).name
                    ))
                })?;
                context.insert("node", &GqlNodeView::new(node, naming));
                format!("GraphQL resolver for the {} type", node.name)
            }
            (ArtifactFamily::GraphQlSchema | ArtifactFamily::GraphQlDataloader, Entity::Schema) => {
                context.insert("schema", &GraphQlView::new(schema.graphql, graph, naming));
                if family == ArtifactFamily::GraphQlSchema {
                    "GraphQL schema".to_string()
                } else {
                    "dataloader batcher".to_string()
                }
            }
            (family, entity) => return Err(mismatched(family, entity)),
        };
        context.insert("artifact_label", &label);
        Ok(context)
    }
}

fn mismatched(family: ArtifactFamily, entity: Entity) -> CodegenError {
    CodegenError::schema(format!("{family} artifacts cannot be built for {entity:?}"))
}

/// `manual(tag="...", indent="...")`: an empty manual placeholder inside a
/// generated section.
fn manual_placeholder(args: &HashMap<String, Value>) -> tera::Result<Value> {
    let tag = args.get("tag").and_then(Value::as_str);
    let indent = args.get("indent").and_then(Value::as_str).unwrap_or("");
    Ok(Value::String(manual::placeholder(tag, indent)))
}
