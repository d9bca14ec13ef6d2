//! Tera sources of every generated section.
//!
//! Loops use the `{%- for %}` / `{%- endfor %}` form with each repeated line
//! starting on a fresh line, so the rendered text needs no cleanup beyond
//! the canonical formatter.

// =============================================================================
// SHARED
// =============================================================================

pub const HEADER: &str = "\
// Autogenerated {{ artifact_label }} - regenerate with {{ naming.generator }}.
// Force regeneration by deleting the @SignedSource line.
";

pub const GENERATED_FUNCTIONS_TAG: &str = "// === GENERATED FUNCTIONS ===\n";

// =============================================================================
// MODELS: NODE
// =============================================================================

pub const MODEL_NODE_DOCS: &str = "\
//! Storage model and query builders for `{{ node.name }}` nodes.
{%- if node.description %}
//!
//! {{ node.description }}
{%- endif %}
";

pub const MODEL_NODE_IMPORTS: &str = "\
use {{ naming.runtime_crate }}::model::{Conn, Direction, Op, OrderDirection, Query, Record, Value};
use {{ naming.runtime_crate }}::Result;
";

pub const MODEL_NODE_TYPE: &str = r#"#[derive(Debug, Clone, PartialEq, Default)]
pub struct {{ node.model_type }} {
    pub id: String,
{%- for field in node.fields %}
{%- if field.description %}
    /// {{ field.description }}
{%- endif %}
    pub {{ field.name }}: {{ field.rust_type }},
{%- endfor %}
}

impl {{ node.model_type }} {
    pub const LABEL: &'static str = "{{ node.name }}";

    pub fn from_record(record: &Record) -> Result<Self> {
        Ok(Self {
            id: record.id()?,
{%- for field in node.fields %}
            {{ field.name }}: record.get_or("{{ field.name }}", {{ field.default_expr }})?,
{%- endfor %}
        })
    }
}
"#;

pub const MODEL_NODE_QUERY: &str = r#"/// Query builder over `{{ node.name }}` nodes.
#[derive(Debug, Clone)]
pub struct {{ node.query_type }} {
    query: Query,
}

impl {{ node.query_type }} {
    pub fn new() -> Self {
        Self::from_query(Query::match_node({{ node.model_type }}::LABEL))
    }

    pub fn from_query(query: Query) -> Self {
        Self { query }
    }

    pub fn where_id(mut self, op: Op, value: impl Into<Value>) -> Self {
        self.query.where_("id", op, value.into());
        self
    }
{%- for field in node.fields %}

    pub fn where_{{ field.name }}(mut self, op: Op, value: impl Into<Value>) -> Self {
        self.query.where_("{{ field.name }}", op, value.into());
        self
    }

    pub fn return_{{ field.name }}(mut self) -> Self {
        self.query.return_("{{ field.name }}");
        self
    }

    pub fn order_by_{{ field.name }}(mut self, direction: OrderDirection) -> Self {
        self.query.order_by("{{ field.name }}", direction);
        self
    }
{%- endfor %}
{%- for edge in node.edges %}

    /// Follow outgoing `{{ edge.name }}` edges.
    pub fn query_{{ edge.method }}(self) -> {{ edge.model_path }}::{{ edge.query_type }} {
        let query = self
            .query
            .traverse({{ edge.model_path }}::{{ edge.model_type }}::LABEL, Direction::Outgoing);
        {{ edge.model_path }}::{{ edge.query_type }}::from_query(query)
    }
{%- endfor %}
{%- for pointer in node.pointers %}

    /// Follow incoming `{{ pointer.name }}` edges.
    pub fn query_{{ pointer.method }}(self) -> {{ pointer.model_path }}::{{ pointer.query_type }} {
        let query = self
            .query
            .traverse({{ pointer.model_path }}::{{ pointer.model_type }}::LABEL, Direction::Incoming);
        {{ pointer.model_path }}::{{ pointer.query_type }}::from_query(query)
    }
{%- endfor %}

    pub fn build(self) -> Query {
        self.query
    }
}

impl Default for {{ node.query_type }} {
    fn default() -> Self {
        Self::new()
    }
}
"#;

pub const MODEL_NODE_MUTATOR: &str = r#"/// Creates or updates a `{{ node.name }}` node.
#[derive(Debug, Clone)]
pub struct {{ node.mutator_type }} {
    id: Option<String>,
    values: Vec<(&'static str, Value)>,
}

impl {{ node.mutator_type }} {
    /// Starts from the declared default of every field.
    pub fn create() -> Self {
        let mut values = Vec::new();
{%- for field in node.fields %}
        let default_{{ field.name }}: {{ field.rust_type }} = {{ field.default_expr }};
        values.push(("{{ field.name }}", Value::from(default_{{ field.name }})));
{%- endfor %}
        Self { id: None, values }
    }

    pub fn update(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            values: Vec::new(),
        }
    }
{%- for field in node.fields %}

    pub fn set_{{ field.name }}(mut self, value: {{ field.rust_type }}) -> Self {
        self.values.push(("{{ field.name }}", Value::from(value)));
        self
    }
{%- endfor %}

    pub fn execute(self, conn: &mut Conn) -> Result<{{ node.model_type }}> {
        let record = conn.upsert_node({{ node.model_type }}::LABEL, self.id.as_deref(), &self.values)?;
        {{ node.model_type }}::from_record(&record)
    }
}
"#;

pub const MODEL_NODE_DELETER: &str = r#"/// Deletes a `{{ node.name }}` node together with its edges.
#[derive(Debug, Clone)]
pub struct {{ node.deleter_type }} {
    id: String,
}

impl {{ node.deleter_type }} {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn execute(self, conn: &mut Conn) -> Result<()> {
        conn.delete_node({{ node.model_type }}::LABEL, &self.id)
    }
}
"#;

// =============================================================================
// MODELS: EDGE
// =============================================================================

pub const MODEL_EDGE_DOCS: &str = "\
//! Storage model and query builders for `{{ edge.name }}` edges
//! (`{{ edge.from.name }}` to `{{ edge.to.name }}`).
";

pub const MODEL_EDGE_IMPORTS: &str = "\
use {{ naming.runtime_crate }}::model::{Conn, Direction, Op, OrderDirection, Query, Record, Value};
use {{ naming.runtime_crate }}::Result;
";

pub const MODEL_EDGE_TYPE: &str = r#"#[derive(Debug, Clone, PartialEq, Default)]
pub struct {{ edge.model_type }} {
    pub from_id: String,
    pub to_id: String,
{%- for field in edge.fields %}
{%- if field.description %}
    /// {{ field.description }}
{%- endif %}
    pub {{ field.name }}: {{ field.rust_type }},
{%- endfor %}
}

impl {{ edge.model_type }} {
    pub const LABEL: &'static str = "{{ edge.name }}";
    pub const FROM: &'static str = "{{ edge.from.name }}";
    pub const TO: &'static str = "{{ edge.to.name }}";

    pub fn from_record(record: &Record) -> Result<Self> {
        Ok(Self {
            from_id: record.from_id()?,
            to_id: record.to_id()?,
{%- for field in edge.fields %}
            {{ field.name }}: record.get_or("{{ field.name }}", {{ field.default_expr }})?,
{%- endfor %}
        })
    }
}
"#;

pub const MODEL_EDGE_QUERY: &str = r#"/// Query builder over `{{ edge.name }}` edges.
#[derive(Debug, Clone)]
pub struct {{ edge.query_type }} {
    query: Query,
}

impl {{ edge.query_type }} {
    pub fn new() -> Self {
        Self::from_query(Query::match_edge({{ edge.model_type }}::LABEL))
    }

    pub fn from_query(query: Query) -> Self {
        Self { query }
    }
{%- for field in edge.fields %}

    pub fn where_{{ field.name }}(mut self, op: Op, value: impl Into<Value>) -> Self {
        self.query.where_("{{ field.name }}", op, value.into());
        self
    }

    pub fn return_{{ field.name }}(mut self) -> Self {
        self.query.return_("{{ field.name }}");
        self
    }

    pub fn order_by_{{ field.name }}(mut self, direction: OrderDirection) -> Self {
        self.query.order_by("{{ field.name }}", direction);
        self
    }
{%- endfor %}

    /// Continue at the `{{ edge.from.name }}` end of the edge.
    pub fn query_from(self) -> {{ edge.from.model_path }}::{{ edge.from.query_type }} {
        {{ edge.from.model_path }}::{{ edge.from.query_type }}::from_query(self.query.endpoint(Direction::Incoming))
    }

    /// Continue at the `{{ edge.to.name }}` end of the edge.
    pub fn query_to(self) -> {{ edge.to.model_path }}::{{ edge.to.query_type }} {
        {{ edge.to.model_path }}::{{ edge.to.query_type }}::from_query(self.query.endpoint(Direction::Outgoing))
    }

    pub fn build(self) -> Query {
        self.query
    }
}

impl Default for {{ edge.query_type }} {
    fn default() -> Self {
        Self::new()
    }
}
"#;

pub const MODEL_EDGE_MUTATOR: &str = r#"/// Creates or updates a `{{ edge.name }}` edge.
#[derive(Debug, Clone)]
pub struct {{ edge.mutator_type }} {
    from_id: String,
    to_id: String,
    values: Vec<(&'static str, Value)>,
}

impl {{ edge.mutator_type }} {
    /// Starts from the declared default of every field.
    pub fn create(from_id: impl Into<String>, to_id: impl Into<String>) -> Self {
        let mut values = Vec::new();
{%- for field in edge.fields %}
        let default_{{ field.name }}: {{ field.rust_type }} = {{ field.default_expr }};
        values.push(("{{ field.name }}", Value::from(default_{{ field.name }})));
{%- endfor %}
        Self {
            from_id: from_id.into(),
            to_id: to_id.into(),
            values,
        }
    }

    pub fn update(from_id: impl Into<String>, to_id: impl Into<String>) -> Self {
        Self {
            from_id: from_id.into(),
            to_id: to_id.into(),
            values: Vec::new(),
        }
    }
{%- for field in edge.fields %}

    pub fn set_{{ field.name }}(mut self, value: {{ field.rust_type }}) -> Self {
        self.values.push(("{{ field.name }}", Value::from(value)));
        self
    }
{%- endfor %}

    pub fn execute(self, conn: &mut Conn) -> Result<{{ edge.model_type }}> {
        let record = conn.upsert_edge(
            {{ edge.model_type }}::LABEL,
            &self.from_id,
            &self.to_id,
            &self.values,
        )?;
        {{ edge.model_type }}::from_record(&record)
    }
}
"#;

pub const MODEL_EDGE_DELETER: &str = r#"/// Deletes one `{{ edge.name }}` edge.
#[derive(Debug, Clone)]
pub struct {{ edge.deleter_type }} {
    from_id: String,
    to_id: String,
}

impl {{ edge.deleter_type }} {
    pub fn new(from_id: impl Into<String>, to_id: impl Into<String>) -> Self {
        Self {
            from_id: from_id.into(),
            to_id: to_id.into(),
        }
    }

    pub fn execute(self, conn: &mut Conn) -> Result<()> {
        conn.delete_edge({{ edge.model_type }}::LABEL, &self.from_id, &self.to_id)
    }
}
"#;

// =============================================================================
// LOGIC: NODE
// =============================================================================

pub const LOGIC_NODE_DOCS: &str = "\
//! Privacy-checked access to `{{ node.name }}` nodes.
";

pub const LOGIC_NODE_IMPORTS: &str = "\
use {{ naming.runtime_crate }}::model::{Conn, Record};
use {{ naming.runtime_crate }}::privacy::{self, ViewerContext};
use {{ naming.runtime_crate }}::{Batcher, Result};

use {{ node.model_path }}::{{ node.model_type }};
";

pub const LOGIC_NODE_AUTH: &str = r#"/// A `{{ node.name }}` node as seen by one viewer.
#[derive(Debug, Clone)]
pub struct {{ node.logic_type }} {
    node: {{ node.model_type }},
    vc: ViewerContext,
}

impl {{ node.logic_type }} {
    pub fn from_node(vc: &ViewerContext, node: {{ node.model_type }}) -> Self {
        Self {
            node,
            vc: vc.clone(),
        }
    }

    pub fn from_record(vc: &ViewerContext, record: &Record) -> Result<Self> {
        {{ node.model_type }}::from_record(record).map(|node| Self::from_node(vc, node))
    }

    pub fn from_records(vc: &ViewerContext, records: &[Record]) -> Result<Vec<Self>> {
        records
            .iter()
            .map(|record| Self::from_record(vc, record))
            .collect()
    }

    fn allowed(&self, policy: &str) -> bool {
        privacy::check(policy, &self.vc, &self.node.id)
    }

    pub fn id(&self) -> &str {
        &self.node.id
    }

    /// Deletes the node when the viewer passes `{{ node.deletion_privacy }}`.
    pub fn delete(self, conn: &mut Conn) -> Result<bool> {
        if !self.allowed("{{ node.deletion_privacy }}") {
            return Ok(false);
        }
        {{ node.model_path }}::{{ node.deleter_type }}::new(self.node.id).execute(conn)?;
        Ok(true)
    }
}
"#;

pub const LOGIC_NODE_GETTERS: &str = r#"impl {{ node.logic_type }} {
{%- for field in node.fields %}

    pub fn {{ field.name }}(&self) -> Option<&{{ field.rust_type }}> {
        self.allowed("{{ field.privacy }}")
            .then_some(&self.node.{{ field.name }})
    }
{%- endfor %}
}
"#;

pub const LOGIC_NODE_GET_BY_ID: &str = r#"impl {{ node.logic_type }} {
    pub fn get_by_id(conn: &mut Conn, vc: &ViewerContext, id: &str) -> Result<Option<Self>> {
        match conn.fetch_node({{ node.model_type }}::LABEL, id)? {
            Some(record) => Self::from_record(vc, &record).map(Some),
            None => Ok(None),
        }
    }
}
"#;

pub const LOGIC_NODE_BATCH: &str = r#"impl {{ node.logic_type }} {
    pub fn get_by_id_batcher(vc: &ViewerContext, id: &str, fields: &[&str]) -> Batcher<Self> {
        Batcher::node({{ node.model_type }}::LABEL, id, fields, vc, Self::from_record)
    }
}
"#;

pub const LOGIC_NODE_CONNECTED: &str = r#"impl {{ node.logic_type }} {
{%- for edge in node.edges %}

    /// `{{ edge.other.name }}` nodes reached through outgoing `{{ edge.name }}` edges.
    pub fn {{ edge.method }}(&self, conn: &mut Conn) -> Result<Vec<{{ edge.other.logic_path }}::{{ edge.other.logic_type }}>> {
        if !self.allowed("{{ edge.privacy }}") {
            return Ok(Vec::new());
        }
        let records = conn.outgoing({{ edge.model_path }}::{{ edge.model_type }}::LABEL, &self.node.id)?;
        {{ edge.other.logic_path }}::{{ edge.other.logic_type }}::from_records(&self.vc, &records)
    }

    pub fn {{ edge.method }}_batcher(vc: &ViewerContext, id: &str) -> Batcher<Vec<{{ edge.other.logic_path }}::{{ edge.other.logic_type }}>> {
        Batcher::outgoing(
            {{ edge.model_path }}::{{ edge.model_type }}::LABEL,
            id,
            vc,
            {{ edge.other.logic_path }}::{{ edge.other.logic_type }}::from_records,
        )
    }
{%- endfor %}
{%- for pointer in node.pointers %}

    /// `{{ pointer.other.name }}` nodes pointing here through `{{ pointer.name }}` edges.
    pub fn {{ pointer.method }}(&self, conn: &mut Conn) -> Result<Vec<{{ pointer.other.logic_path }}::{{ pointer.other.logic_type }}>> {
        if !self.allowed("{{ pointer.privacy }}") {
            return Ok(Vec::new());
        }
        let records = conn.incoming({{ pointer.model_path }}::{{ pointer.model_type }}::LABEL, &self.node.id)?;
        {{ pointer.other.logic_path }}::{{ pointer.other.logic_type }}::from_records(&self.vc, &records)
    }

    pub fn {{ pointer.method }}_batcher(vc: &ViewerContext, id: &str) -> Batcher<Vec<{{ pointer.other.logic_path }}::{{ pointer.other.logic_type }}>> {
        Batcher::incoming(
            {{ pointer.model_path }}::{{ pointer.model_type }}::LABEL,
            id,
            vc,
            {{ pointer.other.logic_path }}::{{ pointer.other.logic_type }}::from_records,
        )
    }
{%- endfor %}
}
"#;

// =============================================================================
// LOGIC: EDGE
// =============================================================================

pub const LOGIC_EDGE_DOCS: &str = "\
//! Privacy-checked access to `{{ edge.name }}` edges.
";

pub const LOGIC_EDGE_IMPORTS: &str = "\
use {{ naming.runtime_crate }}::model::{Conn, Record};
use {{ naming.runtime_crate }}::privacy::{self, ViewerContext};
use {{ naming.runtime_crate }}::{Batcher, Result};

use {{ edge.model_path }}::{{ edge.model_type }};
";

pub const LOGIC_EDGE_AUTH: &str = r#"/// A `{{ edge.name }}` edge as seen by one viewer.
#[derive(Debug, Clone)]
pub struct {{ edge.logic_type }} {
    edge: {{ edge.model_type }},
    vc: ViewerContext,
}

impl {{ edge.logic_type }} {
    pub fn from_edge(vc: &ViewerContext, edge: {{ edge.model_type }}) -> Self {
        Self {
            edge,
            vc: vc.clone(),
        }
    }

    pub fn from_record(vc: &ViewerContext, record: &Record) -> Result<Self> {
        {{ edge.model_type }}::from_record(record).map(|edge| Self::from_edge(vc, edge))
    }

    fn allowed(&self, policy: &str) -> bool {
        privacy::check_edge(policy, &self.vc, &self.edge.from_id, &self.edge.to_id)
    }

    pub fn from_id(&self) -> &str {
        &self.edge.from_id
    }

    pub fn to_id(&self) -> &str {
        &self.edge.to_id
    }

    /// Deletes the edge when the viewer passes `{{ edge.privacy.delete }}`.
    pub fn delete(self, conn: &mut Conn) -> Result<bool> {
        if !self.allowed("{{ edge.privacy.delete }}") {
            return Ok(false);
        }
        {{ edge.model_path }}::{{ edge.deleter_type }}::new(self.edge.from_id, self.edge.to_id).execute(conn)?;
        Ok(true)
    }
}
"#;

pub const LOGIC_EDGE_GETTERS: &str = r#"impl {{ edge.logic_type }} {
{%- for field in edge.fields %}

    pub fn {{ field.name }}(&self) -> Option<&{{ field.rust_type }}> {
        self.allowed("{{ field.privacy }}")
            .then_some(&self.edge.{{ field.name }})
    }
{%- endfor %}
}
"#;

pub const LOGIC_EDGE_GET_BY_IDS: &str = r#"impl {{ edge.logic_type }} {
    pub fn get_by_ids(
        conn: &mut Conn,
        vc: &ViewerContext,
        from_id: &str,
        to_id: &str,
    ) -> Result<Option<Self>> {
        let Some(record) = conn.fetch_edge({{ edge.model_type }}::LABEL, from_id, to_id)? else {
            return Ok(None);
        };
        let edge = Self::from_record(vc, &record)?;
        Ok(edge.allowed("{{ edge.privacy.forward }}").then_some(edge))
    }
}
"#;

pub const LOGIC_EDGE_BATCH: &str = r#"impl {{ edge.logic_type }} {
    pub fn get_by_ids_batcher(
        vc: &ViewerContext,
        from_id: &str,
        to_id: &str,
        fields: &[&str],
    ) -> Batcher<Self> {
        Batcher::edge({{ edge.model_type }}::LABEL, from_id, to_id, fields, vc, Self::from_record)
    }
}
"#;

// =============================================================================
// GRAPHQL
// =============================================================================

pub const GRAPHQL_SCHEMA_DOCS: &str = "\
//! GraphQL schema of the exposed part of the graph.
";

pub const GRAPHQL_SCHEMA_IMPORTS: &str = "\
use {{ naming.runtime_crate }}::graphql::Schema;
use {{ naming.runtime_crate }}::Result;
";

pub const GRAPHQL_SCHEMA_SDL: &str = r###"/// SDL of the GraphQL API.
pub const SCHEMA: &str = r##"
schema {
  query: Query
}

type Query {
  node(id: ID!): Node
{%- for node in schema.nodes %}
  {{ node.query_name }}(id: ID!): {{ node.name }}
{%- endfor %}
}

interface Node {
  id: ID!
}
{%- for node in schema.nodes %}
{% if node.description %}
# {{ node.description }}
{%- endif %}
type {{ node.name }} implements Node {
  id: ID!
{%- for field in node.fields %}
  {{ field.name }}: {{ field.graphql_type }}
{%- endfor %}
{%- for edge in node.edges %}
  {{ edge.field_name }}(first: Int, after: ID): {{ edge.connection_type }}!
{%- endfor %}
}
{%- endfor %}
{%- for edge in schema.connections %}

type {{ edge.connection_type }} {
  totalCount: Int!
  edges: [{{ edge.edge_type }}]
  nodes: [{{ edge.to }}]
  pageInfo: PageInfo!
}

type {{ edge.edge_type }} {
  cursor: ID!
  node: {{ edge.to }}
{%- for field in edge.fields %}
  {{ field.name }}: {{ field.graphql_type }}
{%- endfor %}
}
{%- endfor %}

type PageInfo {
  hasNextPage: Boolean!
  endCursor: ID
}
"##;

/// Parses [`SCHEMA`] so schema issues surface at startup.
pub fn parse_schema() -> Result<Schema> {
    Schema::parse(SCHEMA)
}
"###;

pub const GRAPHQL_RESOLVER_DOCS: &str = "\
//! Resolver for the `{{ node.name }}` GraphQL type.
";

pub const GRAPHQL_RESOLVER_IMPORTS: &str = "\
use {{ naming.runtime_crate }}::graphql::{Connection, ConnectionArgs, ResolverContext};
use {{ naming.runtime_crate }}::Result;

use {{ node.logic_path }}::{{ node.logic_type }};
";

pub const GRAPHQL_RESOLVER_TYPE: &str = r#"#[derive(Debug, Clone)]
pub struct {{ node.resolver_type }} {
    inner: {{ node.logic_type }},
}

impl {{ node.resolver_type }} {
    pub fn new(inner: {{ node.logic_type }}) -> Self {
        Self { inner }
    }

    pub fn id(&self) -> &str {
        self.inner.id()
    }
{%- for field in node.fields %}

    pub fn {{ field.accessor }}(&self) -> Option<&{{ field.rust_type }}> {
        self.inner.{{ field.accessor }}()
    }
{%- endfor %}
{%- for edge in node.edges %}
{% if edge.description %}
    /// {{ edge.description }}
{%- endif %}
    pub fn {{ edge.accessor }}(
        &self,
        ctx: &ResolverContext,
        args: &ConnectionArgs,
    ) -> Result<Connection<{{ edge.to_resolver_path }}>> {
        ctx.load_connection(
            "{{ edge.batch_key }}",
            self.inner.id(),
            args,
            {% if edge.order_by %}Some("{{ edge.order_by }}"){% else %}None{% endif %},
        )
    }
{%- endfor %}
}
"#;

pub const GRAPHQL_DATALOADER_DOCS: &str = "\
//! Dataloader batcher routing each request kind to its logic batcher.
";

pub const GRAPHQL_DATALOADER_IMPORTS: &str = "\
use {{ naming.runtime_crate }}::graphql::{BatchRequest, BatchedQuery};
use {{ naming.runtime_crate }}::privacy::ViewerContext;
";

pub const GRAPHQL_DATALOADER_BATCHER: &str = r#"/// Builds the batched query for one dataloader request.
pub fn batch_query(vc: &ViewerContext, request: &BatchRequest) -> Option<BatchedQuery> {
    let fields: Vec<&str> = request.fields.iter().map(String::as_str).collect();
    match request.kind.as_str() {
{%- for batch in schema.batches %}
{%- if batch.kind == "node" %}
        "{{ batch.key }}" => Some(
            {{ batch.logic_path }}::{{ batch.logic_type }}::{{ batch.method }}(vc, &request.id, &fields).erase(),
        ),
{%- elif batch.kind == "node_to_node" %}
        "{{ batch.key }}" => Some(
            {{ batch.logic_path }}::{{ batch.logic_type }}::{{ batch.method }}(vc, &request.id).erase(),
        ),
{%- else %}
        "{{ batch.key }}" => {
            let (from_id, to_id) = request.id.split_once('|')?;
            Some(
                {{ batch.logic_path }}::{{ batch.logic_type }}::{{ batch.method }}(vc, from_id, to_id, &fields).erase(),
            )
        }
{%- endif %}
{%- endfor %}
{{ manual(tag="batch_arms", indent="        ") }}
        _ => None,
    }
}
"#;
