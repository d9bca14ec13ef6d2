pub mod codegen;
pub mod config;
pub mod error;
pub mod logging;
pub mod schema;
pub mod template;

pub use codegen::{RegenOptions, Regenerator, RunReport, RunWarning};
pub use config::{CliArgs, GeneratorConfig};
pub use error::{CodegenError, CodegenResult, ErrorKind};
pub use logging::{LoggingConfig, init_logging};

use schema::{SchemaDefinition, SchemaGraph};

/// Load the schema named by `config` and run one regeneration.
pub fn run_generator(config: &GeneratorConfig) -> CodegenResult<RunReport> {
    let definition = SchemaDefinition::load(&config.schema)?;
    let graph = SchemaGraph::build(definition)?;
    tracing::info!(
        schema = %config.schema.display(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "schema loaded"
    );
    Regenerator::new(config.regen_options())?.run(&graph)
}
