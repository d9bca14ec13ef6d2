use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::codegen::{RegenOptions, ShapeMismatchPolicy};
use crate::template::{FormatterKind, NamingContext};

const DEFAULT_DESTINATION: &str = ".";

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub destination: PathBuf,
    pub schema: PathBuf,
    pub merge: bool,
    pub force: bool,
    pub formatter: FormatterKind,
    pub shape_policy: ShapeMismatchPolicy,
    pub naming: NamingContext,
    pub dry_run: bool,
}

impl GeneratorConfig {
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let CliArgs {
            destination: cli_destination,
            schema: cli_schema,
            config,
            merge,
            force,
            formatter: cli_formatter,
            strict_manual_sections: cli_strict,
            dry_run,
        } = args;

        let file_config = if let Some(path) = config.as_ref() {
            load_config_file(path)?
        } else {
            PartialConfig::default()
        };

        let PartialConfig {
            destination: file_destination,
            schema: file_schema,
            formatter: file_formatter,
            strict_manual_sections: file_strict,
            naming: file_naming,
        } = file_config;

        let destination = cli_destination
            .or(file_destination)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DESTINATION));

        let schema = cli_schema.or(file_schema).context(
            "no schema definition given (pass --schema or set `schema` in the config file)",
        )?;

        let formatter = cli_formatter.or(file_formatter).unwrap_or_default();

        let shape_policy = if cli_strict || file_strict.unwrap_or(false) {
            ShapeMismatchPolicy::Fail
        } else {
            ShapeMismatchPolicy::Warn
        };

        Ok(Self {
            destination,
            schema,
            merge,
            force,
            formatter,
            shape_policy,
            naming: file_naming.unwrap_or_default(),
            dry_run,
        })
    }

    /// Fail fast on settings that would only surface halfway through a run.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.schema.is_file(),
            "schema definition {:?} does not exist or is not a file",
            self.schema
        );
        anyhow::ensure!(
            !self.destination.exists() || self.destination.is_dir(),
            "destination {:?} is not a directory",
            self.destination
        );
        self.naming.validate()?;
        Ok(())
    }

    pub fn regen_options(&self) -> RegenOptions {
        RegenOptions {
            destination: self.destination.clone(),
            merge: self.merge,
            force: self.force,
            formatter: self.formatter,
            shape_policy: self.shape_policy,
            naming: self.naming.clone(),
            dry_run: self.dry_run,
        }
    }
}

#[derive(Parser, Debug, Default, Clone)]
#[command(
    name = "graph-schema-codegen",
    about = "Regenerate graph API sources from a schema definition",
    version
)]
pub struct CliArgs {
    #[arg(
        env = "GRAPH_CODEGEN_DESTINATION",
        value_name = "DIR",
        help = "Root directory the generated sources are written under"
    )]
    pub destination: Option<PathBuf>,

    #[arg(
        long,
        env = "GRAPH_CODEGEN_SCHEMA",
        value_name = "FILE",
        help = "Schema definition (YAML or JSON)"
    )]
    pub schema: Option<PathBuf>,

    #[arg(
        long,
        value_name = "FILE",
        help = "Path to a configuration file (YAML or JSON)"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        short,
        long,
        help = "Accept edits outside manual sections and keep the manual sections"
    )]
    pub merge: bool,

    #[arg(
        short,
        long,
        help = "Accept edits outside manual sections and overwrite the drifted files completely"
    )]
    pub force: bool,

    #[arg(
        long,
        env = "GRAPH_CODEGEN_FORMATTER",
        value_enum,
        value_name = "FORMATTER",
        help = "Formatter applied to generated sources"
    )]
    pub formatter: Option<FormatterKind>,

    #[arg(
        long,
        help = "Fail instead of warning when a non-empty manual section would be lost"
    )]
    pub strict_manual_sections: bool,

    #[arg(long, help = "Render and validate everything without writing")]
    pub dry_run: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialConfig {
    destination: Option<PathBuf>,
    schema: Option<PathBuf>,
    formatter: Option<FormatterKind>,
    strict_manual_sections: Option<bool>,
    naming: Option<NamingContext>,
}

fn load_config_file(path: &Path) -> Result<PartialConfig> {
    if !path.exists() {
        anyhow::bail!("config file {:?} does not exist", path);
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {:?}", path))?;
    let ext = path
        .extension()
        .and_then(|os| os.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse YAML config {:?}", path))?,
        "json" => serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse JSON config {:?}", path))?,
        other => anyhow::bail!("unsupported config extension: {other}"),
    };
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::RegenMode;
    use tempfile::TempDir;

    #[test]
    fn test_cli_overrides_config_file() {
        // Arrange
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("codegen.yaml");
        fs::write(
            &config_path,
            "destination: out\nschema: file-schema.yaml\nformatter: rustfmt\nstrict_manual_sections: true\nnaming:\n  runtime_crate: my_runtime\n",
        )
        .unwrap();
        let args = CliArgs {
            schema: Some(PathBuf::from("cli-schema.yaml")),
            config: Some(config_path),
            ..CliArgs::default()
        };

        // Act
        let config = GeneratorConfig::from_args(args).unwrap();

        // Assert
        assert_eq!(config.schema, PathBuf::from("cli-schema.yaml"));
        assert_eq!(config.destination, PathBuf::from("out"));
        assert_eq!(config.formatter, FormatterKind::Rustfmt);
        assert_eq!(config.shape_policy, ShapeMismatchPolicy::Fail);
        assert_eq!(config.naming.runtime_crate, "my_runtime");
        assert_eq!(config.naming.models_module, "models");
    }

    #[test]
    fn test_missing_schema_is_rejected() {
        let err = GeneratorConfig::from_args(CliArgs::default()).unwrap_err();
        assert!(err.to_string().contains("no schema definition"));
    }

    #[test]
    fn test_both_flags_resolve_to_merge() {
        let config = GeneratorConfig::from_args(CliArgs {
            schema: Some(PathBuf::from("schema.yaml")),
            merge: true,
            force: true,
            ..CliArgs::default()
        })
        .unwrap();

        assert_eq!(RegenMode::from_flags(config.merge, config.force).0, RegenMode::Merge);
        assert_eq!(config.regen_options().destination, PathBuf::from("."));
    }

    #[test]
    fn test_unknown_config_keys_are_rejected() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("codegen.json");
        fs::write(&config_path, r#"{"destinaton": "out"}"#).unwrap();

        let result = GeneratorConfig::from_args(CliArgs {
            config: Some(config_path),
            ..CliArgs::default()
        });

        assert!(result.is_err());
    }
}
