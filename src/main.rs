use clap::Parser;
use graph_schema_codegen::{
    CliArgs, ErrorKind, GeneratorConfig, LoggingConfig, init_logging, run_generator,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    let _guard = match init_logging(LoggingConfig::from_env()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("failed to initialize logging: {e:#}");
            return ExitCode::from(ErrorKind::Config.exit_code());
        }
    };

    let cli = CliArgs::parse();
    let config = match GeneratorConfig::from_args(cli).and_then(|config| {
        // Fail fast before touching the destination.
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, category = ErrorKind::Config.category(), "invalid configuration");
            eprintln!("error: {e:#}");
            return ExitCode::from(ErrorKind::Config.exit_code());
        }
    };

    match run_generator(&config) {
        Ok(report) => {
            // Warnings were already logged as they were raised.
            for line in report.summary() {
                println!("{line}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            let kind = e.kind();
            tracing::error!(error = %e, category = kind.category(), "regeneration failed");
            eprintln!("error: {e}");
            if let Some(raw) = e.raw_text() {
                eprintln!("--- unformatted output ---\n{raw}");
            }
            ExitCode::from(kind.exit_code())
        }
    }
}
