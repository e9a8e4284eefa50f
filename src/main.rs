// Flyerpress - Print-ready flyer export
// Copyright (c) 2025 Flyerpress Contributors
// Licensed under the MIT License

use clap::Parser;
use flyerpress::cli::{load_cli_config, Cli, Commands};
use flyerpress::config::LoggingConfig;
use flyerpress::logging::init_logging;
use std::process;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    // This is optional - if .env doesn't exist, it's silently ignored
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // File logging follows the configuration when it loads; commands report
    // configuration errors themselves
    let (config_level, logging_config) = match load_cli_config(&cli.config) {
        Ok(config) => (config.application.log_level, config.logging),
        Err(_) => (
            "info".to_string(),
            LoggingConfig {
                local_enabled: false,
                ..LoggingConfig::default()
            },
        ),
    };
    let log_level = cli.log_level.clone().unwrap_or(config_level);
    let guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(5);
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "flyerpress - print-ready flyer export"
    );

    // Dropping an interrupted export detaches its sandbox before exit
    let exit_code = tokio::select! {
        result = execute_command(&cli) => match result {
            Ok(code) => code,
            Err(e) => {
                tracing::error!(error = %e, "Command execution failed");
                eprintln!("Error: {e}");
                5 // Fatal error exit code
            }
        },
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received SIGINT (Ctrl+C), aborting");
            eprintln!("\n⚠️  Interrupted, export aborted");
            130 // SIGINT exit code (standard Unix convention)
        }
    };

    drop(guard);
    process::exit(exit_code);
}

/// Execute the CLI command
async fn execute_command(cli: &Cli) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Export(args) => args.execute(&cli.config).await,
        Commands::Pages(args) => args.execute().await,
        Commands::ValidateConfig(args) => args.execute(&cli.config).await,
        Commands::Init(args) => args.execute().await,
    }
}
