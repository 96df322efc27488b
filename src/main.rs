//! Toolgate entry point.
//!
//! Initializes logging, loads configuration, registers the built-in tools
//! and serves them over the configured transport.

use anyhow::Result;
use std::sync::Arc;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

use toolgate::core::{Config, McpServer, TransportService};
use toolgate::domains::tools::ToolRegistry;
use toolgate::domains::tools::definitions::register_builtin_tools;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration from environment
    let config = Config::from_env();

    init_logging(&config.logging.level);

    info!("Starting {} v{}", config.server.name, config.server.version);

    let registry =
        Arc::new(ToolRegistry::new().with_redactor(Arc::new(config.redaction.redactor())));
    register_builtin_tools(&registry)?;
    info!("Registered {} tool(s)", registry.tool_count());

    let transport = TransportService::new(config.transport.clone());
    let server = McpServer::new(config, registry);
    transport.run(server).await?;

    info!("Server shutting down");

    Ok(())
}

/// Initialize the logging subsystem.
///
/// Logs go to stderr; stdout carries the STDIO transport.
fn init_logging(level: &str) {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .init();
}
