use emissions_core::config::Config;
use emissions_mcp::EmissionsMcpHandler;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Configure logging from env var `EMISSIONS_LOG_LEVEL` (or fallback to `RUST_LOG`, default `info`).
    let log_env = emissions_mcp::log_level_from_env();
    let env_filter = emissions_mcp::log_filter(&log_env);
    // stdout carries the MCP transport
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();
    tracing::info!("emissions_mcp: log filter: {}", log_env);

    let config = Config::from_env()?;
    tracing::info!(
        data_file = %config.data_file.display(),
        reports_dir = %config.reports_dir.display(),
        top_n = config.top_n,
        "emissions_mcp: configuration loaded"
    );

    let handler = EmissionsMcpHandler::from_config(&config);
    tracing::info!(
        "emissions_mcp: registered {} tools and {} prompts",
        handler.tool_count(),
        handler.prompt_count()
    );

    tracing::info!("emissions_mcp: starting stdio MCP server...");

    use rmcp::serve_server;
    let transport = (tokio::io::stdin(), tokio::io::stdout());
    let server = serve_server(handler, transport).await?;

    tracing::info!("emissions_mcp: service initialized as server");

    server.waiting().await?;

    Ok(())
}
