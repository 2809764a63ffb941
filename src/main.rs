mod config;
mod error;
mod jsonrpc;
mod mcp;
mod routes;
mod sse;
mod state;
mod tools;
mod upstream;

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Football MCP server: exposes API-Football lookups as MCP tools over
/// JSON-RPC (POST /mcp) and server-sent events (GET /mcp, GET /sse).
#[derive(Parser, Debug)]
#[command(name = "football-mcp", version, about)]
struct Cli {
    /// Path to a TOML configuration file (defaults apply when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config file and PORT)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut cfg = match config::load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    // CLI --port overrides config
    if let Some(port) = cli.port {
        cfg.server.port = port;
    }

    tracing::info!(
        upstream = %cfg.upstream.base_url,
        default_league = %cfg.upstream.default_league,
        default_season = cfg.upstream.default_season,
        tools = ?cfg.tools.enabled,
        "Configuration loaded successfully"
    );

    let registry = tools::ToolRegistry::new(
        &cfg.tools.enabled,
        tools::ToolContext::new(cfg.upstream.clone()),
    );
    let state = state::AppState::new(
        mcp::Dispatcher::new(registry),
        Duration::from_secs(cfg.server.heartbeat_interval_secs),
    );
    let app = routes::router(state);

    let bind_addr = format!("{}:{}", cfg.server.host, cfg.server.port);
    tracing::info!("Listening on {bind_addr}");

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to bind to {bind_addr}: {e}");
            std::process::exit(1);
        });

    axum::serve(listener, app).await.unwrap_or_else(|e| {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    });
}
