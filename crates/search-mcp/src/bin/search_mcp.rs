//! Stdio MCP server for the search gateway.
//!
//! Reads one JSON-RPC message per line on stdin and writes one reply per line
//! on stdout. Logs go to stderr.

use std::process;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use search_mcp::{all_tools, GatewayConfig, McpServer};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// MCP gateway for keyword, semantic, vector, hybrid and agentic search.
#[derive(Debug, Parser)]
#[command(name = "search-mcp", version, about)]
struct Cli {
    /// Default search service endpoint (overrides AZURE_SEARCH_ENDPOINT).
    #[arg(long)]
    endpoint: Option<String>,

    /// Default per-call timeout in seconds (overrides AZURE_SEARCH_TIMEOUT).
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!("search-mcp stopped");
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(error = %error, "search-mcp terminated with error");
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

async fn run() -> anyhow::Result<()> {
    // A missing .env file is not an error.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_tracing()?;

    let mut config = GatewayConfig::from_env();
    if let Some(endpoint) = cli.endpoint {
        config.endpoint = Some(endpoint);
    }
    if let Some(timeout) = cli.timeout_secs {
        config.default_timeout_secs = timeout;
    }
    config.validate().context("invalid configuration")?;

    tracing::info!(
        endpoint = config.endpoint.as_deref().unwrap_or("<per call>"),
        query_key = config.query_key.is_some(),
        admin_key = config.admin_key.is_some(),
        timeout_secs = config.default_timeout_secs,
        "Starting search-mcp on stdio"
    );

    let server = Arc::new(McpServer::gateway());
    server.register_tools(all_tools(config)).await;

    serve_stdio(server).await
}

/// Serve requests concurrently; replies are written as they complete.
async fn serve_stdio(server: Arc<McpServer>) -> anyhow::Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(reply) = rx.recv().await {
            stdout.write_all(reply.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }
        Ok::<_, std::io::Error>(())
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let server = server.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            if let Some(reply) = server.handle_line(&line).await {
                // The writer only stops once stdout is gone.
                let _ = tx.send(reply);
            }
        });
    }

    drop(tx);
    writer
        .await
        .context("stdout writer panicked")?
        .context("failed to write stdout")?;
    Ok(())
}

fn init_tracing() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("Failed to create env filter: {e}"))?;

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_ansi(false),
        )
        .with(env_filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;

    Ok(())
}
