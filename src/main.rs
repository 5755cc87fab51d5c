//! Read-only Subversion tools over JSON-RPC on stdio
//!
//! Configuration comes from `SVN_MCP_CONFIG` (or `~/.config/svn-mcp/config.toml`)
//! overlaid with `SVN_*` environment variables. Logs go to stderr; stdout
//! carries the protocol. Set `RUST_LOG` to change verbosity (default
//! `svn_mcp=info`).

use std::sync::Arc;

use svn_mcp::{Config, SvnClient, SvnMcpServer, SvnVersion};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("svn_mcp=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match Config::load() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };

    tracing::info!(
        repo_url = config.repo_url.as_deref().unwrap_or("-"),
        local_working_copy = ?config.local_working_copy,
        timeout_ms = config.timeout_ms,
        "Starting svn-mcp server"
    );

    let client = SvnClient::new(config);

    // Queries still run without a usable svn; each one reports the failure
    match SvnVersion::detect(client.runner()).await {
        Ok(version) => tracing::info!(%version, "Found svn client"),
        Err(e) => tracing::warn!(error = %e, "svn client not available"),
    }

    let server = Arc::new(SvnMcpServer::new(client));
    server.run().await?;

    Ok(())
}
