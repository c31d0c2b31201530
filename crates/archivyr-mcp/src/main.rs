//! MCP server for storing and retrieving AI editor rulesets.
//!
//! Rulesets live in a Valkey (or Redis) instance and are exposed over stdio
//! as tools and `ruleset://{name}` resources.

mod config;
mod render;
mod resources;
mod server;
mod shutdown;
mod tools;

use std::sync::Arc;

use anyhow::{Context, Result};
use archivyr_core::{RulesetStore, ValkeyClient};
use config::Config;
use rmcp::{ServiceExt, transport::stdio};
use server::RulesetMcpServer;
use shutdown::Outcome;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env().context("invalid configuration")?;

    // Logs go to stderr; stdout carries JSON-RPC
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.log_level.as_str())),
        )
        .init();

    tracing::info!(
        host = %config.valkey_host,
        port = config.valkey_port,
        "connecting to valkey"
    );
    let client = ValkeyClient::connect(&config.valkey_host, config.valkey_port).with_context(|| {
        format!(
            "failed to connect to valkey at {}:{}",
            config.valkey_host, config.valkey_port
        )
    })?;

    let store = RulesetStore::new(Arc::new(client));
    let count = store.list_names().context("failed to list rulesets")?.len();
    tracing::info!("Found {} stored rulesets", count);

    let server = RulesetMcpServer::new(store);

    tracing::info!("Starting MCP server over stdio");
    let service = server.serve(stdio()).await?;
    let cancellation = service.cancellation_token();

    let waiting = service.waiting();
    tokio::pin!(waiting);
    let outcome = shutdown::until_signal(&mut waiting, shutdown::signal())
        .await
        .context("failed to listen for shutdown signals")?;
    let quit_reason = match outcome {
        Outcome::Finished(reason) => reason?,
        Outcome::Signal(signal) => {
            tracing::info!(signal, "Received shutdown signal");
            cancellation.cancel();
            waiting.await?
        }
    };
    tracing::info!("Server stopped: {:?}", quit_reason);
    tracing::info!("Closing Valkey connection");

    Ok(())
}
