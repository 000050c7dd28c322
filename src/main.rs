//! Terra key server.
//!
//! # Architecture Overview
//!
//! ```text
//!   Client ──▶ http (axum + tower-http layers)
//!                 │
//!                 ├──▶ keys ──▶ bridge ──▶ keystore (keyring.json)
//!                 │
//!                 └──▶ tx ──┬──▶ keys (public key, signature)
//!                           └──▶ node (tax, simulate, broadcast) ──▶ Tendermint RPC
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use terra_keyserver::config::validation::validate_config;
use terra_keyserver::config::{load_config, ServerConfig};
use terra_keyserver::http::{AppState, HttpServer};
use terra_keyserver::keys::KeyRegistry;
use terra_keyserver::lifecycle::signals::shutdown_on_signal;
use terra_keyserver::node::{NodeQuery, TendermintRpc};
use terra_keyserver::observability::{logging, metrics};
use terra_keyserver::{ChainProfile, Shutdown};

#[derive(Parser, Debug)]
#[command(name = "keyserver", version, about = "Terra key management and signing server")]
struct Args {
    /// TOML configuration file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(long)]
    bind: Option<String>,

    /// Override `keystore.dir`.
    #[arg(long)]
    key_dir: Option<String>,

    /// Override `node.rpc_url`.
    #[arg(long)]
    node: Option<String>,
}

fn resolve_config(args: Args) -> Result<ServerConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }
    if let Some(dir) = args.key_dir {
        config.keystore.dir = dir;
    }
    if let Some(node) = args.node {
        config.node.rpc_url = node;
    }

    if let Err(errors) = validate_config(&config) {
        let joined = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        return Err(format!("invalid configuration: {joined}").into());
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = resolve_config(Args::parse())?;

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "keyserver starting");

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let profile = Arc::new(ChainProfile::from_config(&config.chain)?);
    tracing::info!(
        bind_address = %config.listener.bind_address,
        key_dir = %config.keystore.dir,
        rpc_url = %config.node.rpc_url,
        account_prefix = %profile.account.address,
        sign_mode = %profile.sign_mode,
        "Configuration loaded"
    );

    let node: Arc<dyn NodeQuery> = Arc::new(TendermintRpc::new(&config.node)?);
    let registry = KeyRegistry::new(&config.keystore.dir, config.keystore.kdf, profile.clone());
    let state = AppState::new(registry, node, profile);

    let shutdown = Shutdown::new();
    tokio::spawn(shutdown_on_signal(shutdown.clone()));

    HttpServer::new(state, config.listener.clone(), &config.limits)
        .run(shutdown)
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
