use clap::Parser;
use eth_address_watcher::api::ApiServer;
use eth_address_watcher::config::AppConfig;
use eth_address_watcher::logging::init_logging;
use eth_address_watcher::parser::EthereumParser;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "eth-address-watcher-server")]
#[command(about = "HTTP API for subscribing to Ethereum addresses and polling their recent transactions")]
#[command(version)]
struct Args {
    /// JSON-RPC endpoint
    #[arg(long)]
    rpc_url: Option<String>,

    /// Bind address
    #[arg(long)]
    host: Option<String>,

    /// Server port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // CLI flags win over file and environment
    let mut config = AppConfig::load()?;
    if let Some(rpc_url) = args.rpc_url {
        config.rpc.endpoint = rpc_url;
    }
    if let Some(host) = args.host {
        config.api.host = host;
    }
    if let Some(port) = args.port {
        config.api.port = port;
    }
    config.validate()?;

    init_logging(&config.logging)?;

    let parser = EthereumParser::from_config(&config.rpc)?;
    let server = ApiServer::new(Arc::new(parser), &config.api.host, config.api.port);

    log::info!("Using JSON-RPC endpoint {}", config.rpc.endpoint);

    if let Err(e) = server.start().await {
        log::error!("Server failed: {}", e);
        return Err(e.into());
    }

    Ok(())
}
