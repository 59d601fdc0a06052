use clap::Parser;
use eth_address_watcher::api::{Cli, CliHandler};
use eth_address_watcher::config::AppConfig;
use eth_address_watcher::parser::EthereumParser;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Quieter than the server
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let mut config = AppConfig::load()?;
    if let Some(rpc_url) = cli.rpc_url.clone() {
        config.rpc.endpoint = rpc_url;
        config.validate()?;
    }

    let parser = EthereumParser::from_config(&config.rpc)?;
    let handler = CliHandler::new(Arc::new(parser));

    match handler.execute_command(&cli.command).await {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
