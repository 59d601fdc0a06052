use clap::{Parser as ClapParser, Subcommand};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::error::{RpcError, ValidationError};
use crate::models::Address;
use crate::parser::{EthereumParser, Parser};

#[derive(Error, Debug)]
pub enum CliError {
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("Failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}

#[derive(ClapParser, Debug)]
#[command(name = "eth-address-watcher-cli")]
#[command(about = "One-shot queries against an Ethereum JSON-RPC node")]
#[command(version)]
pub struct Cli {
    /// JSON-RPC endpoint, overrides the configuration
    #[arg(long)]
    pub rpc_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Print the current chain height
    CurrentBlock,
    /// Print every transaction of one block
    Block {
        /// Block number (decimal)
        number: u64,
    },
    /// Print transactions of an address within the last ten blocks
    Transactions {
        address: String,
    },
}

pub struct CliHandler {
    parser: Arc<EthereumParser>,
}

impl CliHandler {
    pub fn new(parser: Arc<EthereumParser>) -> Self {
        Self { parser }
    }

    /// Run one command and return its JSON output.
    ///
    /// Unlike the HTTP server, upstream failures are reported: a one-shot
    /// process has no cached height to fall back to.
    pub async fn execute_command(&self, command: &Commands) -> Result<String, CliError> {
        let output = match command {
            Commands::CurrentBlock => {
                let current_block = self.parser.fetcher().fetch_block_number().await?;
                json!({ "current_block": current_block })
            }
            Commands::Block { number } => {
                let transactions = self.parser.fetcher().fetch_block_transactions(*number).await?;
                json!({ "block_number": number, "transactions": transactions })
            }
            Commands::Transactions { address } => {
                let address = Address::parse(address)?;
                self.parser.subscribe(address.as_str());
                let transactions = self.parser.get_transactions(address.as_str()).await;
                json!({ "transactions": transactions })
            }
        };

        Ok(serde_json::to_string_pretty(&output)?)
    }
}
