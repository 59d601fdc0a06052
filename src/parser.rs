use async_trait::async_trait;
use std::sync::Arc;

use crate::blockchain::{BlockFetcher, HttpTransport, RpcTransport, TransactionScanner};
use crate::config::RpcConfig;
use crate::error::RpcError;
use crate::logging::MetricsLogger;
use crate::models::Transaction;
use crate::registry::Registry;

/// Operations exposed to the HTTP and CLI front ends
#[async_trait]
pub trait Parser: Send + Sync {
    /// Last parsed block
    async fn get_current_block(&self) -> u64;

    /// Add an address to the observer set
    fn subscribe(&self, address: &str) -> bool;

    /// Inbound or outbound transactions for a subscribed address
    async fn get_transactions(&self, address: &str) -> Vec<Transaction>;
}

/// Owned context holding the registry, the block fetcher and the scanner
pub struct EthereumParser {
    registry: Arc<Registry>,
    fetcher: Arc<BlockFetcher>,
    scanner: TransactionScanner,
}

impl EthereumParser {
    pub fn new(transport: Arc<dyn RpcTransport>) -> Self {
        let registry = Arc::new(Registry::new());
        let fetcher = Arc::new(BlockFetcher::new(transport));
        let scanner = TransactionScanner::new(Arc::clone(&registry), Arc::clone(&fetcher));

        Self {
            registry,
            fetcher,
            scanner,
        }
    }

    /// Parser talking to the configured HTTP endpoint
    pub fn from_config(config: &RpcConfig) -> Result<Self, RpcError> {
        let transport = HttpTransport::new(&config.endpoint, config.timeout_seconds)?;
        Ok(Self::new(Arc::new(transport)))
    }

    pub fn is_subscribed(&self, address: &str) -> bool {
        self.registry.is_subscribed(address)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn fetcher(&self) -> &BlockFetcher {
        &self.fetcher
    }
}

#[async_trait]
impl Parser for EthereumParser {
    async fn get_current_block(&self) -> u64 {
        self.fetcher.get_current_block().await
    }

    fn subscribe(&self, address: &str) -> bool {
        let subscribed = self.registry.subscribe(address);
        MetricsLogger::log_subscription(&address.to_lowercase(), self.registry.len());
        subscribed
    }

    async fn get_transactions(&self, address: &str) -> Vec<Transaction> {
        self.scanner.get_transactions(address).await
    }
}
