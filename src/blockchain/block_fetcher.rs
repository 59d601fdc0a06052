use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::blockchain::rpc_client::{format_hex_quantity, parse_hex_quantity, JsonRpcResponse, RpcTransport};
use crate::error::{RpcError, WatcherError};
use crate::logging::{ErrorLogger, LogContext, MetricsLogger, PerformanceMonitor};
use crate::models::Transaction;

#[derive(Debug, Deserialize)]
struct BlockBody {
    #[serde(default)]
    transactions: Vec<Transaction>,
}

/// Reads chain height and block contents from the upstream node.
///
/// The last height seen is cached; the best-effort calls fall back to it (or
/// to an empty block) instead of failing.
pub struct BlockFetcher {
    transport: Arc<dyn RpcTransport>,
    current_block: AtomicU64,
}

impl BlockFetcher {
    pub fn new(transport: Arc<dyn RpcTransport>) -> Self {
        Self {
            transport,
            current_block: AtomicU64::new(0),
        }
    }

    /// Last successfully observed height, without touching the network
    pub fn cached_block(&self) -> u64 {
        self.current_block.load(Ordering::Acquire)
    }

    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError> {
        let monitor = PerformanceMonitor::new(&format!("rpc_{}", method));

        let result = match self.transport.request(method, params).await {
            Ok(body) => JsonRpcResponse::decode(&body),
            Err(e) => Err(e),
        };

        let duration = monitor.finish_with_result(&result);
        MetricsLogger::log_rpc_call(method, duration, result.is_ok());
        result
    }

    /// `eth_blockNumber`, parsed
    pub async fn fetch_block_number(&self) -> Result<u64, RpcError> {
        let result = self.call("eth_blockNumber", vec![]).await?;

        let hex_string = result
            .as_str()
            .ok_or_else(|| RpcError::InvalidResponse(format!("Block number is not a string: {}", result)))?;

        parse_hex_quantity(hex_string)
    }

    /// Current chain height. On failure the cached height is returned.
    ///
    /// The cache only moves forward, so a slow response to an earlier call
    /// cannot replace a newer height.
    pub async fn get_current_block(&self) -> u64 {
        match self.fetch_block_number().await {
            Ok(block_number) => {
                self.current_block.fetch_max(block_number, Ordering::AcqRel);
                LogContext::new("block_fetcher", "get_current_block")
                    .with_block_number(block_number)
                    .debug(&format!("Retrieved current block number: {}", block_number));
                block_number
            }
            Err(e) => {
                let cached = self.cached_block();
                let context = LogContext::new("block_fetcher", "get_current_block").with_block_number(cached);
                ErrorLogger::log_degraded(&WatcherError::from(e), context, "cached_block");
                cached
            }
        }
    }

    /// `eth_getBlockByNumber` with full transaction objects.
    /// A `null` result (block not yet known) is an empty block.
    pub async fn fetch_block_transactions(&self, block_number: u64) -> Result<Vec<Transaction>, RpcError> {
        let params = vec![json!(format_hex_quantity(block_number)), json!(true)];
        let result = self.call("eth_getBlockByNumber", params).await?;

        if result.is_null() {
            LogContext::new("block_fetcher", "get_block_transactions")
                .with_block_number(block_number)
                .debug("Block not found upstream, treating as empty");
            return Ok(Vec::new());
        }

        let block: BlockBody = serde_json::from_value(result)?;
        Ok(block.transactions)
    }

    /// Transactions of one block. On failure an empty list is returned so
    /// that one bad block does not abort a scan.
    pub async fn get_block_transactions(&self, block_number: u64) -> Vec<Transaction> {
        match self.fetch_block_transactions(block_number).await {
            Ok(transactions) => transactions,
            Err(e) => {
                let context = LogContext::new("block_fetcher", "get_block_transactions").with_block_number(block_number);
                ErrorLogger::log_degraded(&WatcherError::from(e), context, "empty_block");
                Vec::new()
            }
        }
    }
}
