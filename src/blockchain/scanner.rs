use std::sync::Arc;

use crate::blockchain::BlockFetcher;
use crate::logging::{LogContext, MetricsLogger, PerformanceMonitor};
use crate::models::{Address, Transaction};
use crate::registry::Registry;

/// Number of blocks inspected per scan, head included
pub const SCAN_WINDOW: u64 = 10;

/// Block numbers to inspect for a given head, newest first.
/// Stops at genesis instead of going negative.
pub fn scan_range(head: u64) -> impl Iterator<Item = u64> {
    let oldest = head.saturating_sub(SCAN_WINDOW - 1);
    (oldest..=head).rev()
}

/// Pull-and-filter over the most recent blocks for a subscribed address
pub struct TransactionScanner {
    registry: Arc<Registry>,
    fetcher: Arc<BlockFetcher>,
}

impl TransactionScanner {
    pub fn new(registry: Arc<Registry>, fetcher: Arc<BlockFetcher>) -> Self {
        Self { registry, fetcher }
    }

    /// Transactions sent from or to `address` within the scan window.
    ///
    /// Unsubscribed addresses get an empty list without any upstream call.
    /// Results are ordered by block, newest first, keeping the node's order
    /// inside each block.
    pub async fn get_transactions(&self, address: &str) -> Vec<Transaction> {
        let address = Address::new(address);

        if !self.registry.contains(&address) {
            LogContext::new("scanner", "get_transactions")
                .with_address(address.as_str())
                .debug("Address is not subscribed, nothing to scan");
            return Vec::new();
        }

        let monitor = PerformanceMonitor::new("scan_transactions");
        let head = self.fetcher.get_current_block().await;

        let mut matched = Vec::new();
        let mut blocks_scanned = 0;
        for block_number in scan_range(head) {
            let transactions = self.fetcher.get_block_transactions(block_number).await;
            let total = transactions.len();
            let before = matched.len();

            matched.extend(transactions.into_iter().filter(|tx| tx.involves(&address)));

            MetricsLogger::log_block_scanned(block_number, total, matched.len() - before);
            blocks_scanned += 1;
        }

        let duration = monitor.finish();
        MetricsLogger::log_scan_completed(address.as_str(), head, blocks_scanned, matched.len(), duration);

        matched
    }
}
