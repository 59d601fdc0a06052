use log::{debug, error, info, trace, warn};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::LoggingConfig;
use crate::error::{ErrorSeverity, WatcherError};

/// Structured logging context
pub struct LogContext {
    pub component: String,
    pub operation: String,
    pub metadata: HashMap<String, Value>,
}

impl LogContext {
    pub fn new(component: &str, operation: &str) -> Self {
        Self {
            component: component.to_string(),
            operation: operation.to_string(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: &str, value: Value) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }

    pub fn with_block_number(self, block_number: u64) -> Self {
        self.with_metadata("block_number", json!(block_number))
    }

    pub fn with_address(self, address: &str) -> Self {
        self.with_metadata("address", json!(address))
    }

    pub fn with_method(self, method: &str) -> Self {
        self.with_metadata("method", json!(method))
    }

    pub fn with_duration_ms(self, duration_ms: u64) -> Self {
        self.with_metadata("duration_ms", json!(duration_ms))
    }

    fn format_message(&self, level: &str, message: &str) -> String {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        let mut log_entry = json!({
            "timestamp": timestamp,
            "level": level,
            "component": self.component,
            "operation": self.operation,
            "message": message,
        });

        for (key, value) in &self.metadata {
            log_entry[key] = value.clone();
        }

        log_entry.to_string()
    }

    pub fn info(&self, message: &str) {
        info!("{}", self.format_message("INFO", message));
    }

    pub fn warn(&self, message: &str) {
        warn!("{}", self.format_message("WARN", message));
    }

    pub fn error(&self, message: &str) {
        error!("{}", self.format_message("ERROR", message));
    }

    pub fn debug(&self, message: &str) {
        debug!("{}", self.format_message("DEBUG", message));
    }

    pub fn trace(&self, message: &str) {
        trace!("{}", self.format_message("TRACE", message));
    }
}

/// Times a single operation and logs the outcome
pub struct PerformanceMonitor {
    pub start_time: SystemTime,
    operation: String,
    metadata: HashMap<String, Value>,
}

impl PerformanceMonitor {
    pub fn new(operation: &str) -> Self {
        Self {
            start_time: SystemTime::now(),
            operation: operation.to_string(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: &str, value: Value) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }

    fn elapsed_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(self.start_time)
            .unwrap_or_default()
            .as_millis() as u64
    }

    fn context(&self, duration: u64) -> LogContext {
        let mut context = LogContext::new("performance", &self.operation).with_duration_ms(duration);
        for (key, value) in &self.metadata {
            context = context.with_metadata(key, value.clone());
        }
        context
    }

    pub fn finish(self) -> u64 {
        let duration = self.elapsed_ms();
        self.context(duration)
            .trace(&format!("Operation completed in {}ms", duration));
        duration
    }

    pub fn finish_with_result<T, E>(self, result: &Result<T, E>) -> u64
    where
        E: std::fmt::Display,
    {
        let duration = self.elapsed_ms();
        let context = self.context(duration);

        match result {
            Ok(_) => {
                context.trace(&format!("Operation completed successfully in {}ms", duration));
            }
            Err(e) => {
                context
                    .with_metadata("error", json!(e.to_string()))
                    .debug(&format!("Operation failed after {}ms: {}", duration, e));
            }
        }

        duration
    }
}

/// Error logging utilities
pub struct ErrorLogger;

impl ErrorLogger {
    pub fn log_error(error: &WatcherError, context: Option<LogContext>) {
        let severity = error.severity();

        let log_context = context
            .unwrap_or_else(|| LogContext::new("error", "unknown"))
            .with_metadata("error_type", json!(format!("{:?}", error)))
            .with_metadata("severity", json!(format!("{:?}", severity)));

        let message = format!("Error occurred: {}", error);

        match severity {
            ErrorSeverity::Critical | ErrorSeverity::High => log_context.error(&message),
            ErrorSeverity::Medium => log_context.warn(&message),
            ErrorSeverity::Low => log_context.info(&message),
        }
    }

    /// Upstream failure absorbed by serving a fallback value
    pub fn log_degraded(error: &WatcherError, context: LogContext, fallback: &str) {
        let context = context.with_metadata("fallback", json!(fallback));
        Self::log_error(error, Some(context));
    }
}

/// Operational metrics emitted as structured log lines
pub struct MetricsLogger;

impl MetricsLogger {
    pub fn log_rpc_call(method: &str, duration_ms: u64, success: bool) {
        let context = LogContext::new("metrics", "rpc_call")
            .with_method(method)
            .with_duration_ms(duration_ms)
            .with_metadata("success", json!(success));

        if success {
            context.debug(&format!("RPC call {} completed in {}ms", method, duration_ms));
        } else {
            context.warn(&format!("RPC call {} failed after {}ms", method, duration_ms));
        }
    }

    pub fn log_block_scanned(block_number: u64, transaction_count: usize, matched_count: usize) {
        let context = LogContext::new("metrics", "block_scanned")
            .with_block_number(block_number)
            .with_metadata("transaction_count", json!(transaction_count))
            .with_metadata("matched_count", json!(matched_count));

        context.trace(&format!(
            "Block {} scanned: {} of {} transactions matched",
            block_number, matched_count, transaction_count
        ));
    }

    pub fn log_scan_completed(address: &str, head: u64, blocks_scanned: u64, matched_count: usize, duration_ms: u64) {
        let context = LogContext::new("metrics", "scan_completed")
            .with_address(address)
            .with_block_number(head)
            .with_metadata("blocks_scanned", json!(blocks_scanned))
            .with_metadata("matched_count", json!(matched_count))
            .with_duration_ms(duration_ms);

        context.info(&format!(
            "Scanned {} blocks from {} for {}: {} transactions",
            blocks_scanned, head, address, matched_count
        ));
    }

    pub fn log_subscription(address: &str, total_subscriptions: usize) {
        let context = LogContext::new("metrics", "subscription")
            .with_address(address)
            .with_metadata("total_subscriptions", json!(total_subscriptions));

        context.info(&format!("Address {} subscribed ({} total)", address, total_subscriptions));
    }
}

/// Initialize logging for the application.
///
/// `RUST_LOG` wins over the configured level. The `json` format emits one
/// JSON object per line; `pretty` expands structured lines and prefixes plain
/// ones with a timestamp.
pub fn init_logging(config: &LoggingConfig) -> Result<(), log::SetLoggerError> {
    let json_lines = config.format == "json";

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.level.as_str()))
        .format(move |buf, record| {
            use std::io::Write;

            let message = record.args().to_string();
            let structured = serde_json::from_str::<Value>(&message).ok();

            match (json_lines, structured) {
                (true, Some(value)) => writeln!(buf, "{}", value),
                (true, None) => writeln!(
                    buf,
                    "{}",
                    json!({
                        "timestamp": chrono::Utc::now().timestamp(),
                        "level": record.level().to_string(),
                        "target": record.target(),
                        "message": message,
                    })
                ),
                (false, Some(value)) => writeln!(buf, "{}", serde_json::to_string_pretty(&value)?),
                (false, None) => writeln!(
                    buf,
                    "{} [{}] {}: {}",
                    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                    record.level(),
                    record.target(),
                    message
                ),
            }
        })
        .try_init()?;

    info!("Logging initialized (level={}, format={})", config.level, config.format);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{RpcError, ValidationError};
    use serde_json::json;

    #[test]
    fn test_log_context_creation() {
        let context = LogContext::new("registry", "subscribe");
        assert_eq!(context.component, "registry");
        assert_eq!(context.operation, "subscribe");
        assert!(context.metadata.is_empty());
    }

    #[test]
    fn test_log_context_with_metadata() {
        let context = LogContext::new("scanner", "scan")
            .with_block_number(12345)
            .with_address("0xabc")
            .with_method("eth_getBlockByNumber");

        assert_eq!(context.metadata.get("block_number"), Some(&json!(12345)));
        assert_eq!(context.metadata.get("address"), Some(&json!("0xabc")));
        assert_eq!(context.metadata.get("method"), Some(&json!("eth_getBlockByNumber")));
    }

    #[test]
    fn test_log_context_format_message() {
        let context = LogContext::new("fetcher", "current_block").with_metadata("key", json!("value"));

        let message = context.format_message("WARN", "falling back");

        let parsed: Value = serde_json::from_str(&message).expect("Should be valid JSON");
        assert_eq!(parsed["level"], "WARN");
        assert_eq!(parsed["component"], "fetcher");
        assert_eq!(parsed["operation"], "current_block");
        assert_eq!(parsed["message"], "falling back");
        assert_eq!(parsed["key"], "value");
    }

    #[test]
    fn test_performance_monitor_keeps_metadata() {
        let monitor = PerformanceMonitor::new("rpc_eth_blockNumber").with_metadata("attempt", json!(1));

        assert_eq!(monitor.operation, "rpc_eth_blockNumber");
        assert_eq!(monitor.metadata.get("attempt"), Some(&json!(1)));

        let result: Result<(), String> = Err("boom".to_string());
        let duration = monitor.finish_with_result(&result);
        assert!(duration < 1_000);
    }

    #[test]
    fn test_error_logging_does_not_panic() {
        let rpc = WatcherError::Rpc(RpcError::Status { status: 503 });
        ErrorLogger::log_degraded(&rpc, LogContext::new("fetcher", "current_block"), "cached_block");

        let validation = WatcherError::Validation(ValidationError::EmptyAddress);
        ErrorLogger::log_error(&validation, None);
    }

    #[test]
    fn test_metrics_logging_does_not_panic() {
        MetricsLogger::log_rpc_call("eth_blockNumber", 12, true);
        MetricsLogger::log_rpc_call("eth_getBlockByNumber", 250, false);
        MetricsLogger::log_block_scanned(100, 42, 1);
        MetricsLogger::log_scan_completed("0xabc", 100, 10, 3, 900);
        MetricsLogger::log_subscription("0xabc", 1);
    }
}
