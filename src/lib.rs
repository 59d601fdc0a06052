pub mod api;
pub mod blockchain;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod parser;
pub mod registry;

pub use blockchain::{BlockFetcher, HttpTransport, RpcTransport, TransactionScanner};
pub use config::{ApiConfig, AppConfig, LoggingConfig, RpcConfig};
pub use error::{Result, WatcherError};
pub use logging::{ErrorLogger, LogContext, MetricsLogger, PerformanceMonitor};
pub use models::{Address, Transaction};
pub use parser::{EthereumParser, Parser};
pub use registry::Registry;
