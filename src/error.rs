use thiserror::Error;

/// Main error type for the address watcher
#[derive(Error, Debug)]
pub enum WatcherError {
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("System error: {0}")]
    System(#[from] SystemError),
}

/// Errors raised while talking to the upstream JSON-RPC node
#[derive(Error, Debug)]
pub enum RpcError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("RPC method error: code={code}, message={message}")]
    Method { code: i64, message: String },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Unexpected HTTP status: {status}")]
    Status { status: u16 },

    #[error("Timeout after {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("Connection failed: {0}")]
    Connection(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Configuration parsing failed: {0}")]
    Parsing(String),

    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),
}

/// Client input errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Address is required")]
    EmptyAddress,
}

/// System-level errors
#[derive(Error, Debug)]
pub enum SystemError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Server error: {0}")]
    Server(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, WatcherError>;

/// Error severity levels for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// The process cannot continue
    Critical,
    /// A request could not be served as asked
    High,
    /// Upstream degradation that was absorbed
    Medium,
    /// Informational, usually bad client input
    Low,
}

impl WatcherError {
    /// Get the severity level of an error
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            WatcherError::Config(_) => ErrorSeverity::Critical,
            WatcherError::System(_) => ErrorSeverity::Critical,

            WatcherError::Rpc(RpcError::Connection(_)) => ErrorSeverity::High,
            WatcherError::Rpc(RpcError::Timeout { .. }) => ErrorSeverity::High,

            WatcherError::Rpc(_) => ErrorSeverity::Medium,

            WatcherError::Validation(_) => ErrorSeverity::Low,
        }
    }
}
