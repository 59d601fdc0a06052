pub mod rpc_client;
pub mod block_fetcher;
pub mod scanner;

pub use rpc_client::{FnTransport, HttpTransport, JsonRpcRequest, JsonRpcResponse, RpcTransport};
pub use block_fetcher::BlockFetcher;
pub use scanner::{scan_range, TransactionScanner, SCAN_WINDOW};
