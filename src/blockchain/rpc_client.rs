use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::error::RpcError;
use crate::logging::LogContext;

#[derive(Debug, Serialize)]
pub struct JsonRpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub method: &'a str,
    pub params: Vec<Value>,
    pub id: u64,
}

impl<'a> JsonRpcRequest<'a> {
    pub fn new(method: &'a str, params: Vec<Value>) -> Self {
        Self {
            jsonrpc: "2.0",
            method,
            params,
            id: 1,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

impl JsonRpcResponse {
    /// Decode a raw response body into its `result`.
    ///
    /// A JSON-RPC error object becomes `RpcError::Method`; an absent result
    /// decodes as `Value::Null`.
    pub fn decode(body: &[u8]) -> Result<Value, RpcError> {
        let response: JsonRpcResponse = serde_json::from_slice(body)?;

        if let Some(error) = response.error {
            return Err(RpcError::Method {
                code: error.code,
                message: error.message,
            });
        }

        Ok(response.result.unwrap_or(Value::Null))
    }
}

/// Issues one JSON-RPC call and hands back the raw response body.
///
/// This is the only seam between the scanning logic and the network.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    async fn request(&self, method: &str, params: Vec<Value>) -> Result<Vec<u8>, RpcError>;
}

/// JSON-RPC over HTTP POST
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: String,
    timeout_seconds: u64,
}

impl HttpTransport {
    pub fn new(endpoint: &str, timeout_seconds: u64) -> Result<Self, RpcError> {
        let context = LogContext::new("rpc_client", "initialization")
            .with_metadata("endpoint", serde_json::json!(endpoint))
            .with_metadata("timeout_seconds", serde_json::json!(timeout_seconds));
        context.info("Initializing RPC client");

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            timeout_seconds,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn classify(&self, error: reqwest::Error) -> RpcError {
        if error.is_timeout() {
            RpcError::Timeout {
                seconds: self.timeout_seconds,
            }
        } else if error.is_connect() {
            RpcError::Connection(error.to_string())
        } else {
            RpcError::Http(error)
        }
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn request(&self, method: &str, params: Vec<Value>) -> Result<Vec<u8>, RpcError> {
        let request = JsonRpcRequest::new(method, params);

        LogContext::new("rpc_client", "request")
            .with_method(method)
            .trace(&format!("Sending RPC request: {}", method));

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RpcError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| self.classify(e))?;
        Ok(body.to_vec())
    }
}

/// Adapts a plain function into a transport. Used to stand in for a node.
pub struct FnTransport<F> {
    handler: F,
}

impl<F> FnTransport<F>
where
    F: Fn(&str, &[Value]) -> Result<Vec<u8>, RpcError> + Send + Sync,
{
    pub fn new(handler: F) -> Self {
        Self { handler }
    }
}

#[async_trait]
impl<F> RpcTransport for FnTransport<F>
where
    F: Fn(&str, &[Value]) -> Result<Vec<u8>, RpcError> + Send + Sync,
{
    async fn request(&self, method: &str, params: Vec<Value>) -> Result<Vec<u8>, RpcError> {
        (self.handler)(method, &params)
    }
}

/// Parse a `0x`-prefixed hex quantity
pub fn parse_hex_quantity(hex_str: &str) -> Result<u64, RpcError> {
    let digits = hex_str
        .strip_prefix("0x")
        .or_else(|| hex_str.strip_prefix("0X"))
        .unwrap_or(hex_str);

    u64::from_str_radix(digits, 16)
        .map_err(|e| RpcError::InvalidResponse(format!("Failed to parse hex quantity '{}': {}", hex_str, e)))
}

pub fn format_hex_quantity(value: u64) -> String {
    format!("0x{:x}", value)
}
