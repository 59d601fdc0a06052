#![allow(dead_code)]

use async_trait::async_trait;
use eth_address_watcher::error::RpcError;
use eth_address_watcher::RpcTransport;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

const UNAVAILABLE: u64 = u64::MAX;

/// In-process stand-in for an Ethereum node
pub struct FakeNode {
    head: AtomicU64,
    blocks: Mutex<HashMap<u64, Vec<Value>>>,
    broken_blocks: Mutex<HashSet<u64>>,
    requests: Mutex<Vec<(String, Vec<Value>)>>,
}

impl FakeNode {
    pub fn new(head: u64) -> Self {
        Self {
            head: AtomicU64::new(head),
            blocks: Mutex::new(HashMap::new()),
            broken_blocks: Mutex::new(HashSet::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_block(self, number: u64, transactions: Vec<Value>) -> Self {
        self.blocks.lock().unwrap().insert(number, transactions);
        self
    }

    pub fn with_broken_block(self, number: u64) -> Self {
        self.broken_blocks.lock().unwrap().insert(number);
        self
    }

    pub fn set_head(&self, head: u64) {
        self.head.store(head, Ordering::SeqCst);
    }

    /// Every following `eth_blockNumber` fails at the transport level
    pub fn go_offline(&self) {
        self.head.store(UNAVAILABLE, Ordering::SeqCst);
    }

    pub fn requested_blocks(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(method, _)| method == "eth_getBlockByNumber")
            .filter_map(|(_, params)| params.first().and_then(Value::as_str).map(str::to_string))
            .collect()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn respond(result: Value) -> Vec<u8> {
        json!({"jsonrpc": "2.0", "id": 1, "result": result}).to_string().into_bytes()
    }
}

#[async_trait]
impl RpcTransport for FakeNode {
    async fn request(&self, method: &str, params: Vec<Value>) -> Result<Vec<u8>, RpcError> {
        self.requests.lock().unwrap().push((method.to_string(), params.clone()));

        match method {
            "eth_blockNumber" => match self.head.load(Ordering::SeqCst) {
                UNAVAILABLE => Err(RpcError::Connection("node unreachable".to_string())),
                head => Ok(Self::respond(json!(format!("0x{:x}", head)))),
            },
            "eth_getBlockByNumber" => {
                let number = params
                    .first()
                    .and_then(Value::as_str)
                    .and_then(|hex| u64::from_str_radix(hex.trim_start_matches("0x"), 16).ok())
                    .ok_or_else(|| RpcError::InvalidResponse("bad block param".to_string()))?;

                if self.broken_blocks.lock().unwrap().contains(&number) {
                    return Ok(b"<html>502 Bad Gateway</html>".to_vec());
                }

                let transactions = self.blocks.lock().unwrap().get(&number).cloned().unwrap_or_default();
                Ok(Self::respond(json!({
                    "number": format!("0x{:x}", number),
                    "transactions": transactions,
                })))
            }
            other => Err(RpcError::InvalidResponse(format!("unsupported method {}", other))),
        }
    }
}

pub fn tx(from: &str, to: &str, value: &str) -> Value {
    json!({
        "hash": format!("0x{}{}{}", from.trim_start_matches("0x"), to.trim_start_matches("0x"), value),
        "from": from,
        "to": to,
        "value": value,
        "gas": "0x5208",
    })
}
