use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::models::Address;

/// A transaction as returned inside a full `eth_getBlockByNumber` result.
///
/// Only `from`, `to` and `value` are interpreted; every other field the node
/// sends is kept in `extra` and serialized back out unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub from: String,
    /// `None` for contract creation
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub value: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Transaction {
    pub fn new(from: &str, to: &str, value: &str) -> Self {
        Self {
            from: from.to_string(),
            to: Some(to.to_string()),
            value: value.to_string(),
            extra: Map::new(),
        }
    }

    /// True when the address is the sender or the recipient
    pub fn involves(&self, address: &Address) -> bool {
        address.matches(&self.from) || self.to.as_deref().map_or(false, |to| address.matches(to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_transaction_passes_through_unknown_fields() {
        let raw = json!({
            "hash": "0x88df016429689c079f3b2f6ad39fa052532c56795b733da78a91ebe6a713944b",
            "blockNumber": "0x1a",
            "from": "0xA7d9ddBE1f17865597fBD27EC712455208B6B76d",
            "to": "0xf02c1c8e6114b1dbe8937a39260b5b0a374432bb",
            "value": "0xf3dbb76162000",
            "gas": "0xc350",
            "input": "0x68656c6c6f21"
        });

        let tx: Transaction = serde_json::from_value(raw.clone()).expect("Failed to deserialize");
        assert_eq!(tx.from, "0xA7d9ddBE1f17865597fBD27EC712455208B6B76d");
        assert_eq!(tx.to.as_deref(), Some("0xf02c1c8e6114b1dbe8937a39260b5b0a374432bb"));
        assert_eq!(tx.value, "0xf3dbb76162000");
        assert_eq!(tx.extra.len(), 4);

        let serialized = serde_json::to_value(&tx).expect("Failed to serialize");
        assert_eq!(serialized, raw);
    }

    #[test]
    fn test_contract_creation_has_null_recipient() {
        let raw = json!({"from": "0xabc", "to": null, "value": "0x0"});

        let tx: Transaction = serde_json::from_value(raw).unwrap();
        assert!(tx.to.is_none());

        let serialized = serde_json::to_string(&tx).unwrap();
        assert!(serialized.contains("\"to\":null"));
    }

    #[test]
    fn test_null_sender_and_value_decode_as_empty() {
        let raw = json!({"from": null, "to": "0xabc", "value": null, "hash": "0x01"});

        let tx: Transaction = serde_json::from_value(raw).unwrap();
        assert_eq!(tx.from, "");
        assert_eq!(tx.value, "");
        assert_eq!(tx.to.as_deref(), Some("0xabc"));
        assert!(tx.involves(&Address::new("0xABC")));
    }

    #[test]
    fn test_involves_sender_or_recipient() {
        let address = Address::new("0x123456789ABCDEF");

        assert!(Transaction::new("0x123456789abcdef", "0xaabbccddeeff", "100").involves(&address));
        assert!(Transaction::new("0xaabbccddeeff", "0x123456789ABCDEF", "200").involves(&address));
        assert!(!Transaction::new("0xaabbccddeeff", "0x1111", "300").involves(&address));

        let creation = Transaction {
            to: None,
            ..Transaction::new("0xaabbccddeeff", "", "0")
        };
        assert!(!creation.involves(&address));
    }
}
