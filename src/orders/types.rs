use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error_handling::types::ProcessError;
use crate::storage::{AccessOptions, BlobStore, Payload};

/// An order is a mapping of menu item to quantity.
pub type Order = BTreeMap<String, u32>;

/// Input to the `get_bill` action: the JSON output of `get_order`. The order
/// may be inlined (as an object or a JSON-encoded string) or referenced by
/// container and path for a blob-storage fallback.
#[derive(Debug, Deserialize)]
pub struct OrderData {
    pub order_id: String,
    #[serde(default, deserialize_with = "order_inline_or_encoded")]
    pub order: Option<Order>,
    #[serde(default)]
    pub storage_container: Option<String>,
    #[serde(default)]
    pub storage_path: Option<String>,
}

/// Accepts the order either as a plain object or as the JSON string that
/// `get_order` nests into its output file.
fn order_inline_or_encoded<'de, D>(deserializer: D) -> Result<Option<Order>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(encoded)) => {
            serde_json::from_str(&encoded).map(Some).map_err(serde::de::Error::custom)
        }
        Some(other) => serde_json::from_value(other).map(Some).map_err(serde::de::Error::custom),
    }
}

impl OrderData {
    /// Parses the raw `--order_data` JSON and resolves the order, reading it
    /// from blob storage when only a storage reference was provided.
    pub async fn resolve(raw: &str, store: &BlobStore) -> Result<(String, Order), ProcessError> {
        let data: OrderData = serde_json::from_str(raw)?;

        let order = match data.order {
            Some(order) => order,
            None => match (&data.storage_container, &data.storage_path) {
                (Some(container), Some(path)) => {
                    let payload = store
                        .read_file(path, &AccessOptions::container(container))
                        .await?;
                    match payload {
                        Payload::Json(value) => serde_json::from_value(value)?,
                        Payload::Text(text) => serde_json::from_str(&text)?,
                    }
                }
                _ => return Err(ProcessError::MissingOrder(data.order_id)),
            },
        };

        Ok((data.order_id, order))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_inline_order_object() {
        let data: OrderData =
            serde_json::from_str(r#"{"order_id": "A001", "order": {"beef": 1, "lamb": 1}}"#)
                .unwrap();
        let order = data.order.unwrap();
        assert_eq!(order.get("beef"), Some(&1));
        assert_eq!(order.get("lamb"), Some(&1));
    }

    #[test]
    fn parses_json_encoded_order_string() {
        let data: OrderData = serde_json::from_str(
            r#"{"order_id": "A001", "order": "{\"beef\": 1, \"lamb\": 1}"}"#,
        )
        .unwrap();
        assert_eq!(data.order.unwrap().get("lamb"), Some(&1));
    }

    #[test]
    fn order_is_optional() {
        let data: OrderData = serde_json::from_str(
            r#"{"order_id": "A001", "storage_container": "orders", "storage_path": "order/A001.json"}"#,
        )
        .unwrap();
        assert!(data.order.is_none());
        assert_eq!(data.storage_container.as_deref(), Some("orders"));
    }

    #[tokio::test]
    async fn missing_order_without_fallback_is_a_fault() {
        let store = BlobStore::new();
        let err = OrderData::resolve(r#"{"order_id": "A009"}"#, &store)
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessError::MissingOrder(id) if id == "A009"));
    }
}
