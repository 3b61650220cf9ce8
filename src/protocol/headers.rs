use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Item, ProtocolError};

/// Header sent once at the start of a transfer.
///
/// Sizes and counts travel as decimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferHeader {
    /// Name of the sending device
    pub name: String,
    /// Combined content size of every item, in bytes
    pub size: String,
    /// Number of items that follow
    pub count: String,
}

/// Header sent before each item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemHeader {
    /// The item's type tag
    #[serde(rename = "type")]
    pub item_type: String,
    /// The item's metadata document
    pub meta: Value,
}

impl TransferHeader {
    /// Describes a transfer of `items` from the device called `name`.
    pub fn for_items(name: &str, items: &[&dyn Item]) -> Self {
        let size: u64 = items.iter().map(|item| item.size()).sum();

        Self {
            name: name.to_string(),
            size: size.to_string(),
            count: items.len().to_string(),
        }
    }

    /// Encodes the header as JSON.
    ///
    /// # Errors
    /// Returns `ProtocolError::SerializationError` if encoding fails.
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(|e| ProtocolError::SerializationError {
            content_type: "transfer header".to_string(),
            details: e.to_string(),
        })
    }
}

impl ItemHeader {
    /// Captures the type tag and metadata of `item`.
    ///
    /// # Errors
    /// Returns the item's error if its metadata cannot be produced.
    pub fn for_item(item: &dyn Item) -> Result<Self, ProtocolError> {
        Ok(Self {
            item_type: item.item_type().to_string(),
            meta: item.meta()?,
        })
    }

    /// Encodes the header as JSON.
    ///
    /// # Errors
    /// Returns `ProtocolError::SerializationError` if encoding fails.
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(|e| ProtocolError::SerializationError {
            content_type: "item header".to_string(),
            details: e.to_string(),
        })
    }
}
