//! Transfer items and the JSON headers that describe them on the wire.

mod error;
mod headers;
mod item;

pub use error::ProtocolError;
pub use headers::{ItemHeader, TransferHeader};
pub use item::{ITEM_TYPE_FILE, Item};
