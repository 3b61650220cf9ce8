use std::io::Read;

use serde_json::Value;

use super::ProtocolError;

/// Item type of a regular file.
pub const ITEM_TYPE_FILE: &str = "file";

/// A unit of content sent in a transfer.
///
/// Anything sent to a peer implements this trait: a type tag telling the
/// receiver how to interpret it, the size of its main content, a metadata
/// document sent in the item header and, when there is content, a reader for
/// it.
pub trait Item: Send + Sync {
    /// One of the `ITEM_TYPE_*` constants or a custom reverse-domain name.
    fn item_type(&self) -> &str;

    /// Total size in bytes of the main content.
    fn size(&self) -> u64;

    /// Metadata sent with the item header. Small payloads, such as a URL, can
    /// travel here entirely.
    ///
    /// # Errors
    /// Returns `ProtocolError` if the metadata cannot be produced.
    fn meta(&self) -> Result<Value, ProtocolError>;

    /// Opens the main content. Items without content report a size of zero
    /// and return `Ok(None)`.
    ///
    /// # Errors
    /// Returns `ProtocolError::IoError` if the content cannot be opened.
    fn open(&self) -> Result<Option<Box<dyn Read + Send>>, ProtocolError>;
}
