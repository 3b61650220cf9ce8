//! Application-level configuration: file locations, well-known keys and
//! first-start provisioning of the durable store.

mod file_creation;
mod identity;
mod keys;
mod paths;

pub use file_creation::create_default_store_file;
pub use identity::{DeviceIdentity, default_device_name};
pub use keys::{KEY_DEVICE_NAME, KEY_DEVICE_UUID};
pub use paths::{ConfigPaths, STORE_FILE_NAME};
