use std::{env, fs};

use uuid::Uuid;

use super::{KEY_DEVICE_NAME, KEY_DEVICE_UUID};
use crate::config_store::ConfigStore;

const FALLBACK_DEVICE_NAME: &str = "nitroshare";

/// The identity this device announces to its peers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    /// Stable unique identifier
    pub uuid: String,
    /// Human-readable device name
    pub name: String,
}

impl DeviceIdentity {
    /// Reads the device identity, assigning defaults on first start.
    ///
    /// A missing UUID is generated once and then persisted with the rest of
    /// the store, as is a missing name (defaulting to the host name).
    pub fn ensure(store: &ConfigStore) -> Self {
        let uuid = store.get(KEY_DEVICE_UUID, &Uuid::new_v4().to_string());
        let name = store.get(KEY_DEVICE_NAME, &default_device_name());

        Self { uuid, name }
    }
}

/// Host name of this machine, or a fixed name when it cannot be determined.
pub fn default_device_name() -> String {
    fs::read_to_string("/etc/hostname")
        .ok()
        .or_else(|| env::var("HOSTNAME").ok())
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| FALLBACK_DEVICE_NAME.to_string())
}
