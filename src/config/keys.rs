/// Unique identifier of this device, a UUID generated on first start.
pub const KEY_DEVICE_UUID: &str = "net.nitroshare.device_uuid";

/// Human-readable name other devices see for this one.
pub const KEY_DEVICE_NAME: &str = "net.nitroshare.device_name";
