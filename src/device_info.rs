//! Device registry information for the garage door opener.
//!
//! Every sensor created for one opener reports the same identifier, which is
//! what lets the host group them under a single device node.

use serde::{Deserialize, Serialize};

/// Integration domain, used as the first half of device identifiers.
pub const DOMAIN: &str = "ryobi_gdo";

pub const MANUFACTURER: &str = "Ryobi";
pub const MODEL: &str = "GDO";
pub const DEVICE_NAME: &str = "Ryobi Garage Door Opener";

/// Static device metadata exposed alongside each entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// `(domain, device_id)` pair identifying the physical device.
    pub identifiers: (String, String),
    pub manufacturer: String,
    pub model: String,
    pub name: String,
}

impl DeviceInfo {
    /// Device info for the opener with the given id.
    pub fn for_device(device_id: &str) -> Self {
        Self {
            identifiers: (DOMAIN.to_string(), device_id.to_string()),
            manufacturer: MANUFACTURER.to_string(),
            model: MODEL.to_string(),
            name: DEVICE_NAME.to_string(),
        }
    }

    pub fn device_id(&self) -> &str {
        &self.identifiers.1
    }
}
