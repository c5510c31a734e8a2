//! Device records from the provisioning manifest.

use serde::Deserialize;

/// Which local/remote connectivity modes a device supports.
///
/// Decides whether local-credential decryption is applicable at all:
/// devices without a local broker ship no encrypted credential blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ConnectionCategory {
    /// Local (LEC) plus cloud connectivity. Observed on robot products,
    /// whose credential payloads carry trailing data after the JSON body.
    #[serde(rename = "lecAndWifi")]
    LecAndWifi,
    /// Local connectivity only.
    #[serde(rename = "lecOnly")]
    LecOnly,
    /// Cloud connectivity only.
    #[serde(rename = "wifiOnly")]
    WifiOnly,
    /// No connectivity; the record exists for warranty purposes.
    #[serde(rename = "nonConnected")]
    NonConnected,
    /// A category this library does not know about.
    #[serde(other)]
    Unknown,
}

impl ConnectionCategory {
    /// Whether devices of this category expose a local broker.
    pub fn supports_local_connection(self) -> bool {
        matches!(self, Self::LecAndWifi | Self::LecOnly | Self::WifiOnly)
    }
}

/// Immutable snapshot of one device from a manifest listing.
///
/// Field names on the wire mix casings; the renames below match the
/// backend exactly and are not negotiable.
#[derive(Debug, Clone, Deserialize)]
pub struct Device {
    /// Device serial number, also the local broker username.
    #[serde(rename = "serialNumber")]
    pub serial_number: String,
    /// User-assigned device name.
    #[serde(rename = "name")]
    pub name: String,
    /// Internal device type code.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// Installed firmware version.
    #[serde(rename = "Version")]
    pub version: String,
    /// Encrypted local broker credentials, base64 text. Absent on
    /// non-connected devices.
    #[serde(rename = "LocalCredentials", default)]
    pub local_credentials: Option<String>,
    /// Whether the device auto-installs firmware.
    #[serde(rename = "AutoUpdate", default)]
    pub auto_update: bool,
    /// Whether newer firmware is available.
    #[serde(rename = "NewVersionAvailable", default)]
    pub new_version_available: bool,
    /// Product family code.
    #[serde(rename = "ProductType")]
    pub product_type: String,
    /// Legacy connection type string.
    #[serde(rename = "ConnectionType", default)]
    pub connection_type: Option<String>,
    /// Product category ("ec", "robot", ...).
    #[serde(rename = "category", default)]
    pub category: Option<String>,
    /// Supported connectivity modes.
    #[serde(rename = "connectionCategory")]
    pub connection_category: ConnectionCategory,
}

impl Device {
    /// Whether this device carries a decryptable local credential blob.
    pub fn has_local_credentials(&self) -> bool {
        self.connection_category.supports_local_connection() && self.local_credentials.is_some()
    }
}
