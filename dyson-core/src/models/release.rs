//! Pending firmware release record.

use serde::Deserialize;

/// A firmware release staged for a device but not yet installed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PendingRelease {
    /// Version string of the staged release.
    pub version: String,
    /// Whether the release has been pushed to the device.
    pub pushed: bool,
}
