//! Records for the per-device cloud IoT authorization endpoint.

use serde::Deserialize;
use uuid::Uuid;

/// Signed token material for connecting to the vendor's cloud MQTT broker.
#[derive(Debug, Clone, Deserialize)]
pub struct IoTCredentials {
    /// MQTT client identifier.
    #[serde(rename = "ClientId")]
    pub client_id: Uuid,
    /// Name of the cloud-side custom authorizer.
    #[serde(rename = "CustomAuthorizerName")]
    pub custom_authorizer_name: String,
    /// Header key the token is presented under.
    #[serde(rename = "TokenKey")]
    pub token_key: String,
    /// Signature over the token value.
    #[serde(rename = "TokenSignature")]
    pub token_signature: String,
    /// The token value itself.
    #[serde(rename = "TokenValue")]
    pub token_value: Uuid,
}

/// Response of the IoT credential lookup: broker endpoint plus credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct IoTData {
    /// Hostname of the cloud MQTT broker for this device.
    #[serde(rename = "Endpoint")]
    pub endpoint: String,
    /// Connection credentials.
    #[serde(rename = "IoTCredentials")]
    pub iot_credentials: IoTCredentials,
}
