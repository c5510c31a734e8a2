//! Typed records for backend response payloads.
//!
//! Every response shape gets an explicit record with serde renames for the
//! vendor's (inconsistently cased) field names, plus the single
//! [`from_payload`] translation point that fails fast with a
//! [`ProtocolError`](crate::DysonError::Protocol) naming the offending
//! field, instead of deferring missing-field failures to the point of use.

mod auth;
mod device;
mod iot;
mod release;

pub use auth::{AccountStatus, AuthenticationMethod, BearerCredential, Challenge, UserStatus};
pub(crate) use auth::ChallengePayload;
pub use device::{ConnectionCategory, Device};
pub use iot::{IoTCredentials, IoTData};
pub use release::PendingRelease;

use serde::de::DeserializeOwned;

use crate::error::{DysonError, Result};

/// Translate a JSON payload into a typed record.
///
/// serde's error already names the missing or mistyped field; it is
/// surfaced verbatim inside the protocol error.
pub fn from_payload<T: DeserializeOwned>(payload: serde_json::Value) -> Result<T> {
    serde_json::from_value(payload).map_err(|e| DysonError::Protocol(e.to_string()))
}
