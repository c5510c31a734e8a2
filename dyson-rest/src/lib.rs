//! HTTP front ends for the Dyson cloud device-management API.
//!
//! Two call styles over the one protocol engine in `dyson-core`:
//! [`DysonClient`] (async, `reqwest` + any Tokio-compatible runtime) and
//! [`blocking::DysonClient`]. Both are thin adapters around
//! [`dyson_core::Session`]: they build logical requests, execute them over
//! HTTPS, and hand the responses back to the engine, so the two clients
//! honor the protocol identically by construction.
//!
//! Transport-level failures (connect, TLS, timeout, cancellation) surface
//! as [`DysonError::Transport`] unmodified; no call is retried.

pub mod blocking;
mod client;

pub use client::DysonClient;

// Re-export the core vocabulary so callers need only one crate.
pub use dyson_core::{
    AccountIdentifier, AccountStatus, AuthenticationMethod, BearerCredential, Challenge, Config,
    ConnectionCategory, DecryptStage, Device, DysonError, IoTCredentials, IoTData,
    LocalCredentials, PendingRelease, Result, UserStatus,
    protocol::{AuthOutcome, Session},
};
