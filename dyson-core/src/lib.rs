//! Protocol core for the Dyson cloud device-management API.
//!
//! This crate is pure: it classifies account identifiers, drives the
//! two-step one-time-code login flow as a sans-IO state machine, holds the
//! issued bearer credential, translates backend payloads into typed
//! records, and decrypts a device's local broker credentials. It performs
//! no network I/O itself; the `dyson-rest` crate layers blocking and
//! async HTTP front ends over the [`protocol::Session`] engine defined
//! here.
//!
//! ## Quick start
//!
//! ```ignore
//! // 1. Build a session; identifier validation happens here, offline.
//! let mut session = Session::new("user@example.com", "US", Config::default())?;
//!
//! // 2. Drive each operation through your transport of choice:
//! let request = session.begin_login_request();
//! let response = transport.execute(session.hostname(), request)?;
//! let challenge = session.handle_begin_login(response)?;
//!
//! // 3. ...prompt the user for the emailed code, then complete:
//! let request = session.complete_login_request(None, "123456")?;
//! let response = transport.execute(session.hostname(), request)?;
//! let credential = session.handle_complete_login(response)?;
//! ```

pub mod account;
pub mod config;
pub mod crypto;
pub mod error;
pub mod models;
pub mod protocol;

pub use account::AccountIdentifier;
pub use config::Config;
pub use crypto::{LocalCredentials, decrypt_local_credentials};
pub use error::{DecryptStage, DysonError, Result};
pub use models::{
    AccountStatus, AuthenticationMethod, BearerCredential, Challenge, ConnectionCategory, Device,
    IoTCredentials, IoTData, PendingRelease, UserStatus,
};
pub use protocol::{ApiRequest, ApiResponse, AuthOutcome, Method, Session};
