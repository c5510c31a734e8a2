//! Records for the user-status and login endpoint family.

use std::time::SystemTime;

use serde::Deserialize;
use uuid::Uuid;

/// Registration state of an account, as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum AccountStatus {
    /// The account exists and can log in.
    #[serde(rename = "ACTIVE")]
    Active,
    /// The identifier is not registered.
    #[serde(rename = "UNREGISTERED")]
    Unregistered,
    /// A value this library does not know about.
    #[serde(other)]
    Unknown,
}

/// How the backend wants this account to authenticate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum AuthenticationMethod {
    /// Email one-time-code flow (optionally password-backed).
    #[serde(rename = "EMAIL_PWD_2FA")]
    EmailPwd2fa,
    /// SMS one-time-code flow, CN shard only.
    #[serde(rename = "MOBILE_OTP")]
    MobileOtp,
    /// A value this library does not know about.
    #[serde(other)]
    Unknown,
}

/// Response of the user-status lookup.
#[derive(Debug, Clone, Deserialize)]
pub struct UserStatus {
    /// Registration state of the queried identifier.
    #[serde(rename = "accountStatus")]
    pub account_status: AccountStatus,
    /// Authentication method the backend expects.
    #[serde(rename = "authenticationMethod")]
    pub authentication_method: AuthenticationMethod,
}

/// Server-issued challenge correlating a `begin` call with its `complete`.
///
/// Consumed at most once by the matching completion call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    /// Opaque challenge token.
    pub challenge_id: Uuid,
    /// Local timestamp of when the challenge was received.
    pub issued_at: SystemTime,
}

/// Wire shape of a begin-login response.
#[derive(Debug, Deserialize)]
pub(crate) struct ChallengePayload {
    #[serde(rename = "challengeId")]
    pub challenge_id: Uuid,
}

/// Bearer credential issued on successful login.
///
/// Held by the session for its lifetime; the token string may be exported
/// and re-imported later to skip the authentication flow entirely. The
/// server is the sole authority on validity; the client never expires
/// tokens locally.
#[derive(Debug, Clone, Deserialize)]
pub struct BearerCredential {
    /// Account UUID the token belongs to.
    #[serde(rename = "account")]
    pub account: Uuid,
    /// Opaque bearer token.
    #[serde(rename = "token")]
    pub token: String,
    /// Token scheme; the backend only ever issues `Bearer`.
    #[serde(rename = "tokenType")]
    pub token_type: String,
}
