//! The protocol engine: session state plus sans-IO request/response pairs.
//!
//! Every backend operation is split into a `*_request()` half that builds a
//! logical [`ApiRequest`] and a `handle_*()` half that interprets the
//! logical [`ApiResponse`]. The engine itself performs no I/O; the blocking
//! and async front ends both drive these same two halves, which is what
//! keeps their behavior from drifting apart.
//!
//! A [`Session`] is built for one account and one logical flow of control.
//! It holds at most one outstanding login challenge; issuing a second
//! `begin` discards the first challenge as the implicit default for a
//! later `complete`. There is no internal locking; callers needing
//! concurrent authentication of several accounts use one session each.

use std::time::SystemTime;

use uuid::Uuid;

use crate::account::{AccountIdentifier, api_hostname};
use crate::config::Config;
use crate::crypto::{self, LocalCredentials};
use crate::error::{DysonError, Result};
use crate::models::{
    self, BearerCredential, Challenge, Device, IoTData, PendingRelease, UserStatus,
};

/// HTTP method of a logical request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
}

/// A logical request for the transport layer to execute.
///
/// The transport owns TLS, pooling, timeouts and cancellation; the engine
/// only describes what to send.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: Method,
    /// Path plus query string, relative to the regional hostname.
    pub path: String,
    /// JSON body, if any.
    pub body: Option<serde_json::Value>,
    /// Whether the bearer credential must be attached.
    pub authenticated: bool,
}

/// A logical response handed back to the engine.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Parsed JSON body; [`serde_json::Value::Null`] when the body was
    /// empty or not JSON.
    pub body: serde_json::Value,
}

impl ApiResponse {
    /// A 200 response with the given body.
    pub fn ok(body: serde_json::Value) -> Self {
        Self { status: 200, body }
    }
}

/// Outcome of the composite [`authenticate`](crate::protocol) flow.
///
/// "Needs a code" is an expected state, not a failure, so it gets its own
/// variant rather than an error; callers cannot mistake it for one.
#[derive(Debug, Clone)]
pub enum AuthOutcome {
    /// A challenge was issued and an OTP code is now needed.
    Pending(Challenge),
    /// Login completed; the credential is stored in the session.
    Authenticated(BearerCredential),
}

/// Protocol session for one account: identifier, region, credential vault
/// and the login state machine.
#[derive(Debug)]
pub struct Session {
    config: Config,
    country: String,
    identifier: AccountIdentifier,
    provisioned: bool,
    api_version: Option<String>,
    challenge_id: Option<Uuid>,
    account: Option<Uuid>,
    auth_token: Option<String>,
}

impl Session {
    /// Create a session for `identifier` in `country`.
    ///
    /// The identifier is classified and validated immediately; a mobile
    /// number outside the SMS-capable region fails here, before any
    /// network traffic.
    pub fn new(identifier: &str, country: &str, config: Config) -> Result<Self> {
        let identifier = AccountIdentifier::resolve(identifier, country)?;
        Ok(Self {
            config,
            country: country.to_string(),
            identifier,
            provisioned: false,
            api_version: None,
            challenge_id: None,
            account: None,
            auth_token: None,
        })
    }

    /// Backend hostname for this session's region.
    pub fn hostname(&self) -> &'static str {
        api_hostname(&self.country)
    }

    /// The session configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The validated account identifier.
    pub fn identifier(&self) -> &AccountIdentifier {
        &self.identifier
    }

    /// Whether the provisioning handshake has completed.
    pub fn provisioned(&self) -> bool {
        self.provisioned
    }

    /// API version reported by the provisioning handshake, if it ran.
    pub fn api_version(&self) -> Option<&str> {
        self.api_version.as_deref()
    }

    /// The challenge currently tracked as the implicit completion default.
    pub fn challenge_id(&self) -> Option<Uuid> {
        self.challenge_id
    }

    /// Account UUID, known after login or when imported with a token.
    pub fn account_id(&self) -> Option<Uuid> {
        self.account
    }

    // ---- credential vault -------------------------------------------------

    /// Current bearer token, if any.
    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    /// Replace the bearer token, bypassing the login state machine.
    ///
    /// Importing a token moves the session straight to the authenticated
    /// state without contacting the backend; validity is only discovered on
    /// the first authenticated call. Passing `None` clears the credential.
    pub fn set_auth_token(&mut self, token: Option<String>) {
        self.auth_token = token;
    }

    // ---- provisioning -----------------------------------------------------

    /// Build the provisioning handshake request.
    ///
    /// Documented precondition for the rest of the API: the backend answers
    /// later calls with a generic error if no client ever provisioned. The
    /// engine does not enforce the ordering itself.
    pub fn provision_request(&self) -> ApiRequest {
        ApiRequest {
            method: Method::Get,
            path: "/v1/provisioningservice/application/Android/version".to_string(),
            body: None,
            authenticated: false,
        }
    }

    /// Interpret the provisioning response; returns the API version token.
    pub fn handle_provision(&mut self, response: ApiResponse) -> Result<String> {
        check_plain_status(&response)?;
        let version = response
            .body
            .as_str()
            .ok_or_else(|| {
                DysonError::Protocol("provisioning response is not a version string".to_string())
            })?
            .to_string();
        self.provisioned = true;
        self.api_version = Some(version.clone());
        log::debug!("provisioned against API version {version}");
        Ok(version)
    }

    // ---- user status ------------------------------------------------------

    /// Build the user-status lookup request. Email identifiers only.
    pub fn user_status_request(&self) -> Result<ApiRequest> {
        let AccountIdentifier::Email(email) = &self.identifier else {
            return Err(DysonError::InvalidIdentifier(
                "user status lookup requires an email identifier".to_string(),
            ));
        };
        Ok(ApiRequest {
            method: Method::Post,
            path: format!(
                "/v3/userregistration/email/userstatus?country={}",
                self.country
            ),
            body: Some(serde_json::json!({ "email": email })),
            authenticated: false,
        })
    }

    /// Interpret the user-status response.
    pub fn handle_user_status(&self, response: ApiResponse) -> Result<UserStatus> {
        check_auth_status(&response)?;
        models::from_payload(response.body)
    }

    // ---- login state machine ----------------------------------------------

    /// Build the begin-login request for this identifier kind.
    ///
    /// The backend reacts by delivering an OTP out of band: email for email
    /// identifiers, SMS for mobile ones.
    pub fn begin_login_request(&self) -> ApiRequest {
        match &self.identifier {
            AccountIdentifier::Email(email) => ApiRequest {
                method: Method::Post,
                path: format!(
                    "/v3/userregistration/email/auth?country={}&culture=en-US",
                    self.country
                ),
                body: Some(serde_json::json!({ "email": email })),
                authenticated: false,
            },
            AccountIdentifier::Mobile(mobile) => ApiRequest {
                method: Method::Post,
                path: "/v3/userregistration/mobile/auth".to_string(),
                body: Some(serde_json::json!({ "mobile": mobile })),
                authenticated: false,
            },
        }
    }

    /// Interpret the begin-login response.
    ///
    /// The returned challenge replaces any previously tracked one as the
    /// implicit default for a later completion.
    pub fn handle_begin_login(&mut self, response: ApiResponse) -> Result<Challenge> {
        check_auth_status(&response)?;
        let payload: models::ChallengePayload = models::from_payload(response.body)?;
        self.challenge_id = Some(payload.challenge_id);
        log::debug!("login challenge issued: {}", payload.challenge_id);
        Ok(Challenge {
            challenge_id: payload.challenge_id,
            issued_at: SystemTime::now(),
        })
    }

    /// Build the complete-login request.
    ///
    /// `challenge_id` overrides the tracked challenge when supplied; the
    /// backend is authoritative about which challenges are still open, so
    /// an explicit identifier is accepted even without a prior `begin` on
    /// this session.
    pub fn complete_login_request(
        &self,
        challenge_id: Option<Uuid>,
        otp_code: &str,
    ) -> Result<ApiRequest> {
        let challenge_id = challenge_id.or(self.challenge_id).ok_or_else(|| {
            DysonError::AuthRejected(
                "no outstanding login challenge; begin login first or supply a challenge id"
                    .to_string(),
            )
        })?;

        let (path, body) = match &self.identifier {
            AccountIdentifier::Email(email) => (
                "/v3/userregistration/email/verify",
                serde_json::json!({
                    "email": email,
                    "challengeId": challenge_id,
                    "otpCode": otp_code,
                }),
            ),
            AccountIdentifier::Mobile(mobile) => (
                "/v3/userregistration/mobile/verify",
                serde_json::json!({
                    "mobile": mobile,
                    "challengeId": challenge_id,
                    "otpCode": otp_code,
                }),
            ),
        };
        Ok(ApiRequest {
            method: Method::Post,
            path: path.to_string(),
            body: Some(body),
            authenticated: false,
        })
    }

    /// Interpret the complete-login response and store the credential.
    pub fn handle_complete_login(&mut self, response: ApiResponse) -> Result<BearerCredential> {
        check_auth_status(&response)?;
        let credential: BearerCredential = models::from_payload(response.body)?;
        self.auth_token = Some(credential.token.clone());
        self.account = Some(credential.account);
        self.challenge_id = None;
        log::debug!("authenticated as account {}", credential.account);
        Ok(credential)
    }

    // ---- device & capability catalog --------------------------------------

    /// Build the device listing request.
    pub fn devices_request(&self) -> Result<ApiRequest> {
        self.require_token()?;
        Ok(ApiRequest {
            method: Method::Get,
            path: "/v2/provisioningservice/manifest".to_string(),
            body: None,
            authenticated: true,
        })
    }

    /// Interpret the device listing. Order is the backend's, unsorted.
    pub fn handle_devices(&self, response: ApiResponse) -> Result<Vec<Device>> {
        check_catalog_status(&response)?;
        models::from_payload(response.body)
    }

    /// Build the IoT credential request for one device.
    pub fn iot_credentials_request(&self, serial: &str) -> Result<ApiRequest> {
        self.require_token()?;
        Ok(ApiRequest {
            method: Method::Post,
            path: "/v2/authorize/iot-credentials".to_string(),
            body: Some(serde_json::json!({ "Serial": serial })),
            authenticated: true,
        })
    }

    /// Interpret the IoT credential response.
    pub fn handle_iot_credentials(&self, response: ApiResponse) -> Result<IoTData> {
        check_catalog_status(&response)?;
        models::from_payload(response.body)
    }

    /// Build the pending firmware release request for one device.
    pub fn pending_release_request(&self, serial: &str) -> Result<ApiRequest> {
        self.require_token()?;
        Ok(ApiRequest {
            method: Method::Get,
            path: format!("/v1/assets/devices/{serial}/pendingrelease"),
            body: None,
            authenticated: true,
        })
    }

    /// Interpret the pending release response.
    pub fn handle_pending_release(&self, response: ApiResponse) -> Result<PendingRelease> {
        check_catalog_status(&response)?;
        models::from_payload(response.body)
    }

    // ---- local decryption -------------------------------------------------

    /// Decrypt a device's local credential blob with this session's key
    /// material. Pure and I/O-free; see [`crate::crypto`].
    pub fn decrypt_local_credentials(
        &self,
        encrypted: &str,
        serial: &str,
    ) -> Result<LocalCredentials> {
        crypto::decrypt_local_credentials(&self.config, encrypted, serial)
    }

    fn require_token(&self) -> Result<()> {
        if self.auth_token.is_none() {
            return Err(DysonError::AuthUnauthorized(
                "no bearer credential; authenticate or import a token first".to_string(),
            ));
        }
        Ok(())
    }
}

/// Status mapping for the authentication endpoint family.
fn check_auth_status(response: &ApiResponse) -> Result<()> {
    match response.status {
        200..=299 => Ok(()),
        401 | 403 => Err(DysonError::AuthUnauthorized(format!(
            "backend returned status {}",
            response.status
        ))),
        400..=499 => Err(DysonError::AuthRejected(format!(
            "backend returned status {}",
            response.status
        ))),
        status => Err(DysonError::Protocol(format!(
            "unexpected status {status}"
        ))),
    }
}

/// Status mapping for the catalog endpoint family.
fn check_catalog_status(response: &ApiResponse) -> Result<()> {
    match response.status {
        200..=299 => Ok(()),
        401 | 403 => Err(DysonError::AuthUnauthorized(format!(
            "backend returned status {}",
            response.status
        ))),
        status => Err(DysonError::Protocol(format!(
            "unexpected status {status}"
        ))),
    }
}

/// Status mapping for unauthenticated plumbing calls.
fn check_plain_status(response: &ApiResponse) -> Result<()> {
    match response.status {
        200..=299 => Ok(()),
        status => Err(DysonError::Protocol(format!(
            "unexpected status {status}"
        ))),
    }
}
