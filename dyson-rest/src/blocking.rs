//! Blocking client over the protocol engine.
//!
//! Method-for-method mirror of [`crate::DysonClient`]; both front ends
//! drive the same [`Session`] request/response halves, so their behavior
//! cannot drift. Each call blocks the current thread for the duration of
//! the network exchange.

use dyson_core::protocol::{ApiRequest, ApiResponse, AuthOutcome, Method, Session};
use dyson_core::{
    BearerCredential, Challenge, Config, Device, IoTData, LocalCredentials, PendingRelease,
    Result, UserStatus,
};
use uuid::Uuid;

use crate::client::transport_error;

/// Blocking client for the Dyson cloud API.
///
/// See [`crate::DysonClient`] for the contract; only the call style
/// differs. Must not be used from within an async runtime.
#[derive(Debug)]
pub struct DysonClient {
    http: reqwest::blocking::Client,
    base_url: String,
    session: Session,
}

impl DysonClient {
    /// Create a client for `identifier` in `country` with the default
    /// configuration.
    pub fn new(identifier: &str, country: &str) -> Result<Self> {
        Self::with_config(identifier, country, Config::default())
    }

    /// Create a client with an explicit [`Config`].
    pub fn with_config(identifier: &str, country: &str, config: Config) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(transport_error)?;
        let session = Session::new(identifier, country, config)?;
        let base_url = session.hostname().to_string();
        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    /// Override the backend base URL. Intended for tests and proxies.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Perform the provisioning handshake; returns the API version token.
    pub fn provision(&mut self) -> Result<String> {
        let request = self.session.provision_request();
        let response = self.execute(request)?;
        self.session.handle_provision(response)
    }

    /// Look up the registration status of the account identifier.
    pub fn get_user_status(&self) -> Result<UserStatus> {
        let request = self.session.user_status_request()?;
        let response = self.execute(request)?;
        self.session.handle_user_status(response)
    }

    /// Begin the login flow; the returned challenge becomes the implicit
    /// completion default, replacing any earlier one.
    pub fn begin_login(&mut self) -> Result<Challenge> {
        let request = self.session.begin_login_request();
        let response = self.execute(request)?;
        self.session.handle_begin_login(response)
    }

    /// Complete the login flow with the delivered OTP code.
    pub fn complete_login(
        &mut self,
        challenge_id: Option<Uuid>,
        otp_code: &str,
    ) -> Result<BearerCredential> {
        let request = self.session.complete_login_request(challenge_id, otp_code)?;
        let response = self.execute(request)?;
        self.session.handle_complete_login(response)
    }

    /// Composite login; see [`crate::DysonClient::authenticate`].
    pub fn authenticate(&mut self, otp_code: Option<&str>) -> Result<AuthOutcome> {
        let challenge = self.begin_login()?;
        match otp_code {
            None => Ok(AuthOutcome::Pending(challenge)),
            Some(code) => {
                let credential = self.complete_login(Some(challenge.challenge_id), code)?;
                Ok(AuthOutcome::Authenticated(credential))
            }
        }
    }

    /// List the account's devices, in backend order.
    pub fn get_devices(&self) -> Result<Vec<Device>> {
        let request = self.session.devices_request()?;
        let response = self.execute(request)?;
        self.session.handle_devices(response)
    }

    /// Fetch cloud MQTT credentials for one device.
    pub fn get_iot_credentials(&self, serial: &str) -> Result<IoTData> {
        let request = self.session.iot_credentials_request(serial)?;
        let response = self.execute(request)?;
        self.session.handle_iot_credentials(response)
    }

    /// Fetch the pending firmware release for one device.
    pub fn get_pending_release(&self, serial: &str) -> Result<PendingRelease> {
        let request = self.session.pending_release_request(serial)?;
        let response = self.execute(request)?;
        self.session.handle_pending_release(response)
    }

    /// Decrypt a device's local broker credentials. Pure and local.
    pub fn decrypt_local_credentials(
        &self,
        encrypted: &str,
        serial: &str,
    ) -> Result<LocalCredentials> {
        self.session.decrypt_local_credentials(encrypted, serial)
    }

    /// Export the current bearer token for external persistence.
    pub fn auth_token(&self) -> Option<&str> {
        self.session.auth_token()
    }

    /// Import a bearer token, skipping the login flow entirely.
    pub fn set_auth_token(&mut self, token: Option<String>) {
        self.session.set_auth_token(token);
    }

    /// Account UUID, known after login.
    pub fn account_id(&self) -> Option<Uuid> {
        self.session.account_id()
    }

    /// Whether the provisioning handshake has completed on this client.
    pub fn provisioned(&self) -> bool {
        self.session.provisioned()
    }

    fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = match request.method {
            Method::Get => self.http.get(&url),
            Method::Post => self.http.post(&url),
        };
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if request.authenticated {
            if let Some(token) = self.session.auth_token() {
                builder = builder.bearer_auth(token);
            }
        }

        log::debug!("{:?} {url}", request.method);
        let response = builder.send().map_err(transport_error)?;
        let status = response.status().as_u16();
        let text = response.text().map_err(transport_error)?;
        let body = serde_json::from_str(&text).unwrap_or(serde_json::Value::Null);
        Ok(ApiResponse { status, body })
    }
}
