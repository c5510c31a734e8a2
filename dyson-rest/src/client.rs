//! Async client over the protocol engine.

use dyson_core::protocol::{ApiRequest, ApiResponse, AuthOutcome, Method, Session};
use dyson_core::{
    BearerCredential, Challenge, Config, Device, DysonError, IoTData, LocalCredentials,
    PendingRelease, Result, UserStatus,
};
use uuid::Uuid;

/// Async client for the Dyson cloud API.
///
/// A thin adapter: every operation builds its logical request via the
/// shared [`Session`] engine, executes it with `reqwest`, and hands the
/// raw response back to the engine for interpretation. One instance serves
/// one account and one logical flow of control; authentication methods
/// take `&mut self`, so two `begin`/`complete` pairs cannot be in flight
/// on the same instance.
#[derive(Debug)]
pub struct DysonClient {
    http: reqwest::Client,
    base_url: String,
    session: Session,
}

impl DysonClient {
    /// Create a client for `identifier` in `country` with the default
    /// configuration.
    ///
    /// Identifier validation happens here: a mobile number outside the
    /// SMS-capable region fails before any request is made.
    pub fn new(identifier: &str, country: &str) -> Result<Self> {
        Self::with_config(identifier, country, Config::default())
    }

    /// Create a client with an explicit [`Config`].
    pub fn with_config(identifier: &str, country: &str, config: Config) -> Result<Self> {
        let http = reqwest::Client::builder()
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
    ///
    /// Documented precondition for the authentication calls: invoke once
    /// per client before logging in.
    pub async fn provision(&mut self) -> Result<String> {
        let request = self.session.provision_request();
        let response = self.execute(request).await?;
        self.session.handle_provision(response)
    }

    /// Look up the registration status of the account identifier.
    pub async fn get_user_status(&self) -> Result<UserStatus> {
        let request = self.session.user_status_request()?;
        let response = self.execute(request).await?;
        self.session.handle_user_status(response)
    }

    /// Begin the login flow: the backend delivers an OTP out of band and
    /// the returned challenge becomes the implicit completion default,
    /// replacing any earlier one.
    pub async fn begin_login(&mut self) -> Result<Challenge> {
        let request = self.session.begin_login_request();
        let response = self.execute(request).await?;
        self.session.handle_begin_login(response)
    }

    /// Complete the login flow with the delivered OTP code.
    ///
    /// `challenge_id` may be omitted to use the challenge tracked by the
    /// last [`begin_login`](Self::begin_login) on this client.
    pub async fn complete_login(
        &mut self,
        challenge_id: Option<Uuid>,
        otp_code: &str,
    ) -> Result<BearerCredential> {
        let request = self.session.complete_login_request(challenge_id, otp_code)?;
        let response = self.execute(request).await?;
        self.session.handle_complete_login(response)
    }

    /// Composite login: without a code, begins the flow and reports
    /// [`AuthOutcome::Pending`] (repeatable, never an error); with a code,
    /// begins and completes in sequence.
    pub async fn authenticate(&mut self, otp_code: Option<&str>) -> Result<AuthOutcome> {
        let challenge = self.begin_login().await?;
        match otp_code {
            None => Ok(AuthOutcome::Pending(challenge)),
            Some(code) => {
                let credential = self
                    .complete_login(Some(challenge.challenge_id), code)
                    .await?;
                Ok(AuthOutcome::Authenticated(credential))
            }
        }
    }

    /// List the account's devices, in backend order.
    pub async fn get_devices(&self) -> Result<Vec<Device>> {
        let request = self.session.devices_request()?;
        let response = self.execute(request).await?;
        self.session.handle_devices(response)
    }

    /// Fetch cloud MQTT credentials for one device.
    pub async fn get_iot_credentials(&self, serial: &str) -> Result<IoTData> {
        let request = self.session.iot_credentials_request(serial)?;
        let response = self.execute(request).await?;
        self.session.handle_iot_credentials(response)
    }

    /// Fetch the pending firmware release for one device.
    pub async fn get_pending_release(&self, serial: &str) -> Result<PendingRelease> {
        let request = self.session.pending_release_request(serial)?;
        let response = self.execute(request).await?;
        self.session.handle_pending_release(response)
    }

    /// Decrypt a device's local broker credentials. Pure and local: no
    /// network I/O, callable without suspension from any context.
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

    /// Import a bearer token, skipping the login flow entirely. The
    /// backend remains the sole authority on its validity.
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

    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
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
        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(transport_error)?;
        let body = serde_json::from_str(&text).unwrap_or(serde_json::Value::Null);
        Ok(ApiResponse { status, body })
    }
}

pub(crate) fn transport_error(error: reqwest::Error) -> DysonError {
    DysonError::Transport(error.to_string())
}
