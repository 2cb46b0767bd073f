//! The licensing session client.
//!
//! [`AuthSessionClient`] exposes one method per API operation. Each method
//! builds the request payload, sends it through [`AuthTransport`] and always
//! returns a response object: transport and parse failures are folded into
//! `{success: false, message}` with a [`FailureKind`] attached.

pub mod requests;
pub mod session;

use log::{debug, info, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use crate::config::ClientConfig;
use crate::credentials::{CredentialStore, Credentials};
use crate::error::{Error, Result};
use crate::protocol::{AuthTransport, DEFAULT_TIMEOUT, Endpoint, HardwareFingerprint, SecurityMode};
use crate::response::{
    ApiResponse, AppInitResponse, CreateLicenseResponse, FailureKind, LicenseVerifyResponse,
    LoginResponse, RegisterResponse,
};
use requests::{
    AppInitRequest, CreateLicenseRequest, DEFAULT_EXPIRY_DAYS, LoginRequest, RegisterRequest,
    VerifyRequest,
};

/// Message prefix for failures of `initialize_app`
const INIT_ERROR_CATEGORY: &str = "Connection Error";
/// Message prefix for failures of every other operation
const ERROR_CATEGORY: &str = "Error";

/// The fixed application identity sent with every request.
#[derive(Clone)]
pub struct AppIdentity {
    pub base_url: String,
    pub app_name: String,
    pub app_key: String,
    pub app_secret: String,
    pub version: String,
}

impl AppIdentity {
    pub fn new(
        base_url: impl Into<String>,
        app_name: impl Into<String>,
        app_key: impl Into<String>,
        app_secret: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            app_name: app_name.into(),
            app_key: app_key.into(),
            app_secret: app_secret.into(),
            version: version.into(),
        }
    }
}

impl fmt::Debug for AppIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppIdentity")
            .field("base_url", &self.base_url)
            .field("app_name", &self.app_name)
            .field("app_key", &self.app_key)
            .field("app_secret", &"[REDACTED]")
            .field("version", &self.version)
            .finish()
    }
}

/// Builder for [`AuthSessionClient`].
pub struct ClientBuilder {
    identity: AppIdentity,
    secure_mode: bool,
    timeout: Duration,
    fingerprint: HardwareFingerprint,
}

impl ClientBuilder {
    /// Defaults to 10s.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn secure_mode(mut self, enabled: bool) -> Self {
        self.secure_mode = enabled;
        self
    }

    pub fn fingerprint(mut self, fingerprint: HardwareFingerprint) -> Self {
        self.fingerprint = fingerprint;
        self
    }

    pub fn build(self) -> Result<AuthSessionClient> {
        let transport = AuthTransport::new(
            &self.identity.base_url,
            &self.identity.app_secret,
            self.timeout,
        )?;

        let mut identity = self.identity;
        identity.base_url = transport.base_url().to_string();

        Ok(AuthSessionClient {
            identity: Arc::new(identity),
            transport,
            fingerprint: self.fingerprint,
            hwid: Arc::new(OnceLock::new()),
            secure: AtomicBool::new(self.secure_mode),
        })
    }
}

/// Client for the licensing API.
///
/// Safe to share between threads. The secure-mode flag may be toggled at any
/// time; a login reads it once when it starts.
pub struct AuthSessionClient {
    identity: Arc<AppIdentity>,
    transport: AuthTransport,
    fingerprint: HardwareFingerprint,
    hwid: Arc<OnceLock<String>>,
    secure: AtomicBool,
}

impl AuthSessionClient {
    /// Secure mode on, 10 second timeout, real hardware fingerprint.
    pub fn new(identity: AppIdentity) -> Result<Self> {
        Self::builder(identity).build()
    }

    pub fn builder(identity: AppIdentity) -> ClientBuilder {
        ClientBuilder {
            identity,
            secure_mode: true,
            timeout: DEFAULT_TIMEOUT,
            fingerprint: HardwareFingerprint::new(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let identity = AppIdentity::new(
            config.effective_base_url(),
            &config.app_name,
            &config.app_key,
            &config.app_secret,
            &config.version,
        );

        Self::builder(identity)
            .secure_mode(config.secure_mode)
            .timeout(config.timeout())
            .fingerprint(HardwareFingerprint::new().hash_fallback(config.hash_fallback))
            .build()
    }

    /// A client sharing this one's identity, connection pool and HWID, with
    /// its own secure-mode flag set to `mode`.
    pub fn with_mode(&self, mode: SecurityMode) -> Self {
        Self {
            identity: Arc::clone(&self.identity),
            transport: self.transport.clone(),
            fingerprint: self.fingerprint.clone(),
            hwid: Arc::clone(&self.hwid),
            secure: AtomicBool::new(mode.is_secure()),
        }
    }

    pub fn identity(&self) -> &AppIdentity {
        &self.identity
    }

    pub fn is_secure_mode(&self) -> bool {
        self.secure.load(Ordering::SeqCst)
    }

    pub fn set_secure_mode(&self, enabled: bool) {
        self.secure.store(enabled, Ordering::SeqCst);
        info!("Secure mode {}", if enabled { "enabled" } else { "disabled" });
    }

    pub fn security_mode(&self) -> SecurityMode {
        SecurityMode::from_flag(self.is_secure_mode())
    }

    /// This machine's HWID, computed on first use.
    pub fn hardware_id(&self) -> &str {
        self.hwid.get_or_init(|| self.fingerprint.compute())
    }

    /// Check that the app exists and its version is current.
    ///
    /// `data.status == "version_mismatch"` is still a successful init.
    pub fn initialize_app(&self) -> AppInitResponse {
        let identity = &self.identity;
        let request = AppInitRequest {
            app_name: &identity.app_name,
            app_key: &identity.app_key,
            app_secret: &identity.app_secret,
            version: &identity.version,
        };

        self.call(Endpoint::AppInit, &request, SecurityMode::Insecure, INIT_ERROR_CATEGORY)
    }

    /// Bind `license_key` to this device and create the account.
    pub fn register_user(
        &self,
        license_key: &str,
        username: &str,
        password: &str,
        email: Option<&str>,
    ) -> RegisterResponse {
        let identity = &self.identity;
        let request = RegisterRequest {
            app_name: &identity.app_name,
            app_key: &identity.app_key,
            app_secret: &identity.app_secret,
            license_key,
            username,
            password,
            email: email.unwrap_or_default(),
            hwid: self.hardware_id(),
        };

        self.call(Endpoint::Register, &request, SecurityMode::Insecure, ERROR_CATEGORY)
    }

    /// Log in using the secure-mode flag as it is when the call starts.
    pub fn login_user(&self, username: &str, password: &str) -> LoginResponse {
        let mode = self.security_mode();
        self.login_user_with_mode(mode, username, password)
    }

    /// Log in with an explicit framing, ignoring the client flag.
    pub fn login_user_with_mode(
        &self,
        mode: SecurityMode,
        username: &str,
        password: &str,
    ) -> LoginResponse {
        let identity = &self.identity;
        let request = LoginRequest {
            app_name: &identity.app_name,
            app_key: &identity.app_key,
            app_secret: &identity.app_secret,
            username,
            password,
            hwid: self.hardware_id(),
        };

        self.call(Endpoint::Login, &request, mode, ERROR_CATEGORY)
    }

    /// Read-only license check for this device.
    pub fn verify_license(&self, license_key: &str) -> LicenseVerifyResponse {
        let identity = &self.identity;
        let request = VerifyRequest {
            app_name: &identity.app_name,
            app_key: &identity.app_key,
            app_secret: &identity.app_secret,
            version: &identity.version,
            license_key,
            hwid: self.hardware_id(),
        };

        self.call(Endpoint::VerifyLicense, &request, SecurityMode::Insecure, ERROR_CATEGORY)
    }

    /// Issue a new license.
    ///
    /// `app_secret` is the administrative secret for the app and is sent
    /// instead of the configured one. `expiry_days` defaults to 30.
    pub fn create_license(
        &self,
        app_secret: &str,
        username: &str,
        email: Option<&str>,
        expiry_days: Option<u32>,
    ) -> CreateLicenseResponse {
        let request = CreateLicenseRequest {
            app_key: &self.identity.app_key,
            app_secret,
            username,
            email: email.unwrap_or_default(),
            expiry_days: expiry_days.unwrap_or(DEFAULT_EXPIRY_DAYS),
        };

        self.call(Endpoint::CreateLicense, &request, SecurityMode::Insecure, ERROR_CATEGORY)
    }

    /// Log in with stored credentials, if any.
    ///
    /// Returns `None` when nothing is stored. A rejected login clears the
    /// store so the next start asks again.
    pub fn auto_login(&self, store: &dyn CredentialStore) -> Option<LoginResponse> {
        let credentials = match store.load() {
            Ok(Some(credentials)) => credentials,
            Ok(None) => return None,
            Err(e) => {
                warn!("Could not read saved credentials: {}", e);
                return None;
            }
        };

        debug!("Attempting auto-login for {}", credentials.username);
        let response = self.login_user(&credentials.username, credentials.password());

        if !response.success {
            warn!("Auto-login failed: {}", response.message);
            if let Err(e) = store.clear() {
                warn!("Could not clear saved credentials: {}", e);
            }
        }

        Some(response)
    }

    /// Log in and, on success, save the credentials for `auto_login`.
    pub fn login_and_remember(
        &self,
        store: &dyn CredentialStore,
        username: &str,
        password: &str,
    ) -> LoginResponse {
        let response = self.login_user(username, password);

        if response.success {
            if let Err(e) = store.save(&Credentials::new(username, password)) {
                warn!("Could not save credentials: {}", e);
            }
        }

        response
    }

    fn call<B, T>(
        &self,
        endpoint: Endpoint,
        body: &B,
        mode: SecurityMode,
        category: &str,
    ) -> ApiResponse<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        match self.transport.execute(endpoint, body, mode) {
            Ok(bytes) => {
                let response = ApiResponse::from_body(&bytes);
                if !response.success {
                    debug!("{:?} rejected: {}", endpoint, response.message);
                }
                response
            }
            Err(e) => {
                warn!("{:?} request failed: {}", endpoint, e);
                ApiResponse::failure(failure_kind(&e), format!("{}: {}", category, e))
            }
        }
    }
}

impl fmt::Debug for AuthSessionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSessionClient")
            .field("identity", &self.identity)
            .field("secure_mode", &self.is_secure_mode())
            .finish_non_exhaustive()
    }
}

fn failure_kind(error: &Error) -> FailureKind {
    match error {
        Error::Transport(_) | Error::Io(_) => FailureKind::Transport,
        _ => FailureKind::Protocol,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{HardwareSource, SourceUnavailable};

    struct FixedSource;

    impl HardwareSource for FixedSource {
        fn processor_id(&self) -> std::result::Result<Option<String>, SourceUnavailable> {
            Ok(Some("CPU".to_string()))
        }
        fn board_serial(&self) -> std::result::Result<Option<String>, SourceUnavailable> {
            Ok(None)
        }
        fn first_mac(&self) -> std::result::Result<Option<String>, SourceUnavailable> {
            Ok(None)
        }
        fn hostname(&self) -> String {
            "host".to_string()
        }
        fn username(&self) -> String {
            "user".to_string()
        }
    }

    fn client(base_url: &str) -> AuthSessionClient {
        AuthSessionClient::builder(AppIdentity::new(base_url, "Demo", "key", "s3cr3t", "1.0.0"))
            .fingerprint(HardwareFingerprint::with_source(FixedSource))
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap()
    }

    #[test]
    fn test_base_url_is_normalized() {
        let client = client("http://127.0.0.1:1///");
        assert_eq!(client.identity().base_url, "http://127.0.0.1:1/");
    }

    #[test]
    fn test_secure_mode_toggle_and_derived_client() {
        let client = client("http://127.0.0.1:1");
        assert!(client.is_secure_mode());

        let insecure = client.with_mode(SecurityMode::Insecure);
        assert_eq!(insecure.security_mode(), SecurityMode::Insecure);
        assert_eq!(client.security_mode(), SecurityMode::Secure);

        client.set_secure_mode(false);
        assert!(!client.is_secure_mode());
    }

    #[test]
    fn test_hardware_id_is_cached_and_shared() {
        let client = client("http://127.0.0.1:1");
        let hwid = client.hardware_id().to_string();
        assert_eq!(hwid.len(), 32);
        assert_eq!(client.with_mode(SecurityMode::Insecure).hardware_id(), hwid);
    }

    #[test]
    fn test_connection_refused_is_transport_failure() {
        let client = client("http://127.0.0.1:1");

        let init = client.initialize_app();
        assert!(!init.success);
        assert!(init.message.starts_with("Connection Error: "));
        assert_eq!(init.failure_kind(), Some(FailureKind::Transport));

        let login = client.login_user("alice", "pw");
        assert!(!login.success);
        assert!(login.message.starts_with("Error: "));
        assert_eq!(login.failure_kind(), Some(FailureKind::Transport));
    }

    #[test]
    fn test_debug_hides_secret() {
        let debug = format!("{:?}", client("http://127.0.0.1:1"));
        assert!(!debug.contains("s3cr3t"));
    }
}
