/// HTTP exchange with the licensing server
use log::debug;
use serde::Serialize;
use std::time::Duration;

use super::endpoint::{Endpoint, SecurityMode};
use super::signer::SignedEnvelope;
use crate::error::Result;
use crate::utils::user_agent;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// A serialized request, ready to send
///
/// The envelope (if any) was computed over exactly `body`.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub endpoint: Endpoint,
    pub mode: SecurityMode,
    pub url: String,
    pub body: Vec<u8>,
    pub envelope: Option<SignedEnvelope>,
}

/// POSTs JSON bodies to the licensing API, signing them when required
#[derive(Clone)]
pub struct AuthTransport {
    http: reqwest::blocking::Client,
    base_url: String,
    secret: String,
}

impl std::fmt::Debug for AuthTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthTransport")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl AuthTransport {
    /// Build the transport and its connection pool
    ///
    /// # Arguments
    /// * `base_url` - Server root, trailing slashes are normalized
    /// * `secret` - Application secret used for signatures
    /// * `timeout` - Applies to every request made through this transport
    pub fn new(base_url: &str, secret: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent())
            .danger_accept_invalid_certs(false) // Enforce SSL verification
            .build()?;

        Ok(Self {
            http,
            base_url: normalize_base_url(base_url),
            secret: secret.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Serialize `body` and sign it if `endpoint` requires it in `mode`
    pub fn prepare<B: Serialize>(
        &self,
        endpoint: Endpoint,
        body: &B,
        mode: SecurityMode,
    ) -> Result<PreparedRequest> {
        let body = serde_json::to_vec(body)?;

        // Timestamp is taken after serialization, when headers are built
        let envelope = endpoint
            .signs(mode)
            .then(|| SignedEnvelope::seal(&self.secret, &body));

        Ok(PreparedRequest {
            endpoint,
            mode,
            url: format!("{}{}", self.base_url, endpoint.path(mode)),
            body,
            envelope,
        })
    }

    /// Send a prepared request and return the raw response body
    ///
    /// The body is returned whatever the HTTP status; interpreting it is up
    /// to the caller. Only transport failures are errors.
    pub fn send(&self, request: &PreparedRequest) -> Result<Vec<u8>> {
        debug!(
            "POST {} ({} bytes, signed: {})",
            request.url,
            request.body.len(),
            request.envelope.is_some()
        );

        let mut builder = self
            .http
            .post(&request.url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(request.body.clone());

        if let Some(envelope) = &request.envelope {
            for (name, value) in envelope.headers() {
                builder = builder.header(name, value);
            }
        }

        let response = builder.send()?;
        debug!("Response status: {}", response.status());

        let bytes = response.bytes()?;
        Ok(bytes.to_vec())
    }

    /// Prepare and send in one step
    pub fn execute<B: Serialize>(
        &self,
        endpoint: Endpoint,
        body: &B,
        mode: SecurityMode,
    ) -> Result<Vec<u8>> {
        let request = self.prepare(endpoint, body, mode)?;
        self.send(&request)
    }
}

/// Exactly one trailing slash
pub fn normalize_base_url(base_url: &str) -> String {
    format!("{}/", base_url.trim().trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::signer;
    use serde_json::json;

    fn transport() -> AuthTransport {
        AuthTransport::new("https://auth.example.com//", "s3cr3t", DEFAULT_TIMEOUT).unwrap()
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url("https://a.io"), "https://a.io/");
        assert_eq!(normalize_base_url("https://a.io/"), "https://a.io/");
        assert_eq!(normalize_base_url("https://a.io/auth///"), "https://a.io/auth/");
    }

    #[test]
    fn test_prepare_insecure_has_no_envelope() {
        let body = json!({"username": "alice"});
        let request = transport()
            .prepare(Endpoint::Login, &body, SecurityMode::Insecure)
            .unwrap();

        assert_eq!(request.url, "https://auth.example.com/api/license/login.php");
        assert!(request.envelope.is_none());
        assert_eq!(request.body, br#"{"username":"alice"}"#);
    }

    #[test]
    fn test_prepare_secure_login_signs_exact_body() {
        let body = json!({"username": "alice"});
        let request = transport()
            .prepare(Endpoint::Login, &body, SecurityMode::Secure)
            .unwrap();

        assert_eq!(request.url, "https://auth.example.com/api/license/login-secure.php");
        let envelope = request.envelope.expect("secure login must be signed");
        assert!(signer::verify("s3cr3t", &request.body, envelope.timestamp, &envelope.signature));
    }

    #[test]
    fn test_prepare_secure_non_login_is_unsigned() {
        let body = json!({"license_key": "KEY"});
        let request = transport()
            .prepare(Endpoint::VerifyLicense, &body, SecurityMode::Secure)
            .unwrap();

        assert_eq!(request.url, "https://auth.example.com/api/license/verify.php");
        assert!(request.envelope.is_none());
    }
}
