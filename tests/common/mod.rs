#![allow(dead_code)]

use std::time::Duration;

use cloudauth::protocol::{HardwareSource, SourceUnavailable};
use cloudauth::{AppIdentity, AuthSessionClient, HardwareFingerprint};

pub const APP_SECRET: &str = "s3cr3t";

/// Deterministic hardware for request assertions.
pub struct FakeHardware;

impl HardwareSource for FakeHardware {
    fn processor_id(&self) -> Result<Option<String>, SourceUnavailable> {
        Ok(Some("BFEBFBFF000906EA".to_string()))
    }

    fn board_serial(&self) -> Result<Option<String>, SourceUnavailable> {
        Ok(Some("PF2ABCDE".to_string()))
    }

    fn first_mac(&self) -> Result<Option<String>, SourceUnavailable> {
        Ok(Some("00:1A:2B:3C:4D:5E".to_string()))
    }

    fn hostname(&self) -> String {
        "TEST-HOST".to_string()
    }

    fn username(&self) -> String {
        "tester".to_string()
    }
}

pub fn hwid() -> String {
    HardwareFingerprint::with_source(FakeHardware).compute()
}

pub fn identity(base_url: &str) -> AppIdentity {
    AppIdentity::new(base_url, "Demo", "app-key", APP_SECRET, "1.0.0")
}

pub fn client_with_timeout(base_url: &str, timeout: Duration) -> AuthSessionClient {
    AuthSessionClient::builder(identity(base_url))
        .fingerprint(HardwareFingerprint::with_source(FakeHardware))
        .timeout(timeout)
        .build()
        .unwrap()
}

/// Run a blocking client call off the async runtime.
///
/// The blocking reqwest client must be created, used and dropped outside the
/// tokio worker, so the whole client lives inside the closure.
pub async fn with_client<F, R>(base_url: String, f: F) -> R
where
    F: FnOnce(AuthSessionClient) -> R + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let client = client_with_timeout(&base_url, Duration::from_secs(5));
        f(client)
    })
    .await
    .unwrap()
}
