//! Response shapes returned by the licensing API.
//!
//! Every operation answers with the same envelope: `success`, `message` and an
//! optional `data` payload. The client never hands out an absent response;
//! transport and parse failures are folded into this shape with a
//! [`FailureKind`] attached so callers can still tell them apart.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Message used when the body is missing, not JSON, or lacks `success`.
pub const INVALID_RESPONSE: &str = "Invalid response";

/// Why a response reports `success == false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    /// Network, DNS, TLS or timeout failure; the server never answered.
    Transport,
    /// The server answered with something that is not a valid response.
    Protocol,
    /// The server explicitly rejected the request.
    Application,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::Transport => "transport",
            FailureKind::Protocol => "protocol",
            FailureKind::Application => "application",
        };
        f.write_str(name)
    }
}

/// Tagged failure produced by [`ApiResponse::into_result`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} failure: {detail}")]
pub struct AuthFailure {
    pub kind: FailureKind,
    pub detail: String,
}

/// Response envelope shared by all operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip)]
    failure: Option<FailureKind>,
}

impl<T> ApiResponse<T> {
    /// Synthetic failure that never came from the server body.
    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            failure: Some(kind),
        }
    }

    /// `{success: false, message: "Invalid response"}`
    pub fn invalid() -> Self {
        Self::failure(FailureKind::Protocol, INVALID_RESPONSE)
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// `None` on success.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        if self.success {
            None
        } else {
            Some(self.failure.unwrap_or(FailureKind::Application))
        }
    }

    /// Convert into a tagged result, keeping the server message as detail.
    pub fn into_result(self) -> Result<Option<T>, AuthFailure> {
        match self.failure_kind() {
            None => Ok(self.data),
            Some(kind) => Err(AuthFailure {
                kind,
                detail: self.message,
            }),
        }
    }
}

impl<T: for<'de> Deserialize<'de>> ApiResponse<T> {
    /// Parse a raw response body.
    ///
    /// Never fails: anything that does not deserialize into the envelope
    /// becomes [`ApiResponse::invalid`].
    pub fn from_body(body: &[u8]) -> Self {
        match serde_json::from_slice::<Self>(body) {
            Ok(mut response) => {
                if !response.success {
                    response.failure = Some(FailureKind::Application);
                }
                response
            }
            Err(e) => {
                log::debug!("Unparseable response body ({} bytes): {}", body.len(), e);
                Self::invalid()
            }
        }
    }
}

/// `data` of a successful app init.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppInitData {
    pub app_id: i64,
    pub app_name: String,
    pub version: String,
    pub current_version: String,
    pub your_version: String,
    /// `"version_mismatch"` when the client version is outdated
    pub status: String,
    pub message: String,
    pub total_users: i64,
    pub developer: String,
}

impl AppInitData {
    pub fn is_version_mismatch(&self) -> bool {
        self.status == "version_mismatch"
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterData {
    pub username: String,
    pub license_key: String,
    pub expires_at: Option<String>,
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginData {
    pub username: String,
    pub email: String,
    pub license_key: String,
    /// `None` for lifetime licenses
    pub expires_at: Option<String>,
    pub last_login: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LicenseData {
    pub username: String,
    pub email: String,
    pub expires_at: Option<String>,
    pub last_login: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateLicenseData {
    pub license_key: String,
    pub username: String,
    pub expires_at: Option<String>,
}

pub type AppInitResponse = ApiResponse<AppInitData>;
pub type RegisterResponse = ApiResponse<RegisterData>;
pub type LoginResponse = ApiResponse<LoginData>;
pub type LicenseVerifyResponse = ApiResponse<LicenseData>;
pub type CreateLicenseResponse = ApiResponse<CreateLicenseData>;
