/// Request payloads, one per endpoint
///
/// Field order is the wire order; serde_json keeps declaration order, so the
/// signed bytes are stable for a given set of values.
use serde::Serialize;

/// Expiry used by `create_license` when the caller gives none
pub const DEFAULT_EXPIRY_DAYS: u32 = 30;

#[derive(Debug, Serialize)]
pub struct AppInitRequest<'a> {
    pub app_name: &'a str,
    pub app_key: &'a str,
    pub app_secret: &'a str,
    pub version: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub app_name: &'a str,
    pub app_key: &'a str,
    pub app_secret: &'a str,
    pub license_key: &'a str,
    pub username: &'a str,
    pub password: &'a str,
    pub email: &'a str,
    pub hwid: &'a str,
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub app_name: &'a str,
    pub app_key: &'a str,
    pub app_secret: &'a str,
    pub username: &'a str,
    pub password: &'a str,
    pub hwid: &'a str,
}

#[derive(Debug, Serialize)]
pub struct VerifyRequest<'a> {
    pub app_name: &'a str,
    pub app_key: &'a str,
    pub app_secret: &'a str,
    pub version: &'a str,
    pub license_key: &'a str,
    pub hwid: &'a str,
}

/// Administrative request; `app_secret` is supplied by the caller, not taken
/// from the client identity
#[derive(Debug, Serialize)]
pub struct CreateLicenseRequest<'a> {
    pub app_key: &'a str,
    pub app_secret: &'a str,
    pub username: &'a str,
    pub email: &'a str,
    pub expiry_days: u32,
}
