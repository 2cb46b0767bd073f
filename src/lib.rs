//! CloudAuth licensing client.
//!
//! Authenticates an application and its users against a CloudAuth licensing
//! server:
//! 1. Hardware fingerprinting to bind licenses to a machine
//! 2. HMAC-SHA256 signed, replay-protected login requests (secure mode)
//! 3. App init, register, login, license verification and license creation
//!
//! ```no_run
//! use cloudauth::{AppIdentity, AuthSessionClient};
//!
//! let client = AuthSessionClient::new(AppIdentity::new(
//!     "https://auth.example.com/",
//!     "Demo",
//!     "app-key",
//!     "app-secret",
//!     "1.0.0",
//! ))?;
//!
//! let init = client.initialize_app();
//! if init.success {
//!     let login = client.login_user("alice", "password");
//!     println!("{}", login.message);
//! }
//! # Ok::<(), cloudauth::Error>(())
//! ```

pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod protocol;
pub mod response;
pub mod utils;

pub use client::session::{AuthSession, SessionError, SessionState};
pub use client::{AppIdentity, AuthSessionClient, ClientBuilder};
pub use config::{ClientConfig, load_config};
pub use credentials::{CredentialStore, Credentials, FileCredentialStore, MemoryCredentialStore};
pub use error::{Error, Result};
pub use protocol::{HardwareFingerprint, SecurityMode, get_hardware_id};
pub use response::{
    ApiResponse, AppInitData, AppInitResponse, AuthFailure, CreateLicenseData,
    CreateLicenseResponse, FailureKind, LicenseData, LicenseVerifyResponse, LoginData,
    LoginResponse, RegisterData, RegisterResponse,
};
