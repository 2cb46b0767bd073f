/// Protocol module - Fingerprinting, request signing and HTTP transport
pub mod endpoint;
pub mod fingerprint;
pub mod signer;
pub mod transport;

pub use endpoint::{Endpoint, SecurityMode};
pub use fingerprint::{HardwareFingerprint, HardwareSource, SourceUnavailable, SystemSource, get_hardware_id};
pub use signer::{SignedEnvelope, new_nonce, now_unix_seconds, sign, verify};
pub use transport::{AuthTransport, DEFAULT_TIMEOUT, PreparedRequest};
