/// HMAC-SHA256 request signing and replay-protection headers
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const HEADER_TIMESTAMP: &str = "X-Timestamp";
pub const HEADER_NONCE: &str = "X-Nonce";
pub const HEADER_SIGNATURE: &str = "X-Signature";

/// Random bytes per nonce (32 hex chars on the wire)
const NONCE_BYTES: usize = 16;

/// Create request signature
///
/// # Arguments
/// * `secret` - Application secret, used as the HMAC key
/// * `body` - Exact request body bytes that will be sent
/// * `timestamp` - Unix seconds placed in `X-Timestamp`
///
/// # Returns
/// Lowercase hex HMAC-SHA256 over `body ++ timestamp ++ secret`
pub fn sign(secret: &str, body: &[u8], timestamp: i64) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(body);
    mac.update(timestamp.to_string().as_bytes());
    mac.update(secret.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Verify a request signature in constant time
pub fn verify(secret: &str, body: &[u8], timestamp: i64, signature: &str) -> bool {
    let expected = sign(secret, body, timestamp);

    use subtle::ConstantTimeEq;
    expected.as_bytes().ct_eq(signature.as_bytes()).into()
}

/// 16 random bytes from the thread-local CSPRNG, lowercase hex
pub fn new_nonce() -> String {
    let mut bytes = [0u8; NONCE_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Seconds since the Unix epoch, UTC
pub fn now_unix_seconds() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Replay-protection material for one secure request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedEnvelope {
    pub timestamp: i64,
    pub nonce: String,
    pub signature: String,
}

impl SignedEnvelope {
    /// Sign `body` with a fresh nonce and the current time
    pub fn seal(secret: &str, body: &[u8]) -> Self {
        Self::seal_at(secret, body, now_unix_seconds())
    }

    pub fn seal_at(secret: &str, body: &[u8], timestamp: i64) -> Self {
        Self {
            timestamp,
            nonce: new_nonce(),
            signature: sign(secret, body, timestamp),
        }
    }

    /// Header name/value pairs in wire order
    pub fn headers(&self) -> [(&'static str, String); 3] {
        [
            (HEADER_TIMESTAMP, self.timestamp.to_string()),
            (HEADER_NONCE, self.nonce.clone()),
            (HEADER_SIGNATURE, self.signature.clone()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_sign_is_deterministic() {
        let body = br#"{"username":"alice"}"#;

        let sig1 = sign("secret", body, 1_700_000_000);
        let sig2 = sign("secret", body, 1_700_000_000);
        assert_eq!(sig1, sig2);

        assert_eq!(sig1.len(), 64);
        assert!(sig1.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_each_input_changes_signature() {
        let body = br#"{"username":"alice"}"#;
        let base = sign("secret", body, 1_700_000_000);

        assert_ne!(base, sign("secret2", body, 1_700_000_000));
        assert_ne!(base, sign("secret", br#"{"username":"bob"}"#, 1_700_000_000));
        assert_ne!(base, sign("secret", body, 1_700_000_001));
    }

    #[test]
    fn test_known_vector() {
        let body = br#"{"app_name":"Demo","username":"alice","password":"pw","hwid":"abc"}"#;

        let mut mac = HmacSha256::new_from_slice(b"s3cr3t").unwrap();
        let mut message = body.to_vec();
        message.extend_from_slice(b"1700000000s3cr3t");
        mac.update(&message);
        let expected = hex::encode(mac.finalize().into_bytes());

        assert_eq!(sign("s3cr3t", body, 1_700_000_000), expected);
    }

    #[test]
    fn test_verify() {
        let body = b"test_data";
        let signature = sign("test_secret", body, 42);

        assert!(verify("test_secret", body, 42, &signature));
        assert!(!verify("wrong_secret", body, 42, &signature));
        assert!(!verify("test_secret", b"wrong_data", 42, &signature));
        assert!(!verify("test_secret", body, 43, &signature));

        let mut tampered = signature.clone();
        tampered.push('0');
        assert!(!verify("test_secret", body, 42, &tampered));
    }

    #[test]
    fn test_nonce_format_and_uniqueness() {
        let nonces: HashSet<String> = (0..10_000).map(|_| new_nonce()).collect();
        assert_eq!(nonces.len(), 10_000);

        for nonce in nonces.iter().take(10) {
            assert_eq!(nonce.len(), 32);
            assert!(nonce.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn test_envelope_headers() {
        let envelope = SignedEnvelope::seal_at("secret", b"{}", 1_700_000_000);
        let headers = envelope.headers();

        assert_eq!(headers[0], (HEADER_TIMESTAMP, "1700000000".to_string()));
        assert_eq!(headers[1].0, HEADER_NONCE);
        assert_eq!(headers[2], (HEADER_SIGNATURE, sign("secret", b"{}", 1_700_000_000)));
    }

    #[test]
    fn test_now_is_recent() {
        // 2023-11-14, well before any machine running these tests
        assert!(now_unix_seconds() > 1_700_000_000);
    }
}
