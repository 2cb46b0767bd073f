/// Licensing API endpoints and the secure/insecure request mode

/// Request framing for operations that support both modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecurityMode {
    /// Signed headers and the `-secure` login endpoint
    Secure,
    Insecure,
}

impl SecurityMode {
    pub fn from_flag(secure: bool) -> Self {
        if secure {
            SecurityMode::Secure
        } else {
            SecurityMode::Insecure
        }
    }

    pub fn is_secure(&self) -> bool {
        matches!(self, SecurityMode::Secure)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    AppInit,
    Register,
    Login,
    VerifyLicense,
    CreateLicense,
}

impl Endpoint {
    /// Path relative to the base URL
    ///
    /// Only login has a separate secure endpoint; every other operation
    /// ignores the mode.
    pub fn path(&self, mode: SecurityMode) -> &'static str {
        match (self, mode) {
            (Endpoint::AppInit, _) => "api/app/init.php",
            (Endpoint::Register, _) => "api/license/register.php",
            (Endpoint::Login, SecurityMode::Secure) => "api/license/login-secure.php",
            (Endpoint::Login, SecurityMode::Insecure) => "api/license/login.php",
            (Endpoint::VerifyLicense, _) => "api/license/verify.php",
            (Endpoint::CreateLicense, _) => "api/license/create.php",
        }
    }

    /// Whether requests to this endpoint carry the signed headers
    pub fn signs(&self, mode: SecurityMode) -> bool {
        matches!(self, Endpoint::Login) && mode.is_secure()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_is_the_only_dual_endpoint() {
        assert_eq!(Endpoint::Login.path(SecurityMode::Secure), "api/license/login-secure.php");
        assert_eq!(Endpoint::Login.path(SecurityMode::Insecure), "api/license/login.php");

        for endpoint in [
            Endpoint::AppInit,
            Endpoint::Register,
            Endpoint::VerifyLicense,
            Endpoint::CreateLicense,
        ] {
            assert_eq!(endpoint.path(SecurityMode::Secure), endpoint.path(SecurityMode::Insecure));
            assert!(!endpoint.signs(SecurityMode::Secure));
        }
    }

    #[test]
    fn test_only_secure_login_signs() {
        assert!(Endpoint::Login.signs(SecurityMode::Secure));
        assert!(!Endpoint::Login.signs(SecurityMode::Insecure));
    }
}
