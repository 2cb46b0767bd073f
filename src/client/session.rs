/// Caller-side session lifecycle
///
/// Uninitialized -> Initialized | Failed, Initialized -> Authenticated on a
/// successful login. A failed login leaves the session Initialized so the
/// caller can retry. There is no server token; "authenticated" only records
/// that the last login was accepted.
use log::info;
use thiserror::Error;

use super::AuthSessionClient;
use crate::response::{AppInitData, AuthFailure, LoginData};

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Uninitialized,
    Initialized { app: Option<AppInitData> },
    Failed { reason: String },
    Authenticated { app: Option<AppInitData>, user: LoginData },
}

#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error("application is not initialized")]
    NotInitialized,

    #[error(transparent)]
    Rejected(#[from] AuthFailure),
}

/// Wraps a client and tracks where the caller is in the login flow
#[derive(Debug)]
pub struct AuthSession {
    client: AuthSessionClient,
    state: SessionState,
}

impl AuthSession {
    pub fn new(client: AuthSessionClient) -> Self {
        Self {
            client,
            state: SessionState::Uninitialized,
        }
    }

    pub fn client(&self) -> &AuthSessionClient {
        &self.client
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Run app init. Can be repeated from any state.
    pub fn initialize(&mut self) -> Result<Option<&AppInitData>, SessionError> {
        match self.client.initialize_app().into_result() {
            Ok(app) => {
                if app.as_ref().is_some_and(AppInitData::is_version_mismatch) {
                    info!("Server reports a newer application version");
                }
                self.state = SessionState::Initialized { app };
                Ok(self.app())
            }
            Err(failure) => {
                self.state = SessionState::Failed {
                    reason: failure.detail.clone(),
                };
                Err(failure.into())
            }
        }
    }

    /// Log in; only allowed once the app is initialized.
    pub fn login(&mut self, username: &str, password: &str) -> Result<&LoginData, SessionError> {
        let app = match &self.state {
            SessionState::Initialized { app } | SessionState::Authenticated { app, .. } => app.clone(),
            SessionState::Uninitialized | SessionState::Failed { .. } => {
                return Err(SessionError::NotInitialized);
            }
        };

        match self.client.login_user(username, password).into_result() {
            Ok(user) => {
                self.state = SessionState::Authenticated {
                    app,
                    user: user.unwrap_or_default(),
                };
                match &self.state {
                    SessionState::Authenticated { user, .. } => Ok(user),
                    _ => unreachable!("state was just set to Authenticated"),
                }
            }
            Err(failure) => {
                self.state = SessionState::Initialized { app };
                Err(failure.into())
            }
        }
    }

    /// Drop the authenticated user, keeping the init result.
    pub fn logout(&mut self) {
        if let SessionState::Authenticated { app, .. } = &self.state {
            self.state = SessionState::Initialized { app: app.clone() };
        }
    }

    pub fn app(&self) -> Option<&AppInitData> {
        match &self.state {
            SessionState::Initialized { app } | SessionState::Authenticated { app, .. } => app.as_ref(),
            _ => None,
        }
    }

    pub fn user(&self) -> Option<&LoginData> {
        match &self.state {
            SessionState::Authenticated { user, .. } => Some(user),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, SessionState::Authenticated { .. })
    }

    /// Init succeeded but the server reports a newer version
    pub fn version_mismatch(&self) -> bool {
        self.app().is_some_and(AppInitData::is_version_mismatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::AppIdentity;
    use crate::response::FailureKind;

    fn offline_session() -> AuthSession {
        let client = AuthSessionClient::new(AppIdentity::new(
            "http://127.0.0.1:1",
            "Demo",
            "key",
            "secret",
            "1.0.0",
        ))
        .unwrap();
        AuthSession::new(client)
    }

    #[test]
    fn test_login_requires_init() {
        let mut session = offline_session();
        assert_eq!(session.state(), &SessionState::Uninitialized);
        assert_eq!(session.login("alice", "pw").unwrap_err(), SessionError::NotInitialized);
    }

    #[test]
    fn test_failed_init() {
        let mut session = offline_session();

        let err = session.initialize().unwrap_err();
        match err {
            SessionError::Rejected(failure) => assert_eq!(failure.kind, FailureKind::Transport),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(matches!(session.state(), SessionState::Failed { .. }));
        assert_eq!(session.login("alice", "pw").unwrap_err(), SessionError::NotInitialized);
        assert!(!session.is_authenticated());
    }
}
