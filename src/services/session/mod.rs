//! Authenticated session: token plus cached user, persisted through an
//! injected [`SessionStorage`] and observable through [`SessionEvent`]s.

mod monitor;
mod storage;
pub mod token;

pub use monitor::SessionMonitor;
pub use storage::{FileSessionStorage, MemorySessionStorage, SessionStorage, StoredSession};

use std::sync::mpsc::{self, Receiver, Sender};

use chrono::Utc;
use thiserror::Error;

use self::token::{inspect_token, TokenState};
use crate::models::user::{LoginRequest, User};
use crate::services::api::{ApiClient, ApiError};
use crate::services::auth::{AuthApi, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn(User),
    UserUpdated(User),
    LoggedOut,
    /// The token stopped being accepted; carries the reason shown to the user
    Invalidated(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("No se pudo guardar la sesión: {0}")]
    Storage(String),

    #[error("No hay una sesión activa")]
    NotAuthenticated,
}

pub struct SessionService {
    storage: Box<dyn SessionStorage>,
    client: ApiClient,
    current: Option<StoredSession>,
    subscribers: Vec<Sender<SessionEvent>>,
}

impl SessionService {
    /// `client` gets its bearer token kept in sync with the session
    pub fn new(storage: Box<dyn SessionStorage>, client: ApiClient) -> Self {
        Self {
            storage,
            client,
            current: None,
            subscribers: Vec::new(),
        }
    }

    /// Load a stored session; unreadable or expired data is cleared
    pub fn restore(&mut self) -> Option<&User> {
        let stored = match self.storage.load() {
            Ok(stored) => stored,
            Err(err) => {
                log::warn!("Discarding stored session: {:#}", err);
                self.clear_storage();
                None
            }
        };

        let session = stored?;
        match inspect_token(&session.token, Utc::now()) {
            TokenState::Malformed | TokenState::Expired => {
                log::info!("Stored session token is no longer usable");
                self.clear_storage();
                None
            }
            TokenState::ExpiringSoon | TokenState::Fresh => {
                log::info!("Restored session for user {}", session.user.id);
                self.client.set_token(Some(session.token.clone()));
                self.current = Some(session);
                self.current_user()
            }
        }
    }

    /// Log in against the backend and establish the session
    pub fn login(&mut self, auth: &dyn AuthApi, request: &LoginRequest) -> Result<User, SessionError> {
        let response = auth.login(request)?;
        self.establish(response.token, response.user.clone())?;
        Ok(response.user)
    }

    /// Persist and activate a session obtained elsewhere (login or register)
    pub fn establish(&mut self, token: String, user: User) -> Result<(), SessionError> {
        let session = StoredSession {
            token,
            user: user.clone(),
        };
        self.storage
            .save(&session)
            .map_err(|err| SessionError::Storage(format!("{:#}", err)))?;
        self.client.set_token(Some(session.token.clone()));
        self.current = Some(session);
        self.emit(SessionEvent::LoggedIn(user));
        Ok(())
    }

    pub fn logout(&mut self) {
        self.end_session();
        log::info!("Logged out");
        self.emit(SessionEvent::LoggedOut);
    }

    /// End the session because the token was rejected
    pub fn invalidate(&mut self, reason: &str) {
        if self.current.is_none() {
            return;
        }
        self.end_session();
        log::warn!("Session invalidated: {}", reason);
        self.emit(SessionEvent::Invalidated(reason.to_string()));
    }

    /// Replace the cached profile, e.g. after editing one's own account
    pub fn update_user(&mut self, user: User) -> Result<(), SessionError> {
        let session = self.current.as_mut().ok_or(SessionError::NotAuthenticated)?;
        session.user = user.clone();
        self.storage
            .save(session)
            .map_err(|err| SessionError::Storage(format!("{:#}", err)))?;
        self.emit(SessionEvent::UserUpdated(user));
        Ok(())
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current.as_ref().map(|session| &session.user)
    }

    pub fn token(&self) -> Option<&str> {
        self.current.as_ref().map(|session| session.token.as_str())
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Receive every event emitted from now on
    pub fn subscribe(&mut self) -> Receiver<SessionEvent> {
        let (sender, receiver) = mpsc::channel();
        self.subscribers.push(sender);
        receiver
    }

    fn end_session(&mut self) {
        self.current = None;
        self.client.set_token(None);
        self.clear_storage();
    }

    fn clear_storage(&self) {
        if let Err(err) = self.storage.clear() {
            log::error!("Failed to clear stored session: {:#}", err);
        }
    }

    fn emit(&mut self, event: SessionEvent) {
        self.subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::token::tests::token_expiring_at;
    use super::*;
    use crate::models::user::AuthResponse;
    use crate::services::auth::MockAuthApi;
    use chrono::Duration as ChronoDuration;
    use std::time::Duration;

    fn client() -> ApiClient {
        ApiClient::new("http://localhost:3001", Duration::from_secs(1)).unwrap()
    }

    fn user() -> User {
        serde_json::from_str(
            r#"{"id": 7, "email": "admin@bak.cl", "first_name": "Ana", "last_name": "Rojas", "role": "admin"}"#,
        )
        .unwrap()
    }

    fn fresh_token() -> String {
        token_expiring_at(Utc::now() + ChronoDuration::hours(8))
    }

    #[test]
    fn test_login_persists_and_notifies() {
        let mut auth = MockAuthApi::new();
        let token = fresh_token();
        let response_token = token.clone();
        auth.expect_login().times(1).returning(move |_| {
            Ok(AuthResponse {
                message: None,
                user: user(),
                token: response_token.clone(),
            })
        });

        let mut session = SessionService::new(Box::new(MemorySessionStorage::new()), client());
        let events = session.subscribe();
        let request = LoginRequest {
            email: "admin@bak.cl".to_string(),
            password: "secreto".to_string(),
        };

        let logged_in = session.login(&auth, &request).unwrap();
        assert_eq!(logged_in.full_name(), "Ana Rojas");
        assert_eq!(session.token(), Some(token.as_str()));
        assert_eq!(session.client().token(), Some(token));
        assert_eq!(events.try_recv(), Ok(SessionEvent::LoggedIn(user())));
    }

    #[test]
    fn test_failed_login_leaves_no_session() {
        let mut auth = MockAuthApi::new();
        auth.expect_login().returning(|_| {
            Err(ApiError::Http {
                status: 401,
                message: "Credenciales inválidas".to_string(),
            })
        });
        let mut session = SessionService::new(Box::new(MemorySessionStorage::new()), client());
        let request = LoginRequest {
            email: "admin@bak.cl".to_string(),
            password: "mala".to_string(),
        };

        let err = session.login(&auth, &request).unwrap_err();
        assert_eq!(err.to_string(), "Credenciales inválidas");
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_restore_clears_corrupt_storage() {
        let mut session = SessionService::new(
            Box::new(MemorySessionStorage::with_raw("{not json")),
            client(),
        );
        assert!(session.restore().is_none());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_restore_rejects_expired_token() {
        let storage = MemorySessionStorage::new();
        storage
            .save(&StoredSession {
                token: token_expiring_at(Utc::now() - ChronoDuration::minutes(1)),
                user: user(),
            })
            .unwrap();
        let mut session = SessionService::new(Box::new(storage), client());
        assert!(session.restore().is_none());
    }

    #[test]
    fn test_restore_sets_client_token() {
        let storage = MemorySessionStorage::new();
        let token = fresh_token();
        storage
            .save(&StoredSession {
                token: token.clone(),
                user: user(),
            })
            .unwrap();
        let mut session = SessionService::new(Box::new(storage), client());
        assert_eq!(session.restore().map(|user| user.id.clone()), Some("7".to_string()));
        assert_eq!(session.client().token(), Some(token));
    }

    #[test]
    fn test_invalidate_emits_reason_once() {
        let mut session = SessionService::new(Box::new(MemorySessionStorage::new()), client());
        session.establish(fresh_token(), user()).unwrap();
        let events = session.subscribe();

        session.invalidate("Token expirado");
        session.invalidate("Token expirado");

        assert_eq!(
            events.try_iter().collect::<Vec<_>>(),
            vec![SessionEvent::Invalidated("Token expirado".to_string())]
        );
        assert!(session.client().token().is_none());
    }

    #[test]
    fn test_update_user_requires_session() {
        let mut session = SessionService::new(Box::new(MemorySessionStorage::new()), client());
        assert_eq!(session.update_user(user()), Err(SessionError::NotAuthenticated));
    }
}
