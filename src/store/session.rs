use std::sync::Arc;

use log::{debug, info};

use crate::api::{AuthToken, ExpenseApi};
use crate::models::{LoginRequest, RegisterRequest, User, UserRole};
use crate::persist::{PersistedSession, SessionStorage};
use crate::validation::{self, ValidationErrors};

const LOGIN_FALLBACK: &str = "Login failed";
const REGISTER_FALLBACK: &str = "Registration failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    Anonymous,
    Authenticating,
    Authenticated,
}

/// The client's record of who is signed in. Owns the auth state machine
/// (anonymous -> authenticating -> authenticated), writes the shared
/// token slot the API client reads, and persists the session across runs.
pub struct SessionStore<A, S> {
    api: Arc<A>,
    storage: S,
    token: Arc<AuthToken>,
    status: AuthStatus,
    user: Option<User>,
    error: Option<String>,
}

impl<A: ExpenseApi, S: SessionStorage> SessionStore<A, S> {
    pub fn new(api: Arc<A>, storage: S, token: Arc<AuthToken>) -> Self {
        Self {
            api,
            storage,
            token,
            status: AuthStatus::Anonymous,
            user: None,
            error: None,
        }
    }

    pub fn status(&self) -> AuthStatus {
        self.status
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.status == AuthStatus::Authenticated
    }

    /// The one authorization check every admin-gated view consults.
    pub fn is_admin(&self) -> bool {
        matches!(self.user.as_ref().map(|u| u.role), Some(UserRole::Admin))
    }

    /// Hydrate from persisted storage at startup. The token is not
    /// validated against the server; an expired one surfaces as the next
    /// authenticated request's failure.
    pub fn restore(&mut self) -> bool {
        match self.storage.load() {
            Some(session) => {
                info!("restored session for {}", session.user.email);
                self.token.set(session.token);
                self.user = Some(session.user);
                self.status = AuthStatus::Authenticated;
                true
            }
            None => false,
        }
    }

    /// Validation failures return field errors and never reach the wire.
    /// A dispatched attempt lands in either `Authenticated` or back in
    /// `Anonymous` with the error slot set.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<(), ValidationErrors> {
        validation::validate_login(email, password)?;
        self.begin_attempt();
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        match self.api.login(&request).await {
            Ok(auth) => self.establish(auth),
            Err(err) => self.fail_attempt(err.message_or(LOGIN_FALLBACK)),
        }
        Ok(())
    }

    pub async fn register(&mut self, request: RegisterRequest) -> Result<(), ValidationErrors> {
        validation::validate_registration(&request)?;
        self.begin_attempt();
        match self.api.register(&request).await {
            Ok(auth) => self.establish(auth),
            Err(err) => self.fail_attempt(err.message_or(REGISTER_FALLBACK)),
        }
        Ok(())
    }

    /// Purely local: clears identity, token, and the persisted session.
    /// Idempotent, no server round-trip.
    pub fn logout(&mut self) {
        debug!("logging out");
        self.user = None;
        self.token.clear();
        self.storage.clear();
        self.status = AuthStatus::Anonymous;
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    fn begin_attempt(&mut self) {
        self.status = AuthStatus::Authenticating;
        self.error = None;
    }

    fn establish(&mut self, auth: crate::models::AuthResponse) {
        info!("authenticated as {}", auth.user.email);
        self.storage.save(&PersistedSession {
            user: auth.user.clone(),
            token: auth.token.clone(),
        });
        self.token.set(auth.token);
        self.user = Some(auth.user);
        self.status = AuthStatus::Authenticated;
    }

    fn fail_attempt(&mut self, message: String) {
        debug!("auth attempt failed: {}", message);
        self.error = Some(message);
        self.status = AuthStatus::Anonymous;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::persist::MemoryStorage;
    use crate::store::testing::{auth_response, sample_user, FakeApi};

    fn store_with(api: FakeApi) -> SessionStore<FakeApi, Arc<MemoryStorage>> {
        let storage = Arc::new(MemoryStorage::default());
        SessionStore::new(Arc::new(api), storage, Arc::new(AuthToken::default()))
    }

    #[tokio::test]
    async fn test_login_success_authenticates_and_stores_token() {
        let api = FakeApi::default();
        api.login
            .lock()
            .unwrap()
            .push(Ok(auth_response(sample_user(UserRole::Employee))));
        let storage = Arc::new(MemoryStorage::default());
        let token = Arc::new(AuthToken::default());
        let mut store = SessionStore::new(Arc::new(api), storage.clone(), token.clone());

        store.login("jane@example.com", "secret1").await.unwrap();

        assert_eq!(store.status(), AuthStatus::Authenticated);
        assert!(store.is_authenticated());
        assert_eq!(store.user().unwrap().email, "jane@example.com");
        assert_eq!(store.error(), None);
        assert_eq!(token.get(), Some("token-abc".to_string()));
        assert!(storage.load().is_some());
    }

    #[tokio::test]
    async fn test_login_failure_stays_anonymous_with_error() {
        let api = FakeApi::default();
        api.login.lock().unwrap().push(Err(ApiError::Server {
            status: 401,
            message: Some("Invalid credentials".into()),
        }));
        let mut store = store_with(api);

        store.login("jane@example.com", "wrongpw").await.unwrap();

        assert_eq!(store.status(), AuthStatus::Anonymous);
        assert_eq!(store.error(), Some("Invalid credentials"));
        assert!(store.user().is_none());
    }

    #[tokio::test]
    async fn test_login_failure_without_server_message_uses_fallback() {
        let api = FakeApi::default();
        api.login
            .lock()
            .unwrap()
            .push(Err(ApiError::Network("connection refused".into())));
        let mut store = store_with(api);

        store.login("jane@example.com", "secret1").await.unwrap();

        assert_eq!(store.error(), Some("Login failed"));
    }

    #[tokio::test]
    async fn test_login_validation_failure_sends_nothing() {
        let api = FakeApi::default();
        let mut store = store_with(api);

        let err = store.login("", "abc").await.unwrap_err();

        assert_eq!(err.0.len(), 2);
        assert_eq!(store.status(), AuthStatus::Anonymous);
        assert!(store.api.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_new_attempt_clears_previous_error() {
        let api = FakeApi::default();
        {
            let mut login = api.login.lock().unwrap();
            login.push(Err(ApiError::Server {
                status: 401,
                message: Some("Invalid credentials".into()),
            }));
            login.push(Ok(auth_response(sample_user(UserRole::Employee))));
        }
        let mut store = store_with(api);

        store.login("jane@example.com", "wrongpw").await.unwrap();
        assert!(store.error().is_some());
        store.login("jane@example.com", "secret1").await.unwrap();
        assert_eq!(store.error(), None);
        assert!(store.is_authenticated());
    }

    #[tokio::test]
    async fn test_register_success_establishes_session() {
        let api = FakeApi::default();
        api.register
            .lock()
            .unwrap()
            .push(Ok(auth_response(sample_user(UserRole::Employee))));
        let mut store = store_with(api);

        store
            .register(RegisterRequest {
                email: "jane@example.com".into(),
                password: "secret1".into(),
                first_name: "Jane".into(),
                last_name: "Doe".into(),
                role: None,
            })
            .await
            .unwrap();

        assert!(store.is_authenticated());
    }

    #[tokio::test]
    async fn test_logout_clears_everything_and_is_idempotent() {
        let api = FakeApi::default();
        api.login
            .lock()
            .unwrap()
            .push(Ok(auth_response(sample_user(UserRole::Admin))));
        let storage = Arc::new(MemoryStorage::default());
        let token = Arc::new(AuthToken::default());
        let mut store = SessionStore::new(Arc::new(api), storage.clone(), token.clone());
        store.login("jane@example.com", "secret1").await.unwrap();
        assert!(store.is_admin());

        store.logout();
        store.logout();

        assert_eq!(store.status(), AuthStatus::Anonymous);
        assert!(store.user().is_none());
        assert!(!store.is_admin());
        assert_eq!(token.get(), None);
        assert!(storage.load().is_none());
    }

    #[test]
    fn test_restore_hydrates_without_contacting_server() {
        let api = FakeApi::default();
        let storage = Arc::new(MemoryStorage::default());
        storage.save(&crate::persist::PersistedSession {
            user: sample_user(UserRole::Admin),
            token: "stored-token".into(),
        });
        let token = Arc::new(AuthToken::default());
        let mut store = SessionStore::new(Arc::new(api), storage, token.clone());

        assert!(store.restore());

        assert!(store.is_authenticated());
        assert!(store.is_admin());
        assert_eq!(token.get(), Some("stored-token".to_string()));
        assert!(store.api.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_restore_without_persisted_session() {
        let mut store = store_with(FakeApi::default());
        assert!(!store.restore());
        assert_eq!(store.status(), AuthStatus::Anonymous);
    }
}
