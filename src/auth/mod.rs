//! Login lookup and session state

mod session;
mod types;

use reqwest::Client;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use crate::catalog::CLIENT_INFO;
use crate::config::MOCK_TOKEN;
use crate::error::Error;
use crate::fetch::Fetch;

pub use session::*;
pub use types::*;

/// Client for the `/users` login lookup
#[derive(Debug, Clone)]
pub struct AuthClient {
    /// The base URL of the backend
    url: String,

    /// HTTP client used for requests
    client: Client,

    /// Token recorded for a successful lookup
    token: String,
}

impl AuthClient {
    pub(crate) fn new(url: &str, client: Client) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            client,
            token: MOCK_TOKEN.to_string(),
        }
    }

    pub(crate) fn with_token(mut self, token: &str) -> Self {
        self.token = token.to_string();
        self
    }

    fn get_url(&self) -> String {
        format!("{}/users", self.url)
    }

    /// Looks up a user by email and password.
    ///
    /// The backend keeps no credentials of its own, so a match simply yields
    /// the configured mock token.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, Error> {
        let users = Fetch::get(&self.client, &self.get_url())
            .header("X-Client-Info", CLIENT_INFO)
            .query(vec![
                ("email".to_string(), email.to_string()),
                ("password".to_string(), password.to_string()),
            ])
            .fallback_message("Login failed due to server error")
            .execute::<Vec<User>>()
            .await?;

        let user = users
            .into_iter()
            .next()
            .ok_or_else(|| Error::auth("Invalid credentials"))?;

        Ok(LoginResponse {
            user,
            token: self.token.clone(),
        })
    }
}

#[derive(Debug, Default)]
struct AuthInner {
    session: Option<Session>,
    hydrated: bool,
}

/// The logged in user and token, backed by a [`SessionStore`].
#[derive(Clone)]
pub struct AuthState {
    inner: Arc<Mutex<AuthInner>>,
    store: Arc<dyn SessionStore>,
}

impl AuthState {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(AuthInner::default())),
            store,
        }
    }

    /// Restores the stored session. Only the first call reads the store.
    pub async fn initialize(&self) -> Result<(), Error> {
        let mut inner = self.inner.lock().await;
        if inner.hydrated {
            return Ok(());
        }
        inner.session = self.store.load().await?;
        inner.hydrated = true;
        Ok(())
    }

    /// Records a successful login and persists it
    pub async fn login(&self, user: User, token: &str) -> Result<(), Error> {
        let session = Session::new(token, user);
        self.store.save(&session).await?;
        info!(user_id = session.user.id, email = %session.user.email, "logged in");
        let mut inner = self.inner.lock().await;
        inner.session = Some(session);
        inner.hydrated = true;
        Ok(())
    }

    pub async fn logout(&self) -> Result<(), Error> {
        self.store.clear().await?;
        let mut inner = self.inner.lock().await;
        if let Some(session) = inner.session.take() {
            info!(user_id = session.user.id, "logged out");
        }
        Ok(())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.inner.lock().await.session.is_some()
    }

    pub async fn hydrated(&self) -> bool {
        self.inner.lock().await.hydrated
    }

    pub async fn user(&self) -> Option<User> {
        self.inner.lock().await.session.as_ref().map(|s| s.user.clone())
    }

    pub async fn token(&self) -> Option<String> {
        self.inner.lock().await.session.as_ref().map(|s| s.token.clone())
    }

    /// Forgets the in-memory session without touching the store
    pub(crate) async fn reset(&self) {
        let mut inner = self.inner.lock().await;
        inner.session = None;
        inner.hydrated = false;
    }
}

impl std::fmt::Debug for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthState").finish_non_exhaustive()
    }
}
