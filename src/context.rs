//! Application lifetime state: who is logged in and which category is open

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::auth::{AuthState, SessionStore};
use crate::catalog::Category;
use crate::error::Error;

/// Holds the session and the selected category for as long as the
/// application runs. Created with [`AppContext::init`] and released with
/// [`AppContext::teardown`].
#[derive(Debug, Clone)]
pub struct AppContext {
    auth: AuthState,
    selected_category: Arc<Mutex<Option<Category>>>,
}

impl AppContext {
    /// Builds the context and restores any stored session.
    pub async fn init(store: Arc<dyn SessionStore>) -> Result<Self, Error> {
        let auth = AuthState::new(store);
        auth.initialize().await?;
        debug!(authenticated = auth.is_authenticated().await, "application context ready");
        Ok(Self {
            auth,
            selected_category: Arc::new(Mutex::new(None)),
        })
    }

    pub fn auth(&self) -> &AuthState {
        &self.auth
    }

    pub async fn selected_category(&self) -> Option<Category> {
        self.selected_category.lock().await.clone()
    }

    pub async fn select_category(&self, category: Category) {
        debug!(category_id = category.id, "category selected");
        *self.selected_category.lock().await = Some(category);
    }

    pub async fn clear_category(&self) {
        *self.selected_category.lock().await = None;
    }

    /// Drops in-memory state. The stored session is left in place.
    pub async fn teardown(&self) {
        self.auth.reset().await;
        self.clear_category().await;
    }
}
