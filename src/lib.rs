//! Catalog Admin Client Library
//!
//! Client side of a catalog administration tool: builds the category
//! hierarchy, validates product forms, keeps the product table's pagination
//! and sorting in step with the backend, and tracks the login session.

pub mod auth;
pub mod catalog;
pub mod config;
pub mod context;
pub mod error;
pub mod fetch;
pub mod router;
pub mod table;
pub mod validation;

use reqwest::Client;
use std::sync::Arc;

use crate::auth::{AuthClient, FileSessionStore, SessionStore};
use crate::catalog::{CategoriesClient, ProductsClient};
use crate::config::{CatalogConfig, ClientOptions};
use crate::context::AppContext;
use crate::error::Error;
use crate::table::ProductListController;

/// The main entry point for the catalog admin client
#[derive(Debug, Clone)]
pub struct CatalogAdmin {
    /// The base URL of the catalog backend
    pub url: String,
    /// HTTP client used for requests
    pub http_client: Client,
    /// Client options
    pub options: ClientOptions,
}

impl CatalogAdmin {
    /// Create a new client with default options
    ///
    /// # Example
    ///
    /// ```
    /// use catalog_admin::CatalogAdmin;
    ///
    /// let admin = CatalogAdmin::new("http://localhost:3000").unwrap();
    /// let products = admin.products();
    /// ```
    pub fn new(api_url: &str) -> Result<Self, Error> {
        Self::new_with_options(api_url, ClientOptions::default())
    }

    /// Create a new client with custom options
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    /// use catalog_admin::{CatalogAdmin, config::ClientOptions};
    ///
    /// let options = ClientOptions::default()
    ///     .with_request_timeout(Some(Duration::from_secs(5)))
    ///     .with_default_page_size(20);
    /// let admin = CatalogAdmin::new_with_options("http://localhost:3000", options).unwrap();
    /// ```
    pub fn new_with_options(api_url: &str, options: ClientOptions) -> Result<Self, Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;

        Ok(Self {
            url: api_url.trim_end_matches('/').to_string(),
            http_client,
            options,
        })
    }

    /// Create a client from a loaded configuration
    pub fn from_config(config: &CatalogConfig) -> Result<Self, Error> {
        Self::new_with_options(config.api_url.as_str(), config.options.clone())
    }

    /// Client for the login lookup
    pub fn auth(&self) -> AuthClient {
        AuthClient::new(&self.url, self.http_client.clone()).with_token(&self.options.mock_token)
    }

    /// Client for the category collection
    pub fn categories(&self) -> CategoriesClient {
        CategoriesClient::new(&self.url, self.http_client.clone())
    }

    /// Client for the product collection
    pub fn products(&self) -> ProductsClient {
        ProductsClient::new(&self.url, self.http_client.clone())
    }

    /// A product table using the configured page sizes
    pub fn product_list(&self) -> ProductListController {
        ProductListController::new(self.products(), &self.options)
    }

    /// Application context backed by the session file of `config`
    pub async fn context(config: &CatalogConfig) -> Result<AppContext, Error> {
        let store: Arc<dyn SessionStore> = Arc::new(FileSessionStore::new(config.session_file.clone()));
        AppContext::init(store).await
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::auth::{AuthState, MemorySessionStore, SessionStore, User};
    pub use crate::catalog::{
        build_category_tree, find_category_by_id, Category, CategoryNode, Product, ProductDraft, ProductQuery,
        ProductStatus, SortOrder,
    };
    pub use crate::config::{CatalogConfig, ClientOptions};
    pub use crate::context::AppContext;
    pub use crate::error::Error;
    pub use crate::router::{resolve, Route};
    pub use crate::table::{ProductListController, TableChange};
    pub use crate::validation::{validate_product, FormErrors, ProductForm};
    pub use crate::CatalogAdmin;
}
