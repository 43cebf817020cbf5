//! Category and product operations against the catalog REST API

mod category;
pub mod format;
mod product;
mod query;

use chrono::Utc;
use reqwest::Client;
use tracing::debug;

use crate::error::Error;
use crate::fetch::Fetch;

pub use category::*;
pub use product::*;
pub use query::*;

/// Sent with every request so backend logs can tell clients apart
pub const CLIENT_INFO: &str = concat!("catalog-admin/", env!("CARGO_PKG_VERSION"));

/// One page of a list query plus the unpaginated total
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: u64,
}

/// Client for the `/categories` collection
#[derive(Debug, Clone)]
pub struct CategoriesClient {
    /// The base URL of the backend
    url: String,

    /// HTTP client
    client: Client,
}

impl CategoriesClient {
    pub(crate) fn new(url: &str, client: Client) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            client,
        }
    }

    fn get_url(&self) -> String {
        format!("{}/categories", self.url)
    }

    /// Every category as a flat list
    pub async fn fetch_all(&self) -> Result<Vec<Category>, Error> {
        Fetch::get(&self.client, &self.get_url())
            .header("X-Client-Info", CLIENT_INFO)
            .fallback_message("Failed to fetch categories.")
            .execute::<Vec<Category>>()
            .await
    }

    /// Categories products can be filed under
    pub async fn fetch_leaves(&self) -> Result<Vec<Category>, Error> {
        let all = self.fetch_all().await?;
        Ok(leaf_categories(&all))
    }

    /// The nested hierarchy, with diagnostics about broken parent links
    pub async fn fetch_tree(&self) -> Result<CategoryTree, Error> {
        let all = self.fetch_all().await?;
        Ok(CategoryTree::build(&all))
    }
}

/// Client for the `/products` collection
#[derive(Debug, Clone)]
pub struct ProductsClient {
    /// The base URL of the backend
    url: String,

    /// HTTP client
    client: Client,
}

impl ProductsClient {
    pub(crate) fn new(url: &str, client: Client) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            client,
        }
    }

    fn get_url(&self) -> String {
        format!("{}/products", self.url)
    }

    fn item_url(&self, id: i64) -> String {
        format!("{}/products/{}", self.url, id)
    }

    async fn fetch_page(&self, query: &ProductQuery) -> Result<Page<Product>, Error> {
        let (data, total) = Fetch::get(&self.client, &self.get_url())
            .header("X-Client-Info", CLIENT_INFO)
            .query(query.to_params())
            .fallback_message("Failed to load products.")
            .execute_with_total::<Vec<Product>>()
            .await?;
        debug!(count = data.len(), total, "products page loaded");
        Ok(Page { data, total })
    }

    /// A page of products in the query's category
    pub async fn fetch_by_category(&self, query: &ProductQuery) -> Result<Page<Product>, Error> {
        if query.category_id.is_none() {
            return Err(Error::invalid_input("a category id is required"));
        }
        self.fetch_page(query).await
    }

    /// A page of products across all categories
    pub async fn fetch_all(&self, query: &ProductQuery) -> Result<Page<Product>, Error> {
        let query = ProductQuery {
            category_id: None,
            ..query.clone()
        };
        self.fetch_page(&query).await
    }

    pub async fn fetch_one(&self, id: i64) -> Result<Product, Error> {
        Fetch::get(&self.client, &self.item_url(id))
            .header("X-Client-Info", CLIENT_INFO)
            .fallback_message("Failed to load product.")
            .execute::<Product>()
            .await
    }

    pub async fn create(&self, draft: &ProductDraft) -> Result<Product, Error> {
        let body = ProductWrite::create(draft, Utc::now());
        Fetch::post(&self.client, &self.get_url())
            .header("X-Client-Info", CLIENT_INFO)
            .fallback_message("Failed to create product.")
            .json(&body)?
            .execute::<Product>()
            .await
    }

    pub async fn update(&self, id: i64, draft: &ProductDraft) -> Result<Product, Error> {
        let body = ProductWrite::update(draft, Utc::now());
        Fetch::patch(&self.client, &self.item_url(id))
            .header("X-Client-Info", CLIENT_INFO)
            .fallback_message("Failed to update product.")
            .json(&body)?
            .execute::<Product>()
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<(), Error> {
        Fetch::delete(&self.client, &self.item_url(id))
            .header("X-Client-Info", CLIENT_INFO)
            .fallback_message("Failed to delete product.")
            .execute_empty()
            .await
    }

    /// The most recently updated product, within a category when one is given
    pub async fn last_updated(&self, category_id: Option<i64>) -> Result<Option<Product>, Error> {
        let mut query = ProductQuery::new()
            .page(1)
            .limit(1)
            .sort(Some("updated_at"), Some(SortOrder::Descend));
        query.category_id = category_id;
        let page = self.fetch_page(&query).await?;
        Ok(page.data.into_iter().next())
    }
}
