//! Pagination and sort state for the product table, and the controller that
//! keeps it in step with the backend.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::catalog::{Product, ProductDraft, ProductQuery, ProductsClient, SortOrder};
use crate::config::ClientOptions;
use crate::error::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page number
    pub current: u32,
    pub page_size: u32,
    /// Unknown until the first response arrives
    pub total: Option<u64>,
    pub page_size_options: Vec<u32>,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            current: 1,
            page_size: 10,
            total: None,
            page_size_options: vec![5, 10, 20, 50],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sorter {
    pub field: Option<String>,
    pub order: Option<SortOrder>,
}

/// A change reported by the table: new page, size or sort column.
/// `sort_order` is the table's raw vocabulary; anything other than
/// `ascend`/`descend` clears the order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableChange {
    pub current: Option<u32>,
    pub page_size: Option<u32>,
    pub sort_field: Option<String>,
    pub sort_order: Option<String>,
}

/// Everything a product list request depends on. A fetch is due whenever
/// this differs from the key of the last applied response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchKey {
    pub category_id: Option<i64>,
    pub page: u32,
    pub page_size: u32,
    pub sorter: Sorter,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableState {
    pub pagination: Pagination,
    pub sorter: Sorter,
}

impl TableState {
    pub fn from_options(options: &ClientOptions) -> Self {
        Self {
            pagination: Pagination {
                page_size: options.default_page_size,
                page_size_options: options.page_size_options.clone(),
                ..Pagination::default()
            },
            sorter: Sorter::default(),
        }
    }

    /// Applies a table change. Pagination values replace the current ones;
    /// the sorter is replaced as a whole.
    pub fn apply(&mut self, change: TableChange) {
        if let Some(current) = change.current {
            self.pagination.current = current.max(1);
        }
        if let Some(page_size) = change.page_size {
            self.pagination.page_size = page_size.max(1);
        }
        self.sorter = Sorter {
            field: change.sort_field,
            order: change.sort_order.as_deref().and_then(SortOrder::parse),
        };
    }

    pub fn merge_total(&mut self, total: u64) {
        self.pagination.total = Some(total);
    }

    pub fn fetch_key(&self, category_id: Option<i64>) -> FetchKey {
        FetchKey {
            category_id,
            page: self.pagination.current,
            page_size: self.pagination.page_size,
            sorter: self.sorter.clone(),
        }
    }

    pub fn needs_refetch(&self, category_id: Option<i64>, last: Option<&FetchKey>) -> bool {
        last != Some(&self.fetch_key(category_id))
    }

    pub fn to_query(&self, category_id: Option<i64>) -> ProductQuery {
        ProductQuery {
            category_id,
            page: self.pagination.current,
            limit: self.pagination.page_size,
            sort_field: self.sorter.field.clone(),
            sort_order: self.sorter.order,
        }
    }
}

#[derive(Debug)]
struct ListInner {
    category_id: Option<i64>,
    table: TableState,
    products: Vec<Product>,
    loading: bool,
    applied: Option<FetchKey>,
    last_touched: Option<i64>,
}

/// Product table for one category.
///
/// Each refresh takes a new request generation. A response is applied only
/// while its generation is still the latest, so a slow response to an older
/// request never overwrites the state a newer request asked for.
#[derive(Debug, Clone)]
pub struct ProductListController {
    products: ProductsClient,
    inner: Arc<Mutex<ListInner>>,
    generation: Arc<AtomicU64>,
}

impl ProductListController {
    pub fn new(products: ProductsClient, options: &ClientOptions) -> Self {
        Self {
            products,
            inner: Arc::new(Mutex::new(ListInner {
                category_id: None,
                table: TableState::from_options(options),
                products: Vec::new(),
                loading: false,
                applied: None,
                last_touched: None,
            })),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Switches the table to another category. The page is kept.
    pub async fn set_category(&self, category_id: i64) -> bool {
        let mut inner = self.inner.lock().await;
        inner.category_id = Some(category_id);
        inner.table.needs_refetch(inner.category_id, inner.applied.as_ref())
    }

    /// Applies a table change and reports whether a fetch is now due.
    pub async fn change_table(&self, change: TableChange) -> bool {
        let mut inner = self.inner.lock().await;
        inner.table.apply(change);
        inner.table.needs_refetch(inner.category_id, inner.applied.as_ref())
    }

    pub async fn needs_refetch(&self) -> bool {
        let inner = self.inner.lock().await;
        inner.table.needs_refetch(inner.category_id, inner.applied.as_ref())
    }

    /// Fetches the current page.
    ///
    /// Returns `Ok(false)` when there is no category yet or when the response
    /// was superseded by a newer request and discarded.
    pub async fn refresh(&self) -> Result<bool, Error> {
        let (generation, key, query) = {
            let mut inner = self.inner.lock().await;
            let Some(category_id) = inner.category_id else {
                return Ok(false);
            };
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            inner.loading = true;
            (
                generation,
                inner.table.fetch_key(Some(category_id)),
                inner.table.to_query(Some(category_id)),
            )
        };

        debug!(generation, page = key.page, page_size = key.page_size, "refreshing products");
        let result = self.products.fetch_by_category(&query).await;

        let mut inner = self.inner.lock().await;
        let latest = self.generation.load(Ordering::SeqCst);
        if generation != latest {
            warn!(generation, latest, "discarding stale products response");
            return Ok(false);
        }
        inner.loading = false;

        let page = result?;
        inner.products = page.data;
        inner.table.merge_total(page.total);
        inner.applied = Some(key);
        Ok(true)
    }

    /// Fetches only when the table state changed since the last response.
    pub async fn refresh_if_needed(&self) -> Result<bool, Error> {
        if self.needs_refetch().await {
            self.refresh().await
        } else {
            Ok(false)
        }
    }

    /// Creates a product and reloads the page.
    ///
    /// The created product is returned even when the reload fails; the table
    /// then stays marked for a refetch.
    pub async fn create(&self, draft: &ProductDraft) -> Result<Product, Error> {
        let product = self.products.create(draft).await?;
        self.after_write(Some(product.id)).await;
        Ok(product)
    }

    pub async fn update(&self, id: i64, draft: &ProductDraft) -> Result<Product, Error> {
        let product = self.products.update(id, draft).await?;
        self.after_write(Some(product.id)).await;
        Ok(product)
    }

    pub async fn delete(&self, id: i64) -> Result<(), Error> {
        self.products.delete(id).await?;
        let last = {
            let inner = self.inner.lock().await;
            inner.last_touched.filter(|touched| *touched != id)
        };
        self.after_write(last).await;
        Ok(())
    }

    async fn after_write(&self, touched: Option<i64>) {
        {
            let mut inner = self.inner.lock().await;
            inner.last_touched = touched;
            // Rows on screen no longer match the backend
            inner.applied = None;
        }
        if let Err(e) = self.refresh().await {
            warn!(error = %e, "reload after write failed");
        }
    }

    pub async fn products(&self) -> Vec<Product> {
        self.inner.lock().await.products.clone()
    }

    pub async fn table(&self) -> TableState {
        self.inner.lock().await.table.clone()
    }

    pub async fn category_id(&self) -> Option<i64> {
        self.inner.lock().await.category_id
    }

    pub async fn loading(&self) -> bool {
        self.inner.lock().await.loading
    }

    /// Id of the product most recently created or updated through this table
    pub async fn last_touched(&self) -> Option<i64> {
        self.inner.lock().await.last_touched
    }
}
