//! Query parameters for product list requests

use convert_case::{Case, Casing};
use std::fmt;

/// Sort direction as chosen in a table header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascend,
    Descend,
}

impl SortOrder {
    /// Table vocabulary
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Ascend => "ascend",
            SortOrder::Descend => "descend",
        }
    }

    /// Anything other than `ascend`/`descend` means "not sorted".
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "ascend" => Some(SortOrder::Ascend),
            "descend" => Some(SortOrder::Descend),
            _ => None,
        }
    }

    /// Value of the `_order` query parameter
    pub fn as_query(&self) -> &'static str {
        match self {
            SortOrder::Ascend => "asc",
            SortOrder::Descend => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps a raw table sort order to the `_order` parameter, if any.
pub fn order_param(raw: Option<&str>) -> Option<&'static str> {
    raw.and_then(SortOrder::parse).map(|o| o.as_query())
}

/// Base query builder
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryBuilder {
    params: Vec<(String, String)>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// Add a parameter to the query, replacing an earlier one with the same key
    pub fn add_param(&mut self, key: &str, value: &str) {
        match self.params.iter_mut().find(|(k, _)| k == key) {
            Some(existing) => existing.1 = value.to_string(),
            None => self.params.push((key.to_string(), value.to_string())),
        }
    }

    pub fn get_params(&self) -> &[(String, String)] {
        &self.params
    }
}

/// A page of products, optionally restricted to a category and sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    pub category_id: Option<i64>,
    pub page: u32,
    pub limit: u32,
    pub sort_field: Option<String>,
    pub sort_order: Option<SortOrder>,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            category_id: None,
            page: 1,
            limit: 10,
            sort_field: None,
            sort_order: None,
        }
    }
}

impl ProductQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn sort(mut self, field: Option<&str>, order: Option<SortOrder>) -> Self {
        self.sort_field = field.map(str::to_string);
        self.sort_order = order;
        self
    }

    /// `category_id`, `_page`, `_limit`, `_sort`, `_order`; unset values are left out.
    ///
    /// Records are stored with snake_case columns, so the sort field is sent
    /// as `updated_at` even when the table reports `updatedAt`.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut query = QueryBuilder::new();
        if let Some(category_id) = self.category_id {
            query.add_param("category_id", &category_id.to_string());
        }
        query.add_param("_page", &self.page.to_string());
        query.add_param("_limit", &self.limit.to_string());
        if let Some(field) = &self.sort_field {
            query.add_param("_sort", &field.to_case(Case::Snake));
        }
        if let Some(order) = self.sort_order {
            query.add_param("_order", order.as_query());
        }
        query.get_params().to_vec()
    }
}
