//! Text shown for products and users in lists and detail views

use chrono::{DateTime, Utc};

use super::product::{AttributeEntry, Product, ProductStatus};

/// `code: a, b | other: 5`
pub fn attribute_summary(attributes: &[AttributeEntry]) -> String {
    attributes
        .iter()
        .map(|attr| format!("{}: {}", attr.code, attr.display_value()))
        .collect::<Vec<_>>()
        .join(" | ")
}

pub fn status_label(status: ProductStatus) -> &'static str {
    match status {
        ProductStatus::Active => "Available",
        ProductStatus::Inactive => "Unavailable",
    }
}

/// Units are only meaningful for active products.
pub fn units_display(product: &Product) -> String {
    match product.status {
        ProductStatus::Active => format!("{}", product.units),
        ProductStatus::Inactive => "–".to_string(),
    }
}

/// `01 Feb 2024, 10:00`
pub fn timestamp(at: &DateTime<Utc>) -> String {
    at.format("%d %b %Y, %H:%M").to_string()
}

/// Upper-cased first letters of each word, `?` without a name.
pub fn initials(name: Option<&str>) -> String {
    match name {
        Some(name) if !name.trim().is_empty() => name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .flat_map(char::to_uppercase)
            .collect(),
        _ => "?".to_string(),
    }
}
