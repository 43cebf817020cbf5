//! Product submission rules

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError, ValidationErrorsKind};

use super::{collect_field_errors, FormErrors};
use crate::catalog::{AttributeEntry, AttributeValue, Product, ProductDraft, ProductStatus};

/// Struct fields in reporting order, with the names the form uses for them
const PRODUCT_FIELDS: &[(&str, &str)] = &[
    ("name", "name"),
    ("category_id", "categoryId"),
    ("status", "status"),
    ("units", "units"),
];

/// Entry-level failures land under `__all__`; they belong to the value.
const ATTRIBUTE_FIELDS: &[(&str, &str)] = &[("code", "code"), ("kind", "type"), ("__all__", "value")];

/// Raw product form input, before any rule has been applied
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductFormValues {
    #[serde(default)]
    #[validate(length(min = 1, message = "Product name is required"))]
    pub name: String,

    #[validate(required(message = "Category is required"))]
    pub category_id: Option<i64>,

    #[validate(
        required(message = "Status is required"),
        custom(function = "known_status")
    )]
    pub status: Option<String>,

    #[validate(
        range(min = 0.0, message = "Units must be at least 0"),
        required(message = "Units are required"),
        custom(function = "finite_units")
    )]
    pub units: Option<f64>,

    #[serde(default)]
    #[validate(nested)]
    pub attributes: Vec<AttributeEntry>,
}

fn known_status(status: &str) -> Result<(), ValidationError> {
    if status.is_empty() {
        return Err(ValidationError::new("required").with_message(Cow::Borrowed("Status is required")));
    }
    match ProductStatus::parse(status) {
        Some(_) => Ok(()),
        None => Err(ValidationError::new("status").with_message(Cow::Borrowed(
            "Status must be one of the following values: active, inactive",
        ))),
    }
}

fn finite_units(units: f64) -> Result<(), ValidationError> {
    if units.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::new("finite").with_message(Cow::Borrowed("Units must be a number")))
    }
}

impl ProductFormValues {
    /// Defaults for a new product filed under `category_id`
    pub fn new_in(category_id: i64) -> Self {
        Self {
            name: String::new(),
            category_id: Some(category_id),
            status: Some(ProductStatus::Active.as_str().to_string()),
            units: Some(0.0),
            attributes: Vec::new(),
        }
    }
}

impl From<&Product> for ProductFormValues {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            category_id: Some(product.category_id),
            status: Some(product.status.as_str().to_string()),
            units: Some(product.units),
            attributes: product.attributes.clone(),
        }
    }
}

pub(crate) fn attribute_path(index: usize, part: &str) -> String {
    format!("attributes[{}].{}", index, part)
}

/// Applies every product rule, returning the typed draft or all failures.
///
/// Failures are reported per field in form order, attributes last.
pub fn validate_product(values: &ProductFormValues) -> Result<ProductDraft, FormErrors> {
    let mut errors = FormErrors::new();

    if let Err(failures) = values.validate() {
        collect_field_errors(&failures, PRODUCT_FIELDS, "", &mut errors);
        if let Some(ValidationErrorsKind::List(entries)) = failures.errors().get("attributes") {
            for (index, entry) in entries {
                collect_field_errors(entry, ATTRIBUTE_FIELDS, &attribute_path(*index, ""), &mut errors);
            }
        }
        return Err(errors);
    }

    let status = values.status.as_deref().and_then(ProductStatus::parse);
    let attributes = values
        .attributes
        .iter()
        .cloned()
        .map(AttributeValue::try_from)
        .collect::<Result<Vec<_>, _>>();

    match (values.category_id, status, values.units, attributes) {
        (Some(category_id), Some(status), Some(units), Ok(attributes)) => Ok(ProductDraft {
            name: values.name.clone(),
            category_id,
            status,
            units,
            attributes,
        }),
        (.., Err(message)) => {
            errors.insert("attributes", message);
            Err(errors)
        }
        _ => Err(errors),
    }
}
