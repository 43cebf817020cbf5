//! Validation rules for the product and login forms

mod form;
mod login;
mod product;

use std::fmt;
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

pub use form::*;
pub use login::*;
pub use product::*;

/// Per-field error messages in the order they were found.
/// Only the first message for a field is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    errors: Vec<(String, String)>,
}

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let field = field.into();
        if !self.contains(&field) {
            self.errors.push((field, message.into()));
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, m)| m.as_str())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn first(&self) -> Option<(&str, &str)> {
        self.errors.first().map(|(f, m)| (f.as_str(), m.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(f, m)| (f.as_str(), m.as_str()))
    }

    /// `Ok(())` when nothing was recorded
    pub fn into_result(self) -> Result<(), FormErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|(field, msg)| format!("{}: {}", field, msg)).collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Copies the first message of each `(field, reported_as)` pair, in the
/// order given, under `prefix` + `reported_as`.
pub(crate) fn collect_field_errors(
    failures: &ValidationErrors,
    fields: &[(&str, &str)],
    prefix: &str,
    into: &mut FormErrors,
) {
    for (field, reported_as) in fields {
        if let Some(ValidationErrorsKind::Field(list)) = failures.errors().get(*field) {
            if let Some(first) = list.first() {
                into.insert(format!("{}{}", prefix, reported_as), message_of(first));
            }
        }
    }
}

fn message_of(error: &ValidationError) -> String {
    error
        .message
        .as_ref()
        .map(|m| m.to_string())
        .unwrap_or_else(|| error.code.to_string())
}
