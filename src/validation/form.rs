//! Product form state: values, touched fields and live errors

use serde_json::Value;
use std::collections::HashSet;
use tracing::debug;

use super::product::{attribute_path, validate_product, ProductFormValues};
use super::FormErrors;
use crate::catalog::{AttributeEntry, Product, ProductDraft};
use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    /// The category cannot be changed while editing.
    Edit { product_id: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeField {
    Code,
    Type,
    Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Name,
    CategoryId,
    Status,
    Units,
    Attribute(usize, AttributeField),
}

impl FormField {
    /// Error key for this field, e.g. `attributes[0].value`
    pub fn path(&self) -> String {
        match self {
            FormField::Name => "name".to_string(),
            FormField::CategoryId => "categoryId".to_string(),
            FormField::Status => "status".to_string(),
            FormField::Units => "units".to_string(),
            FormField::Attribute(index, part) => attribute_path(
                *index,
                match part {
                    AttributeField::Code => "code",
                    AttributeField::Type => "type",
                    AttributeField::Value => "value",
                },
            ),
        }
    }
}

/// Rules are re-run after every change or blur; an error is only shown
/// once its field has been touched.
#[derive(Debug, Clone)]
pub struct ProductForm {
    mode: FormMode,
    values: ProductFormValues,
    touched: HashSet<FormField>,
    errors: FormErrors,
}

impl ProductForm {
    /// A blank form; new products need a category to start from.
    pub fn create(default_category_id: Option<i64>) -> Result<Self, Error> {
        let category_id = default_category_id
            .ok_or_else(|| Error::invalid_input("a default category id is required in create mode"))?;
        Ok(Self::with_values(FormMode::Create, ProductFormValues::new_in(category_id)))
    }

    /// A form pre-filled from an existing product
    pub fn edit(product: &Product) -> Self {
        Self::with_values(
            FormMode::Edit {
                product_id: product.id,
            },
            ProductFormValues::from(product),
        )
    }

    fn with_values(mode: FormMode, values: ProductFormValues) -> Self {
        let mut form = Self {
            mode,
            values,
            touched: HashSet::new(),
            errors: FormErrors::new(),
        };
        form.revalidate();
        form
    }

    fn revalidate(&mut self) {
        self.errors = match validate_product(&self.values) {
            Ok(_) => FormErrors::new(),
            Err(errors) => errors,
        };
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn values(&self) -> &ProductFormValues {
        &self.values
    }

    /// Every current error, touched or not
    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn is_touched(&self, field: FormField) -> bool {
        self.touched.contains(&field)
    }

    /// The error to display next to `field`
    pub fn visible_error(&self, field: FormField) -> Option<&str> {
        if self.is_touched(field) {
            self.errors.get(&field.path())
        } else {
            None
        }
    }

    pub fn blur(&mut self, field: FormField) {
        self.touched.insert(field);
        self.revalidate();
    }

    pub fn set_name(&mut self, name: &str) {
        self.values.name = name.to_string();
        self.revalidate();
    }

    /// Returns false in edit mode, where the category is locked.
    pub fn set_category_id(&mut self, category_id: Option<i64>) -> bool {
        if let FormMode::Edit { product_id } = self.mode {
            debug!(product_id, "category change ignored while editing");
            return false;
        }
        self.values.category_id = category_id;
        self.revalidate();
        true
    }

    pub fn set_status(&mut self, status: &str) {
        self.values.status = Some(status.to_string());
        self.revalidate();
    }

    pub fn set_units(&mut self, units: Option<f64>) {
        self.values.units = units;
        self.revalidate();
    }

    fn attribute_mut(&mut self, index: usize) -> Option<&mut AttributeEntry> {
        self.values.attributes.get_mut(index)
    }

    pub fn set_attribute_code(&mut self, index: usize, code: &str) -> bool {
        let Some(entry) = self.attribute_mut(index) else {
            return false;
        };
        entry.code = code.to_string();
        self.revalidate();
        true
    }

    pub fn set_attribute_type(&mut self, index: usize, kind: &str) -> bool {
        let Some(entry) = self.attribute_mut(index) else {
            return false;
        };
        entry.kind = kind.to_string();
        self.revalidate();
        true
    }

    pub fn set_attribute_value(&mut self, index: usize, value: Value) -> bool {
        let Some(entry) = self.attribute_mut(index) else {
            return false;
        };
        entry.value = value;
        self.revalidate();
        true
    }

    /// Appends `{code: "", type: "string", value: ""}`
    pub fn add_attribute(&mut self) -> usize {
        self.values.attributes.push(AttributeEntry::blank());
        self.revalidate();
        self.values.attributes.len() - 1
    }

    /// Removes an entry; touched state of later entries shifts down with them.
    pub fn remove_attribute(&mut self, index: usize) -> bool {
        if index >= self.values.attributes.len() {
            return false;
        }
        self.values.attributes.remove(index);
        self.touched = self
            .touched
            .drain()
            .filter_map(|field| match field {
                FormField::Attribute(i, _) if i == index => None,
                FormField::Attribute(i, part) if i > index => Some(FormField::Attribute(i - 1, part)),
                other => Some(other),
            })
            .collect();
        self.revalidate();
        true
    }

    fn touch_all(&mut self) {
        self.touched
            .extend([FormField::Name, FormField::CategoryId, FormField::Status, FormField::Units]);
        for index in 0..self.values.attributes.len() {
            for part in [AttributeField::Code, AttributeField::Type, AttributeField::Value] {
                self.touched.insert(FormField::Attribute(index, part));
            }
        }
    }

    /// Touches every field and hands the typed draft to `on_submit` only
    /// when all rules pass.
    pub fn submit<F, R>(&mut self, on_submit: F) -> Result<R, FormErrors>
    where
        F: FnOnce(ProductDraft) -> R,
    {
        self.touch_all();
        match validate_product(&self.values) {
            Ok(draft) => {
                self.errors = FormErrors::new();
                Ok(on_submit(draft))
            }
            Err(errors) => {
                debug!(count = errors.len(), "product form submission blocked");
                self.errors = errors.clone();
                Err(errors)
            }
        }
    }
}
