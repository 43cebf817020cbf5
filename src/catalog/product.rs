//! Product records, typed attributes and write payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;
use validator::{Validate, ValidationError};

/// Availability of a product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    Active,
    Inactive,
}

impl ProductStatus {
    pub const ALL: [ProductStatus; 2] = [ProductStatus::Active, ProductStatus::Inactive];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Active => "active",
            ProductStatus::Inactive => "inactive",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == raw)
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The discriminant of an attribute entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeType {
    Number,
    Text,
    Url,
    Tags,
    Boolean,
}

impl AttributeType {
    pub const ALL: [AttributeType; 5] = [
        AttributeType::Number,
        AttributeType::Text,
        AttributeType::Url,
        AttributeType::Tags,
        AttributeType::Boolean,
    ];

    /// Canonical wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeType::Number => "number",
            AttributeType::Text => "text",
            AttributeType::Url => "url",
            AttributeType::Tags => "tags",
            AttributeType::Boolean => "boolean",
        }
    }

    /// Accepts the canonical names plus the form's `string` and `array`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "number" => Some(AttributeType::Number),
            "text" | "string" => Some(AttributeType::Text),
            "url" => Some(AttributeType::Url),
            "tags" | "array" => Some(AttributeType::Tags),
            "boolean" => Some(AttributeType::Boolean),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An attribute value whose shape matches its type
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeData {
    Number(f64),
    Text(String),
    Url(String),
    Tags(Vec<String>),
    Boolean(bool),
}

impl AttributeData {
    pub fn kind(&self) -> AttributeType {
        match self {
            AttributeData::Number(_) => AttributeType::Number,
            AttributeData::Text(_) => AttributeType::Text,
            AttributeData::Url(_) => AttributeType::Url,
            AttributeData::Tags(_) => AttributeType::Tags,
            AttributeData::Boolean(_) => AttributeType::Boolean,
        }
    }

    /// Checks `value` against the shape required by `kind`, casting the
    /// string forms a text input produces ("12", "true").
    pub fn coerce(kind: AttributeType, value: &Value) -> Result<Self, &'static str> {
        match kind {
            AttributeType::Text | AttributeType::Url => match value {
                Value::String(s) if !s.is_empty() => Ok(match kind {
                    AttributeType::Url => AttributeData::Url(s.clone()),
                    _ => AttributeData::Text(s.clone()),
                }),
                _ => Err("Value must be a string"),
            },
            AttributeType::Number => match value {
                Value::Null => Err("Value is required"),
                Value::Number(n) => n.as_f64().map(AttributeData::Number).ok_or("Value must be a number"),
                Value::String(s) => s
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|n| n.is_finite())
                    .map(AttributeData::Number)
                    .ok_or("Value must be a number"),
                _ => Err("Value must be a number"),
            },
            AttributeType::Boolean => match value {
                Value::Null => Err("Value is required"),
                Value::Bool(b) => Ok(AttributeData::Boolean(*b)),
                Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                    "true" | "1" => Ok(AttributeData::Boolean(true)),
                    "false" | "0" => Ok(AttributeData::Boolean(false)),
                    _ => Err("Value must be a boolean"),
                },
                _ => Err("Value must be a boolean"),
            },
            AttributeType::Tags => match value {
                Value::Null => Err("Value is required"),
                Value::Array(items) => items
                    .iter()
                    .map(|item| item.as_str().map(str::to_string))
                    .collect::<Option<Vec<_>>>()
                    .map(AttributeData::Tags)
                    .ok_or("Value must be an array of strings"),
                _ => Err("Value must be an array of strings"),
            },
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            AttributeData::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            AttributeData::Text(s) | AttributeData::Url(s) => Value::String(s.clone()),
            AttributeData::Tags(tags) => Value::Array(tags.iter().cloned().map(Value::String).collect()),
            AttributeData::Boolean(b) => Value::Bool(*b),
        }
    }
}

impl fmt::Display for AttributeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeData::Number(n) => write!(f, "{}", n),
            AttributeData::Text(s) | AttributeData::Url(s) => f.write_str(s),
            AttributeData::Tags(tags) => f.write_str(&tags.join(", ")),
            AttributeData::Boolean(b) => write!(f, "{}", b),
        }
    }
}

/// An untyped `{code, type, value}` entry, as edited in the form and as
/// carried on the wire.
///
/// Validating an entry checks the code, the type name and, once the type is
/// known, that the value has the shape the type requires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "value_matches_type", skip_on_field_errors = false))]
pub struct AttributeEntry {
    #[serde(default)]
    #[validate(length(min = 1, message = "Attribute code is required"))]
    pub code: String,
    #[serde(rename = "type", default)]
    #[validate(
        length(min = 1, message = "Attribute type is required"),
        custom(function = "known_attribute_type")
    )]
    pub kind: String,
    #[serde(default)]
    pub value: Value,
}

fn rule_error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

fn known_attribute_type(kind: &str) -> Result<(), ValidationError> {
    if kind.is_empty() || AttributeType::parse(kind).is_some() {
        return Ok(());
    }
    Err(rule_error(
        "attribute_type",
        "Attribute type must be one of: number, text, url, tags, boolean",
    ))
}

/// Without a known type there is no value rule to apply.
fn value_matches_type(entry: &AttributeEntry) -> Result<(), ValidationError> {
    match AttributeType::parse(&entry.kind) {
        Some(kind) => AttributeData::coerce(kind, &entry.value)
            .map(|_| ())
            .map_err(|message| rule_error("attribute_value", message)),
        None => Ok(()),
    }
}

impl AttributeEntry {
    /// A blank entry as added by the form
    pub fn blank() -> Self {
        Self {
            code: String::new(),
            kind: "string".to_string(),
            value: Value::String(String::new()),
        }
    }

    /// The typed attribute, when the type is known and the value fits it
    pub fn typed(&self) -> Option<AttributeValue> {
        AttributeValue::try_from(self.clone()).ok()
    }

    /// The value as shown in lists: tags joined, strings unquoted.
    pub fn display_value(&self) -> String {
        fn plain(value: &Value) -> String {
            match value {
                Value::Null => String::new(),
                Value::String(s) => s.clone(),
                other => other.to_string(),
            }
        }
        match &self.value {
            Value::Array(items) => items.iter().map(plain).collect::<Vec<_>>().join(", "),
            other => plain(other),
        }
    }
}

/// A typed key/value pair attached to a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AttributeEntry", into = "AttributeEntry")]
pub struct AttributeValue {
    pub code: String,
    pub data: AttributeData,
}

impl AttributeValue {
    pub fn new(code: &str, data: AttributeData) -> Self {
        Self {
            code: code.to_string(),
            data,
        }
    }

    pub fn kind(&self) -> AttributeType {
        self.data.kind()
    }
}

impl TryFrom<AttributeEntry> for AttributeValue {
    type Error = String;

    fn try_from(entry: AttributeEntry) -> Result<Self, Self::Error> {
        let kind = AttributeType::parse(&entry.kind)
            .ok_or_else(|| format!("unknown attribute type: {}", entry.kind))?;
        let data = AttributeData::coerce(kind, &entry.value).map_err(|e| format!("{} ({})", e, entry.code))?;
        Ok(Self {
            code: entry.code,
            data,
        })
    }
}

impl From<AttributeValue> for AttributeEntry {
    fn from(attr: AttributeValue) -> Self {
        Self {
            code: attr.code,
            kind: attr.data.kind().as_str().to_string(),
            value: attr.data.to_value(),
        }
    }
}

/// A product as served by the backend.
///
/// Attributes are kept as served. One entry whose value does not fit its
/// type must not make the rest of a page unreadable; use
/// [`AttributeEntry::typed`] where the typed form is needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "snake_case", deserialize = "camelCase"))]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub category_id: i64,
    #[serde(default)]
    pub attributes: Vec<AttributeEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status: ProductStatus,
    pub units: f64,
}

/// A validated product submission
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductDraft {
    pub name: String,
    pub category_id: i64,
    pub status: ProductStatus,
    pub units: f64,
    pub attributes: Vec<AttributeValue>,
}

/// Request body for create and update; timestamps are stamped by the
/// client at submission time.
#[derive(Debug, Clone, Serialize)]
pub struct ProductWrite<'a> {
    #[serde(flatten)]
    pub draft: &'a ProductDraft,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> ProductWrite<'a> {
    pub fn create(draft: &'a ProductDraft, now: DateTime<Utc>) -> Self {
        Self {
            draft,
            created_at: Some(now),
            updated_at: now,
        }
    }

    pub fn update(draft: &'a ProductDraft, now: DateTime<Utc>) -> Self {
        Self {
            draft,
            created_at: None,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn attribute_type_accepts_form_aliases() {
        assert_eq!(AttributeType::parse("string"), Some(AttributeType::Text));
        assert_eq!(AttributeType::parse("array"), Some(AttributeType::Tags));
        assert_eq!(AttributeType::parse("url"), Some(AttributeType::Url));
        assert_eq!(AttributeType::parse("date"), None);
    }

    #[test]
    fn coerce_checks_shape_per_type() {
        assert_eq!(
            AttributeData::coerce(AttributeType::Number, &json!(12)),
            Ok(AttributeData::Number(12.0))
        );
        assert_eq!(
            AttributeData::coerce(AttributeType::Number, &json!(" 3.5 ")),
            Ok(AttributeData::Number(3.5))
        );
        assert_eq!(
            AttributeData::coerce(AttributeType::Number, &json!("abc")),
            Err("Value must be a number")
        );
        assert_eq!(
            AttributeData::coerce(AttributeType::Tags, &json!("red")),
            Err("Value must be an array of strings")
        );
        assert_eq!(
            AttributeData::coerce(AttributeType::Tags, &json!(["red", 1])),
            Err("Value must be an array of strings")
        );
        assert_eq!(
            AttributeData::coerce(AttributeType::Boolean, &json!("TRUE")),
            Ok(AttributeData::Boolean(true))
        );
        assert_eq!(
            AttributeData::coerce(AttributeType::Text, &json!("")),
            Err("Value must be a string")
        );
        assert_eq!(
            AttributeData::coerce(AttributeType::Boolean, &Value::Null),
            Err("Value is required")
        );
    }

    #[test]
    fn product_deserializes_from_camel_case() {
        let product: Product = serde_json::from_value(json!({
            "id": 10,
            "name": "iPhone",
            "categoryId": 3,
            "attributes": [
                { "code": "color", "type": "text", "value": "black" },
                { "code": "tags", "type": "tags", "value": ["new", "sale"] },
                { "code": "weight", "type": "number", "value": 0.2 }
            ],
            "createdAt": "2024-01-01T10:00:00Z",
            "updatedAt": "2024-02-01T10:00:00Z",
            "status": "active",
            "units": 4
        }))
        .unwrap();

        assert_eq!(product.category_id, 3);
        assert_eq!(product.attributes.len(), 3);
        assert_eq!(
            product.attributes[1].typed().map(|a| a.data),
            Some(AttributeData::Tags(vec!["new".into(), "sale".into()]))
        );
        assert_eq!(product.units, 4.0);
    }

    #[test]
    fn product_with_malformed_attribute_still_decodes() {
        let product: Product = serde_json::from_value(json!({
            "id": 11,
            "name": "Lamp",
            "categoryId": 3,
            "attributes": [
                { "code": "weight", "type": "number", "value": [1] },
                { "code": "lit", "type": "boolean", "value": true },
                { "code": "glow" }
            ],
            "createdAt": "2024-01-01T10:00:00Z",
            "updatedAt": "2024-02-01T10:00:00Z",
            "status": "inactive",
            "units": 0
        }))
        .unwrap();

        assert_eq!(product.attributes.len(), 3);
        assert!(product.attributes[0].typed().is_none());
        assert_eq!(product.attributes[1].typed().map(|a| a.data), Some(AttributeData::Boolean(true)));
        assert_eq!(product.attributes[2].kind, "");
        assert_eq!(product.attributes[2].value, Value::Null);
    }

    #[test]
    fn entry_rules() {
        let good = AttributeEntry {
            code: "weight".into(),
            kind: "number".into(),
            value: json!("12"),
        };
        assert!(good.validate().is_ok());

        let bad = AttributeEntry {
            code: String::new(),
            kind: "tags".into(),
            value: json!("red"),
        };
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        assert_eq!(
            fields["code"][0].message.as_deref(),
            Some("Attribute code is required")
        );
        assert_eq!(
            fields["__all__"][0].message.as_deref(),
            Some("Value must be an array of strings")
        );

        let unknown = AttributeEntry {
            code: "when".into(),
            kind: "date".into(),
            value: json!("2024"),
        };
        let errors = unknown.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("kind"));
        assert!(!errors.field_errors().contains_key("__all__"));
    }

    #[test]
    fn display_value_renders_plain_text() {
        let entry = |value: Value| AttributeEntry {
            code: "c".into(),
            kind: "text".into(),
            value,
        };
        assert_eq!(entry(json!(["black", "white"])).display_value(), "black, white");
        assert_eq!(entry(json!("steel")).display_value(), "steel");
        assert_eq!(entry(json!(180)).display_value(), "180");
        assert_eq!(entry(json!(true)).display_value(), "true");
        assert_eq!(entry(Value::Null).display_value(), "");
    }

    #[test]
    fn mismatched_attribute_fails_to_deserialize() {
        let result: Result<AttributeValue, _> =
            serde_json::from_value(json!({ "code": "n", "type": "number", "value": [1] }));
        assert!(result.is_err());
    }

    #[test]
    fn write_payload_is_snake_case_with_timestamps() {
        let draft = ProductDraft {
            name: "Lamp".into(),
            category_id: 5,
            status: ProductStatus::Inactive,
            units: 0.0,
            attributes: vec![AttributeValue::new("lit", AttributeData::Boolean(true))],
        };
        let now = DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z").unwrap().with_timezone(&Utc);

        let created = serde_json::to_value(ProductWrite::create(&draft, now)).unwrap();
        assert_eq!(created["category_id"], json!(5));
        assert_eq!(created["status"], json!("inactive"));
        assert_eq!(created["attributes"][0], json!({ "code": "lit", "type": "boolean", "value": true }));
        assert!(created.get("created_at").is_some());

        let updated = serde_json::to_value(ProductWrite::update(&draft, now)).unwrap();
        assert!(updated.get("created_at").is_none());
        assert!(updated.get("updated_at").is_some());
    }
}
