//! Row identity, field values and the JSON-backed record type.

use crate::{error::Result, Error};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::fmt;

/// Stable identifier of a row.
///
/// Selection and change tracking are keyed by this value, never by position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowId {
    Int(i64),
    Str(String),
}

impl RowId {
    /// Read an identifier out of a JSON value.
    pub fn from_json(field: &str, value: &Value) -> Result<Self> {
        match value {
            Value::Null => Err(Error::MissingIdentifier(field.to_string())),
            Value::String(s) => Ok(RowId::Str(s.clone())),
            Value::Number(n) => n.as_i64().map(RowId::Int).ok_or_else(|| {
                Error::InvalidIdentifier {
                    field: field.to_string(),
                    got: json_type_name(value).to_string(),
                }
            }),
            other => Err(Error::InvalidIdentifier {
                field: field.to_string(),
                got: json_type_name(other).to_string(),
            }),
        }
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowId::Int(i) => write!(f, "{}", i),
            RowId::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RowId {
    fn from(value: i64) -> Self {
        RowId::Int(value)
    }
}

impl From<&str> for RowId {
    fn from(value: &str) -> Self {
        RowId::Str(value.to_string())
    }
}

impl From<String> for RowId {
    fn from(value: String) -> Self {
        RowId::Str(value)
    }
}

/// A single cell value as seen by the filter and sort stages.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(Cow<'a, str>),
}

impl<'a> FieldValue<'a> {
    /// Borrow a JSON value as a field value.
    ///
    /// Arrays and objects have no scalar form and stringify to their JSON text.
    pub fn from_json(value: &'a Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Int(i),
                None => FieldValue::Float(n.as_f64().unwrap_or_default()),
            },
            Value::String(s) => FieldValue::Text(Cow::Borrowed(s)),
            nested => FieldValue::Text(Cow::Owned(nested.to_string())),
        }
    }

    /// Numeric view of the value, if it is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Int(i) => Some(*i as f64),
            FieldValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Stringified form. Null is the empty string.
    pub fn to_text(&self) -> Cow<'_, str> {
        match self {
            FieldValue::Null => Cow::Borrowed(""),
            FieldValue::Bool(b) => Cow::Owned(b.to_string()),
            FieldValue::Int(i) => Cow::Owned(i.to_string()),
            FieldValue::Float(f) => Cow::Owned(f.to_string()),
            FieldValue::Text(s) => Cow::Borrowed(s.as_ref()),
        }
    }
}

impl fmt::Display for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl From<&'static str> for FieldValue<'static> {
    fn from(value: &'static str) -> Self {
        FieldValue::Text(Cow::Borrowed(value))
    }
}

impl From<String> for FieldValue<'static> {
    fn from(value: String) -> Self {
        FieldValue::Text(Cow::Owned(value))
    }
}

impl From<i64> for FieldValue<'static> {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<f64> for FieldValue<'static> {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

/// A row the grid can derive a view over.
///
/// Hosts implement this for their own domain types, or use [`Record`].
pub trait Row {
    /// The row's stable identifier.
    fn id(&self) -> RowId;

    /// Look up a field by key. `None` means the field is absent.
    fn field(&self, key: &str) -> Option<FieldValue<'_>>;

    /// Stringified field value, with absent and null fields as "".
    fn text(&self, key: &str) -> String {
        self.field(key)
            .map(|v| v.to_text().into_owned())
            .unwrap_or_default()
    }
}

/// A record backed by a JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Identifier, copied out of the designated identifier field
    pub id: RowId,
    /// All fields, including the identifier field
    pub fields: Map<String, Value>,
}

impl Record {
    /// Create a record from an identifier and its fields.
    pub fn new(id: impl Into<RowId>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Build a record from a JSON object, taking the identifier from `id_field`.
    pub fn from_value(value: Value, id_field: &str) -> Result<Self> {
        let fields = match value {
            Value::Object(map) => map,
            other => {
                return Err(Error::InvalidPayload(format!(
                    "record must be an object, got {}",
                    json_type_name(&other)
                )))
            }
        };

        let id = fields
            .get(id_field)
            .ok_or_else(|| Error::MissingIdentifier(id_field.to_string()))
            .and_then(|v| RowId::from_json(id_field, v))?;

        Ok(Self { id, fields })
    }

    /// Build records from a JSON array of objects.
    pub fn many_from_value(value: Value, id_field: &str) -> Result<Vec<Self>> {
        match value {
            Value::Array(items) => items
                .into_iter()
                .map(|item| Self::from_value(item, id_field))
                .collect(),
            other => Err(Error::InvalidPayload(format!(
                "records must be an array, got {}",
                json_type_name(&other)
            ))),
        }
    }

    /// Parse records from a JSON array string.
    pub fn many_from_json(json: &str, id_field: &str) -> Result<Vec<Self>> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| Error::InvalidPayload(e.to_string()))?;
        Self::many_from_value(value, id_field)
    }

    /// Raw JSON value of a field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

impl Row for Record {
    fn id(&self) -> RowId {
        self.id.clone()
    }

    fn field(&self, key: &str) -> Option<FieldValue<'_>> {
        self.fields.get(key).map(FieldValue::from_json)
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "Null",
        Value::Bool(_) => "Bool",
        Value::Number(n) if n.is_i64() || n.is_u64() => "Int",
        Value::Number(_) => "Float",
        Value::String(_) => "String",
        Value::Array(_) => "Array",
        Value::Object(_) => "Object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_from_object() {
        let record = Record::from_value(
            json!({"id": 1, "name": "Ahmet Yılmaz", "email": "ahmet@example.com"}),
            "id",
        )
        .unwrap();

        assert_eq!(record.id, RowId::Int(1));
        assert_eq!(record.text("name"), "Ahmet Yılmaz");
        assert_eq!(record.text("id"), "1");
        assert_eq!(record.text("missing"), "");
    }

    #[test]
    fn record_with_string_id_field() {
        let record = Record::from_value(json!({"uuid": "c-17", "name": "Kahve"}), "uuid").unwrap();
        assert_eq!(record.id, RowId::from("c-17"));
    }

    #[test]
    fn record_missing_id() {
        let result = Record::from_value(json!({"name": "Ali"}), "id");
        assert!(matches!(result, Err(Error::MissingIdentifier(f)) if f == "id"));

        let result = Record::from_value(json!({"id": null, "name": "Ali"}), "id");
        assert!(matches!(result, Err(Error::MissingIdentifier(_))));
    }

    #[test]
    fn record_invalid_id() {
        let result = Record::from_value(json!({"id": true}), "id");
        assert!(
            matches!(result, Err(Error::InvalidIdentifier { field, got }) if field == "id" && got == "Bool")
        );

        let result = Record::from_value(json!({"id": 1.5}), "id");
        assert!(matches!(result, Err(Error::InvalidIdentifier { .. })));
    }

    #[test]
    fn record_not_an_object() {
        let result = Record::from_value(json!([1, 2]), "id");
        assert!(matches!(result, Err(Error::InvalidPayload(_))));
    }

    #[test]
    fn many_from_json() {
        let records =
            Record::many_from_json(r#"[{"id": 1, "name": "a"}, {"id": "x", "name": "b"}]"#, "id")
                .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].id, RowId::from("x"));

        assert!(Record::many_from_json("{}", "id").is_err());
        assert!(Record::many_from_json("not json", "id").is_err());
    }

    #[test]
    fn field_value_text() {
        assert_eq!(FieldValue::Null.to_text(), "");
        assert_eq!(FieldValue::Int(30).to_text(), "30");
        assert_eq!(FieldValue::Float(3.5).to_text(), "3.5");
        assert_eq!(FieldValue::Bool(true).to_text(), "true");

        let nested = json!({"a": [1, 2]});
        assert_eq!(FieldValue::from_json(&nested).to_text(), r#"{"a":[1,2]}"#);
    }

    #[test]
    fn field_value_numbers() {
        let big = json!(u64::MAX);
        assert!(matches!(FieldValue::from_json(&big), FieldValue::Float(_)));
        assert_eq!(FieldValue::Int(4).as_number(), Some(4.0));
        assert_eq!(FieldValue::from("4").as_number(), None);
    }

    #[test]
    fn row_id_ordering_and_display() {
        assert!(RowId::Int(2) < RowId::Int(10));
        assert_eq!(RowId::Int(7).to_string(), "7");
        assert_eq!(RowId::from("abc").to_string(), "abc");

        let json = serde_json::to_string(&vec![RowId::Int(1), RowId::from("a")]).unwrap();
        assert_eq!(json, r#"[1,"a"]"#);
    }
}
