//! Stored documents and their fields.

use crate::compute::tier::BoxId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Pseudo-field that matches a document's id in term filters.
pub const ID_FIELD: &str = "id";

/// Value of a single document field.
///
/// `Keyword` and `Box` values are indexed and can be matched by filters;
/// `Text` and `Float` values are only stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Keyword(String),
    Box(BoxId),
    Text(String),
    Float(f64),
}

impl FieldValue {
    pub fn is_indexed(&self) -> bool {
        matches!(self, FieldValue::Keyword(_) | FieldValue::Box(_))
    }
}

/// A keyed record in the index store.
///
/// # Examples
///
/// ```
/// use tiergrid::storage::Document;
///
/// let doc = Document::new("42")
///     .with_keyword("kind", "city")
///     .with_text("json", "{}")
///     .with_float("lat", -6.2);
///
/// assert_eq!(doc.keyword("kind"), Some("city"));
/// assert_eq!(doc.float("lat"), Some(-6.2));
/// assert_eq!(doc.keyword("json"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    id: String,
    fields: BTreeMap<String, FieldValue>,
}

impl Document {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Set a field, replacing any previous value under the same name.
    pub fn set(&mut self, name: impl Into<String>, value: FieldValue) -> Option<FieldValue> {
        self.fields.insert(name.into(), value)
    }

    pub fn with_keyword(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, FieldValue::Keyword(value.into()));
        self
    }

    pub fn with_box(mut self, name: impl Into<String>, id: BoxId) -> Self {
        self.set(name, FieldValue::Box(id));
        self
    }

    pub fn with_text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, FieldValue::Text(value.into()));
        self
    }

    pub fn with_float(mut self, name: impl Into<String>, value: f64) -> Self {
        self.set(name, FieldValue::Float(value));
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn keyword(&self, name: &str) -> Option<&str> {
        match self.fields.get(name) {
            Some(FieldValue::Keyword(value)) => Some(value),
            _ => None,
        }
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.fields.get(name) {
            Some(FieldValue::Text(value)) => Some(value),
            _ => None,
        }
    }

    pub fn float(&self, name: &str) -> Option<f64> {
        match self.fields.get(name) {
            Some(FieldValue::Float(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn box_id(&self, name: &str) -> Option<BoxId> {
        match self.fields.get(name) {
            Some(FieldValue::Box(id)) => Some(*id),
            _ => None,
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn indexed_fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields().filter(|(_, value)| value.is_indexed())
    }
}
