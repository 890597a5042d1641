//! JSON tree wrapper stored in a single database column.

use std::ops::{Deref, DerefMut};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A JSON tree persisted in one column.
///
/// Wraps [`serde_json::Value`]. Equality is tree equality and `Clone` is a
/// deep copy, since the value owns its tree. Nullable columns are
/// `Option<JsonDocument>` at the query site; the codec never sees SQL NULL.
///
/// Derefs to `Value`, so trees can be read and mutated in place:
///
/// ```rust
/// use dbkit_json::JsonDocument;
/// use serde_json::json;
///
/// let mut doc = JsonDocument::object();
/// doc["parser"] = json!("serde");
/// assert_eq!(doc["parser"], json!("serde"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JsonDocument(Value);

impl JsonDocument {
    /// Wrap an existing tree.
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Empty object root, for trees built up field by field.
    pub fn object() -> Self {
        Self(Value::Object(serde_json::Map::new()))
    }

    /// Serialize any `Serialize` type into a document.
    pub fn from_serialize<T: Serialize>(value: &T) -> serde_json::Result<Self> {
        Ok(Self(serde_json::to_value(value)?))
    }

    /// Deserialize the tree into a typed value.
    pub fn to_typed<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_value(self.0.clone())
    }

    /// Borrow the tree.
    pub fn value(&self) -> &Value {
        &self.0
    }

    /// Unwrap into the tree.
    pub fn into_inner(self) -> Value {
        self.0
    }
}

impl Deref for JsonDocument {
    type Target = Value;

    fn deref(&self) -> &Value {
        &self.0
    }
}

impl DerefMut for JsonDocument {
    fn deref_mut(&mut self) -> &mut Value {
        &mut self.0
    }
}

impl From<Value> for JsonDocument {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<JsonDocument> for Value {
    fn from(document: JsonDocument) -> Self {
        document.0
    }
}
