//! Resource nodes and their property values.
//!
//! A resource is whatever a provider reports as a distinct entity: an
//! instance, a subnet, a user, a policy. It is identified by the pair
//! (type, id) and carries an open-ended property map.

use crate::error::{ResourceError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identity of a resource within a provider's namespace.
///
/// Two resources sharing an id but not a type are distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceKey {
    pub resource_type: String,
    pub id: String,
}

impl ResourceKey {
    pub fn new(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.resource_type, self.id)
    }
}

/// A provider-reported attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    String(String),
    Number(f64),
    Bool(bool),
    List(Vec<PropertyValue>),
}

impl PropertyValue {
    /// Converts a plain JSON value, as provider clients and fixtures emit them.
    ///
    /// Nulls and nested objects have no property representation and are
    /// rejected.
    pub fn from_json(property: &str, value: &serde_json::Value) -> Result<Self> {
        use serde_json::Value;

        match value {
            Value::String(s) => Ok(Self::String(s.clone())),
            Value::Bool(b) => Ok(Self::Bool(*b)),
            Value::Number(n) => n
                .as_f64()
                .map(Self::Number)
                .ok_or_else(|| ResourceError::UnsupportedValue {
                    property: property.to_string(),
                    kind: "number",
                }),
            Value::Array(items) => items
                .iter()
                .map(|item| Self::from_json(property, item))
                .collect::<Result<Vec<_>>>()
                .map(Self::List),
            Value::Null => Err(ResourceError::UnsupportedValue {
                property: property.to_string(),
                kind: "null",
            }),
            Value::Object(_) => Err(ResourceError::UnsupportedValue {
                property: property.to_string(),
                kind: "object",
            }),
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{}", s),
            Self::Number(n) => write!(f, "{}", n),
            Self::Bool(b) => write!(f, "{}", b),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<f64> for PropertyValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// A node in the resource graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Provider type name, e.g. "instance" or "subnet".
    pub resource_type: String,

    /// Provider identifier, unique per type.
    pub id: String,

    /// Provider-reported attributes, ordered by name.
    pub properties: BTreeMap<String, PropertyValue>,
}

impl Resource {
    /// Creates a resource with no properties.
    pub fn new(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.into(),
            properties: BTreeMap::new(),
        }
    }

    /// Builder-style property setter.
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Parses a plain JSON record: `{"type": ..., "id": ..., "properties": {...}}`.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let resource_type = value
            .get("type")
            .and_then(|v| v.as_str())
            .ok_or(ResourceError::MissingField("type"))?;
        let id = value
            .get("id")
            .and_then(|v| v.as_str())
            .ok_or(ResourceError::MissingField("id"))?;

        let mut resource = Self::new(resource_type, id);
        if let Some(props) = value.get("properties").and_then(|v| v.as_object()) {
            for (name, raw) in props {
                resource
                    .properties
                    .insert(name.clone(), PropertyValue::from_json(name, raw)?);
            }
        }

        Ok(resource)
    }

    pub fn key(&self) -> ResourceKey {
        ResourceKey::new(self.resource_type.clone(), self.id.clone())
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    /// Returns true if this resource has the given identity.
    pub fn is(&self, key: &ResourceKey) -> bool {
        self.resource_type == key.resource_type && self.id == key.id
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.resource_type, self.id)
    }
}
