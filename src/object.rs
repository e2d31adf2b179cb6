//! Generic (schema-less) objects and the typed <-> generic normalizer

use crate::codec;
use crate::scheme::{Scheme, TypeDescriptor};
use crate::{Error, Result};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ListMeta, ObjectMeta};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Namespace and name of an object within its resource collection
///
/// An empty namespace addresses a cluster-scoped object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey {
    pub namespace: String,
    pub name: String,
}

impl ObjectKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Key of a cluster-scoped object
    pub fn cluster(name: impl Into<String>) -> Self {
        Self::new("", name)
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}/{}", self.namespace, self.name)
        }
    }
}

/// Schema-less property bag holding every field of an object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenericObject(Map<String, Value>);

impl GenericObject {
    /// Object with only type and identity metadata set
    pub fn new(descriptor: &TypeDescriptor, key: &ObjectKey) -> Self {
        let mut metadata = Map::new();
        metadata.insert("name".to_string(), Value::String(key.name.clone()));
        if !key.namespace.is_empty() {
            metadata.insert(
                "namespace".to_string(),
                Value::String(key.namespace.clone()),
            );
        }

        let mut fields = Map::new();
        fields.insert(
            "apiVersion".to_string(),
            Value::String(descriptor.api_version()),
        );
        fields.insert("kind".to_string(), Value::String(descriptor.kind.clone()));
        fields.insert("metadata".to_string(), Value::Object(metadata));
        Self(fields)
    }

    /// Wrap a JSON value, which must be an object
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(Error::Conversion(format!(
                "expected a JSON object, got {}",
                json_type(&other)
            ))),
        }
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(field.into(), value)
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    pub fn api_version(&self) -> Option<&str> {
        self.0.get("apiVersion").and_then(Value::as_str)
    }

    pub fn kind(&self) -> Option<&str> {
        self.0.get("kind").and_then(Value::as_str)
    }

    /// Type descriptor carried by `apiVersion` and `kind`
    pub fn descriptor(&self) -> Result<TypeDescriptor> {
        let api_version = self
            .api_version()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::Conversion("Missing apiVersion".to_string()))?;
        let kind = self
            .kind()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::Conversion("Missing kind".to_string()))?;
        Ok(TypeDescriptor::from_api_version(api_version, kind))
    }

    fn metadata_field(&self, field: &str) -> Option<&str> {
        self.0
            .get("metadata")
            .and_then(|m| m.get(field))
            .and_then(Value::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.metadata_field("name")
    }

    pub fn namespace(&self) -> Option<&str> {
        self.metadata_field("namespace")
    }

    pub fn resource_version(&self) -> Option<&str> {
        self.metadata_field("resourceVersion")
    }

    /// Key built from `metadata.namespace` and `metadata.name`
    pub fn key(&self) -> ObjectKey {
        ObjectKey::new(
            self.namespace().unwrap_or_default(),
            self.name().unwrap_or_default(),
        )
    }

    /// Set `metadata.namespace`, removing it for an empty namespace
    pub fn set_namespace(&mut self, namespace: &str) {
        let metadata = self
            .0
            .entry("metadata")
            .or_insert_with(|| Value::Object(Map::new()));
        if let Some(metadata) = metadata.as_object_mut() {
            if namespace.is_empty() {
                metadata.remove("namespace");
            } else {
                metadata.insert(
                    "namespace".to_string(),
                    Value::String(namespace.to_string()),
                );
            }
        }
    }

    pub fn labels(&self) -> BTreeMap<String, String> {
        self.0
            .get("metadata")
            .and_then(|m| m.get("labels"))
            .and_then(Value::as_object)
            .map(|labels| {
                labels
                    .iter()
                    .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Typed view of `metadata`
    pub fn metadata(&self) -> Result<ObjectMeta> {
        let meta_value = self
            .0
            .get("metadata")
            .ok_or_else(|| Error::InvalidRequest("Object missing metadata field".to_string()))?;

        serde_json::from_value(meta_value.clone())
            .map_err(|e| Error::InvalidRequest(format!("Failed to parse metadata: {}", e)))
    }

    pub fn set_metadata(&mut self, meta: &ObjectMeta) -> Result<()> {
        self.0
            .insert("metadata".to_string(), serde_json::to_value(meta)?);
        Ok(())
    }
}

impl TryFrom<Value> for GenericObject {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_value(value)
    }
}

impl From<GenericObject> for Value {
    fn from(object: GenericObject) -> Self {
        object.into_value()
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Typed list of objects, registered as `<Kind>List`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectList<K> {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(default)]
    pub metadata: ListMeta,
    #[serde(default)]
    pub items: Vec<K>,
}

impl<K> ObjectList<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, K> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<K> Default for ObjectList<K> {
    fn default() -> Self {
        Self {
            api_version: String::new(),
            kind: String::new(),
            metadata: ListMeta::default(),
            items: Vec::new(),
        }
    }
}

/// Convert a typed object into its generic form
///
/// `apiVersion` and `kind` are filled in from the scheme when the typed object
/// does not serialize them.
pub fn to_generic<K>(scheme: &Scheme, obj: &K) -> Result<GenericObject>
where
    K: Serialize + 'static,
{
    let descriptor = scheme
        .descriptor_of::<K>()
        .map_err(|e| Error::Conversion(e.to_string()))?;
    let value = serde_json::to_value(obj)
        .map_err(|e| Error::Conversion(format!("failed to serialize {}: {}", descriptor, e)))?;
    let mut generic = GenericObject::from_value(value)?;

    if generic.api_version().is_none_or(str::is_empty) {
        generic.insert("apiVersion", Value::String(descriptor.api_version()));
    }
    if generic.kind().is_none_or(str::is_empty) {
        generic.insert("kind", Value::String(descriptor.kind));
    }

    Ok(generic)
}

/// Decode a generic object into `target` through the round-trip codec
///
/// Fields the target type does not declare are dropped.
pub fn from_generic<K>(scheme: &Scheme, generic: &GenericObject, target: &mut K) -> Result<()>
where
    K: DeserializeOwned + 'static,
{
    let bytes = codec::encode(generic)?;
    codec::decode_into(scheme, &bytes, target)
}
