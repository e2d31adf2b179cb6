//! In-memory object store
//!
//! Objects are kept in generic form, grouped by resource identity and keyed by
//! namespace and name. All access goes through a single `RwLock`: reads share
//! it, every mutation (including the read-modify-write of a patch) holds it
//! exclusively.

use crate::identity::ResourceIdentity;
use crate::object::{GenericObject, ObjectKey};
use crate::patch::{apply_patch, PatchType};
use crate::utils::{
    ensure_metadata, increment_resource_version, should_be_deleted, SEED_RESOURCE_VERSION,
};
use crate::{Error, Result};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, trace};

/// Objects of one resource, in insertion order
#[derive(Debug, Default)]
struct Collection {
    order: Vec<ObjectKey>,
    objects: HashMap<ObjectKey, GenericObject>,
}

impl Collection {
    fn get(&self, key: &ObjectKey) -> Option<&GenericObject> {
        self.objects.get(key)
    }

    fn insert(&mut self, key: ObjectKey, object: GenericObject) {
        if self.objects.insert(key.clone(), object).is_none() {
            self.order.push(key);
        }
    }

    fn remove(&mut self, key: &ObjectKey) -> Option<GenericObject> {
        let removed = self.objects.remove(key)?;
        self.order.retain(|k| k != key);
        Some(removed)
    }

    fn iter(&self) -> impl Iterator<Item = (&ObjectKey, &GenericObject)> {
        self.order
            .iter()
            .filter_map(|key| self.objects.get(key).map(|object| (key, object)))
    }
}

type ObjectStorage = HashMap<ResourceIdentity, Collection>;

pub struct ObjectTracker {
    objects: RwLock<ObjectStorage>,
}

impl ObjectTracker {
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, ObjectStorage> {
        self.objects.read().expect("ObjectTracker lock poisoned")
    }

    fn write(&self) -> RwLockWriteGuard<'_, ObjectStorage> {
        self.objects.write().expect("ObjectTracker lock poisoned")
    }

    /// Seed an object, replacing any object stored under the same key
    pub fn add(&self, resource: &ResourceIdentity, mut object: GenericObject) -> Result<GenericObject> {
        trace!("Adding object: {} {}", resource, object.key());

        let mut meta = object.metadata()?;
        let key = key_of(&meta)?;

        if should_be_deleted(&meta) {
            return Err(Error::InvalidRequest(format!(
                "refusing to add object {} with metadata.deletionTimestamp but no finalizers",
                key
            )));
        }

        if meta.resource_version.as_ref().is_none_or(|rv| rv.is_empty()) {
            meta.resource_version = Some(SEED_RESOURCE_VERSION.to_string());
        }
        ensure_metadata(&mut meta)?;
        object.set_metadata(&meta)?;

        self.write()
            .entry(resource.clone())
            .or_default()
            .insert(key.clone(), object.clone());

        debug!("Added object: {} {}", resource, key);
        Ok(object)
    }

    pub fn create(
        &self,
        resource: &ResourceIdentity,
        mut object: GenericObject,
    ) -> Result<GenericObject> {
        trace!("Creating object: {} {}", resource, object.key());

        let mut meta = object.metadata()?;
        let key = key_of(&meta)?;

        if meta
            .resource_version
            .as_ref()
            .is_some_and(|rv| !rv.is_empty())
        {
            return Err(Error::InvalidRequest(
                "resourceVersion can not be set for Create requests".to_string(),
            ));
        }

        let mut objects = self.write();
        let collection = objects.entry(resource.clone()).or_default();
        if collection.get(&key).is_some() {
            return Err(Error::AlreadyExists {
                resource: resource.resource.clone(),
                name: key.name,
                namespace: key.namespace,
            });
        }

        meta.resource_version = Some("1".to_string());
        meta.deletion_timestamp = None;
        ensure_metadata(&mut meta)?;
        object.set_metadata(&meta)?;

        collection.insert(key.clone(), object.clone());

        debug!("Created object: {} {}", resource, key);
        Ok(object)
    }

    pub fn get(&self, resource: &ResourceIdentity, key: &ObjectKey) -> Result<GenericObject> {
        trace!("Getting object: {} {}", resource, key);

        self.read()
            .get(resource)
            .and_then(|collection| collection.get(key))
            .cloned()
            .ok_or_else(|| not_found(resource, key))
    }

    /// Objects of a resource in one namespace, or in all namespaces for `""`
    pub fn list(&self, resource: &ResourceIdentity, namespace: &str) -> Result<Vec<GenericObject>> {
        trace!("Listing objects: {} in namespace: {:?}", resource, namespace);

        let objects = self.read();
        let Some(collection) = objects.get(resource) else {
            return Ok(Vec::new());
        };

        Ok(collection
            .iter()
            .filter(|(key, _)| namespace.is_empty() || key.namespace == namespace)
            .map(|(_, object)| object.clone())
            .collect())
    }

    /// Replace a stored object
    ///
    /// With a subresource, only the top-level field of that name is taken from
    /// `object`; everything else keeps its stored value.
    pub fn update(
        &self,
        resource: &ResourceIdentity,
        object: GenericObject,
        subresource: Option<&str>,
    ) -> Result<GenericObject> {
        trace!(
            "Updating object: {} {} (subresource: {:?})",
            resource,
            object.key(),
            subresource
        );

        let meta = object.metadata()?;
        let key = key_of(&meta)?;

        let mut objects = self.write();
        let collection = objects
            .get_mut(resource)
            .ok_or_else(|| not_found(resource, &key))?;
        let existing = collection
            .get(&key)
            .cloned()
            .ok_or_else(|| not_found(resource, &key))?;
        let existing_meta = existing.metadata()?;

        if let (Some(provided_rv), Some(current_rv)) =
            (&meta.resource_version, &existing_meta.resource_version)
        {
            if !provided_rv.is_empty() && provided_rv != current_rv {
                return Err(Error::Conflict(format!(
                    "Resource version mismatch: expected {}, got {}",
                    current_rv, provided_rv
                )));
            }
        }

        let object = match subresource {
            Some(field) => with_field_from(existing, &object, field),
            None => object,
        };

        let (object, new_meta) = next_revision(object, &existing_meta)?;
        if new_meta.deletion_timestamp != existing_meta.deletion_timestamp {
            return Err(Error::InvalidRequest(
                "metadata.deletionTimestamp field is immutable".to_string(),
            ));
        }

        if should_be_deleted(&new_meta) {
            debug!("Finalizers cleared, deleting object: {} {}", resource, key);
            collection.remove(&key);
            return Ok(object);
        }

        collection.insert(key.clone(), object.clone());

        debug!("Updated object: {} {}", resource, key);
        Ok(object)
    }

    pub fn delete(&self, resource: &ResourceIdentity, key: &ObjectKey) -> Result<GenericObject> {
        trace!("Deleting object: {} {}", resource, key);

        let removed = self
            .write()
            .get_mut(resource)
            .and_then(|collection| collection.remove(key))
            .ok_or_else(|| not_found(resource, key))?;

        debug!("Deleted object: {} {}", resource, key);
        Ok(removed)
    }

    /// Apply patch bytes to a stored object and store the result
    pub fn patch(
        &self,
        resource: &ResourceIdentity,
        key: &ObjectKey,
        patch_type: PatchType,
        data: &[u8],
        subresource: Option<&str>,
    ) -> Result<GenericObject> {
        trace!(
            "Patching object: {} {} with {} (subresource: {:?})",
            resource,
            key,
            patch_type,
            subresource
        );

        let mut objects = self.write();
        let collection = objects
            .get_mut(resource)
            .ok_or_else(|| not_found(resource, key))?;
        let existing = collection
            .get(key)
            .cloned()
            .ok_or_else(|| not_found(resource, key))?;
        let existing_meta = existing.metadata()?;

        let mut document = existing.clone().into_value();
        apply_patch(&mut document, patch_type, data)?;
        let patched = reparse(&document)?;

        if patched.descriptor()? != existing.descriptor()? {
            return Err(Error::InvalidRequest(
                "apiVersion and kind can not be changed by a patch".to_string(),
            ));
        }
        if patched.key() != *key {
            return Err(Error::InvalidRequest(
                "metadata.name and metadata.namespace can not be changed by a patch".to_string(),
            ));
        }

        let patched = match subresource {
            Some(field) => with_field_from(existing, &patched, field),
            None => patched,
        };

        let (patched, new_meta) = next_revision(patched, &existing_meta)?;
        if new_meta.deletion_timestamp != existing_meta.deletion_timestamp {
            return Err(Error::InvalidRequest(
                "metadata.deletionTimestamp field is immutable".to_string(),
            ));
        }

        if should_be_deleted(&new_meta) {
            debug!("Finalizers cleared, deleting object: {} {}", resource, key);
            collection.remove(key);
            return Ok(patched);
        }

        collection.insert(key.clone(), patched.clone());

        debug!("Patched object: {} {}", resource, key);
        Ok(patched)
    }
}

impl Default for ObjectTracker {
    fn default() -> Self {
        Self::new()
    }
}

fn not_found(resource: &ResourceIdentity, key: &ObjectKey) -> Error {
    Error::NotFound {
        resource: resource.resource.clone(),
        name: key.name.clone(),
        namespace: key.namespace.clone(),
    }
}

fn key_of(meta: &ObjectMeta) -> Result<ObjectKey> {
    let name = meta
        .name
        .clone()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| Error::InvalidRequest("Object name is required".to_string()))?;
    Ok(ObjectKey::new(meta.namespace.clone().unwrap_or_default(), name))
}

/// `base` with its `field` replaced by the one in `source` (or removed)
fn with_field_from(mut base: GenericObject, source: &GenericObject, field: &str) -> GenericObject {
    match source.get(field) {
        Some(value) => {
            base.insert(field, value.clone());
        }
        None => {
            base.remove(field);
        }
    }
    base
}

/// Bump the resource version, keeping the server-owned identity fields
fn next_revision(
    mut object: GenericObject,
    existing_meta: &ObjectMeta,
) -> Result<(GenericObject, ObjectMeta)> {
    let mut meta = object.metadata()?;
    meta.resource_version = Some(increment_resource_version(
        existing_meta.resource_version.as_deref().unwrap_or(""),
    )?);
    meta.uid = existing_meta.uid.clone();
    meta.creation_timestamp = existing_meta.creation_timestamp.clone();
    object.set_metadata(&meta)?;
    Ok((object, meta))
}

/// Round-trip a patched document through bytes back into a generic object
fn reparse(document: &serde_json::Value) -> Result<GenericObject> {
    let data = serde_json::to_vec(document)
        .map_err(|e| Error::Conversion(format!("failed to encode patched object: {}", e)))?;
    let object: GenericObject = serde_json::from_slice(&data)
        .map_err(|e| Error::Conversion(format!("patched object is not an object: {}", e)))?;
    object
        .descriptor()
        .map_err(|e| Error::Conversion(format!("patched object is invalid: {}", e)))?;
    Ok(object)
}
