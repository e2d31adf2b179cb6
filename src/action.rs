//! Actions: immutable records of requested operations

use crate::identity::ResourceIdentity;
use crate::object::GenericObject;
use crate::patch::PatchType;
use crate::scheme::TypeDescriptor;
use bytes::Bytes;
use kube::api::ListParams;
use std::fmt;

/// Operation verbs, named as reactors match them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    List,
    Create,
    Update,
    Delete,
    DeleteCollection,
    Patch,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "get",
            Verb::List => "list",
            Verb::Create => "create",
            Verb::Update => "update",
            Verb::Delete => "delete",
            Verb::DeleteCollection => "delete-collection",
            Verb::Patch => "patch",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verb-dependent payload of an action
#[derive(Debug, Clone)]
pub enum ActionPayload {
    None,
    Object(GenericObject),
    Patch { patch_type: PatchType, data: Bytes },
    /// Item kind to build the list from, plus the caller's list parameters
    List {
        kind: TypeDescriptor,
        params: ListParams,
    },
    DeleteCollection { params: ListParams },
}

/// One requested operation, as seen by reactors and the tracker
#[derive(Debug, Clone)]
pub struct Action {
    verb: Verb,
    resource: ResourceIdentity,
    namespace: String,
    name: String,
    subresource: Option<String>,
    payload: ActionPayload,
}

impl Action {
    fn new(
        verb: Verb,
        resource: ResourceIdentity,
        namespace: &str,
        name: &str,
        payload: ActionPayload,
    ) -> Self {
        Self {
            verb,
            resource,
            namespace: namespace.to_string(),
            name: name.to_string(),
            subresource: None,
            payload,
        }
    }

    pub fn get(resource: ResourceIdentity, namespace: &str, name: &str) -> Self {
        Self::new(Verb::Get, resource, namespace, name, ActionPayload::None)
    }

    pub fn list(
        resource: ResourceIdentity,
        kind: TypeDescriptor,
        namespace: &str,
        params: ListParams,
    ) -> Self {
        Self::new(
            Verb::List,
            resource,
            namespace,
            "",
            ActionPayload::List { kind, params },
        )
    }

    pub fn create(resource: ResourceIdentity, namespace: &str, object: GenericObject) -> Self {
        let name = object.name().unwrap_or_default().to_string();
        Self::new(
            Verb::Create,
            resource,
            namespace,
            &name,
            ActionPayload::Object(object),
        )
    }

    pub fn update(resource: ResourceIdentity, namespace: &str, object: GenericObject) -> Self {
        let name = object.name().unwrap_or_default().to_string();
        Self::new(
            Verb::Update,
            resource,
            namespace,
            &name,
            ActionPayload::Object(object),
        )
    }

    pub fn delete(resource: ResourceIdentity, namespace: &str, name: &str) -> Self {
        Self::new(Verb::Delete, resource, namespace, name, ActionPayload::None)
    }

    pub fn delete_collection(
        resource: ResourceIdentity,
        namespace: &str,
        params: ListParams,
    ) -> Self {
        Self::new(
            Verb::DeleteCollection,
            resource,
            namespace,
            "",
            ActionPayload::DeleteCollection { params },
        )
    }

    pub fn patch(
        resource: ResourceIdentity,
        namespace: &str,
        name: &str,
        patch_type: PatchType,
        data: Bytes,
    ) -> Self {
        Self::new(
            Verb::Patch,
            resource,
            namespace,
            name,
            ActionPayload::Patch { patch_type, data },
        )
    }

    /// Target a subresource of the object instead of the object itself
    pub fn with_subresource(mut self, subresource: impl Into<String>) -> Self {
        self.subresource = Some(subresource.into());
        self
    }

    pub fn verb(&self) -> Verb {
        self.verb
    }

    pub fn resource(&self) -> &ResourceIdentity {
        &self.resource
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn subresource(&self) -> Option<&str> {
        self.subresource.as_deref()
    }

    pub fn payload(&self) -> &ActionPayload {
        &self.payload
    }

    /// Object carried by create and update actions
    pub fn object(&self) -> Option<&GenericObject> {
        match &self.payload {
            ActionPayload::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Whether a verb pattern and a resource pattern both cover this action
    ///
    /// `"*"` matches anything. A resource pattern of `resource/subresource`
    /// only matches actions on that subresource.
    pub fn matches(&self, verb: &str, resource: &str) -> bool {
        let verb_covers = verb == "*" || verb == self.verb.as_str();
        if !verb_covers {
            return false;
        }

        if resource == "*" {
            return true;
        }
        match (&self.subresource, resource.split_once('/')) {
            (Some(sub), Some((res, wanted))) => res == self.resource.resource && wanted == sub,
            (_, Some(_)) => false,
            (_, None) => resource == self.resource.resource,
        }
    }
}
