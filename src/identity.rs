//! Resource identity resolution
//!
//! Maps a [`TypeDescriptor`] to the group/version/resource triple objects of that
//! type are stored and addressed under.

use crate::object::GenericObject;
use crate::scheme::{Scheme, TypeDescriptor};
use crate::{Error, Result};
use std::collections::HashMap;
use std::fmt;

/// Group, version and plural resource name of a collection
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceIdentity {
    pub group: String,
    pub version: String,
    pub resource: String,
}

impl ResourceIdentity {
    pub fn new(
        group: impl Into<String>,
        version: impl Into<String>,
        resource: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            resource: resource.into(),
        }
    }
}

impl fmt::Display for ResourceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_empty() {
            write!(f, "{}.{}", self.resource, self.version)
        } else {
            write!(f, "{}.{}.{}", self.resource, self.version, self.group)
        }
    }
}

/// Kind to resource plural policy
///
/// Explicit overrides keyed by (group, kind) win; every other kind goes
/// through [`pluralize`].
#[derive(Debug, Clone, Default)]
pub struct PluralRules {
    overrides: HashMap<(String, String), String>,
}

impl PluralRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, group: &str, kind: &str, plural: impl Into<String>) {
        self.overrides
            .insert((group.to_string(), kind.to_string()), plural.into());
    }

    pub fn plural_for(&self, group: &str, kind: &str) -> String {
        self.overrides
            .get(&(group.to_string(), kind.to_string()))
            .cloned()
            .unwrap_or_else(|| pluralize(kind))
    }
}

/// Pluralize a Kubernetes Kind name to its resource plural form.
///
/// Implementation copied from kube-rs to ensure consistency with the broader ecosystem.
/// See: <https://github.com/kube-rs/kube/blob/main/kube-core/src/discovery.rs>
///
/// Copyright (c) kube-rs contributors
/// Licensed under Apache-2.0
///
/// This follows the same pluralization rules:
/// - Special cases for already-plural words (endpoints, endpointslices)
/// - Special cases for metrics resources (nodemetrics, podmetrics)
/// - Words ending in s, x, z, ch, sh get -es suffix
/// - Words ending in consonant+y get -ies suffix
/// - All other words get -s suffix
pub fn pluralize(kind: &str) -> String {
    let word = kind.to_ascii_lowercase();

    if word == "endpoints" || word == "endpointslices" {
        return word;
    } else if word == "nodemetrics" {
        return "nodes".to_string();
    } else if word == "podmetrics" {
        return "pods".to_string();
    }

    if word.ends_with('s')
        || word.ends_with('x')
        || word.ends_with('z')
        || word.ends_with("ch")
        || word.ends_with("sh")
    {
        return format!("{word}es");
    }

    if word.ends_with('y') {
        if let Some(c) = word.chars().rev().nth(1) {
            if !matches!(c, 'a' | 'e' | 'i' | 'o' | 'u') {
                let mut chars = word.chars();
                chars.next_back();
                return format!("{}ies", chars.as_str());
            }
        }
    }

    format!("{word}s")
}

/// Resolves typed and generic objects to their resource identity
pub struct Resolver<'a> {
    scheme: &'a Scheme,
}

impl<'a> Resolver<'a> {
    pub fn new(scheme: &'a Scheme) -> Self {
        Self { scheme }
    }

    /// Resource identity for a registered descriptor
    pub fn resolve(&self, descriptor: &TypeDescriptor) -> Result<ResourceIdentity> {
        if descriptor.kind.is_empty() || descriptor.version.is_empty() {
            return Err(Error::Resolution(format!(
                "incomplete type descriptor {:?}",
                descriptor
            )));
        }
        if !self.scheme.recognizes(descriptor) {
            return Err(Error::Resolution(format!(
                "no kind {} is registered in scheme",
                descriptor
            )));
        }

        let resource = self
            .scheme
            .plural_rules()
            .plural_for(&descriptor.group, &descriptor.kind);
        Ok(ResourceIdentity::new(
            descriptor.group.clone(),
            descriptor.version.clone(),
            resource,
        ))
    }

    /// Descriptor and resource identity of a Rust type
    pub fn resolve_type<K: 'static>(&self) -> Result<(TypeDescriptor, ResourceIdentity)> {
        let descriptor = self.scheme.descriptor_of::<K>()?;
        let identity = self.resolve(&descriptor)?;
        Ok((descriptor, identity))
    }

    /// Identity of the items held by a list type, and the item descriptor
    pub fn resolve_list<L: 'static>(&self) -> Result<(TypeDescriptor, ResourceIdentity)> {
        let list = self.scheme.descriptor_of::<L>()?;
        let item = list_item_descriptor(&list)?;
        let identity = self.resolve(&item)?;
        Ok((item, identity))
    }

    /// Identity of a generic object from its `apiVersion` and `kind`
    pub fn resolve_object(
        &self,
        object: &GenericObject,
    ) -> Result<(TypeDescriptor, ResourceIdentity)> {
        let descriptor = object.descriptor().map_err(|e| match e {
            Error::Conversion(msg) => Error::Resolution(msg),
            other => other,
        })?;
        let identity = self.resolve(&descriptor)?;
        Ok((descriptor, identity))
    }
}

/// Recover the item descriptor of a `<Kind>List` descriptor
pub fn list_item_descriptor(list: &TypeDescriptor) -> Result<TypeDescriptor> {
    if list.kind == "List" {
        return Err(Error::Resolution(format!(
            "cannot derive the item kind of the generic List type ({})",
            list
        )));
    }

    match list.kind.strip_suffix("List") {
        Some(kind) if !kind.is_empty() => Ok(list.with_kind(kind)),
        _ => Err(Error::Resolution(format!(
            "non-list type ({}) passed as output",
            list
        ))),
    }
}
