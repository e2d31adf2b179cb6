//! Type registry for typed objects
//!
//! The scheme maps a Rust type to the group/version/kind it is serialized as.
//! Like a real API server that only serves installed resources, the fake client
//! only handles types that were registered with the scheme it was built with.
//! A scheme is populated up front and then shared read-only (`Arc<Scheme>`),
//! so several clients with different schemes can live in one test binary.

use crate::identity::PluralRules;
use crate::object::ObjectList;
use crate::{Error, Result};
use kube::Resource;
use serde::{Deserialize, Serialize};
use std::any::{type_name, TypeId};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Group, version and kind of a typed schema
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeDescriptor {
    pub group: String,
    pub version: String,
    pub kind: String,
}

impl TypeDescriptor {
    pub fn new(
        group: impl Into<String>,
        version: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            kind: kind.into(),
        }
    }

    /// Descriptor of a type implementing `kube::Resource`
    pub fn of<K: Resource<DynamicType = ()>>() -> Self {
        Self::new(K::group(&()), K::version(&()), K::kind(&()))
    }

    /// Parse an `apiVersion` string (`group/version`, or `version` for the core group)
    pub fn from_api_version(api_version: &str, kind: impl Into<String>) -> Self {
        match api_version.split_once('/') {
            Some((group, version)) => Self::new(group, version, kind),
            None => Self::new("", api_version, kind),
        }
    }

    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    /// Same group and version with another kind
    pub fn with_kind(&self, kind: impl Into<String>) -> Self {
        Self::new(self.group.clone(), self.version.clone(), kind)
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, Kind={}", self.api_version(), self.kind)
    }
}

/// Registry of typed objects known to a fake client
#[derive(Debug, Clone, Default)]
pub struct Scheme {
    /// Rust type -> descriptor
    types: HashMap<TypeId, TypeDescriptor>,
    /// Every descriptor registered, including those only seeded as raw JSON
    known: HashSet<TypeDescriptor>,
    plurals: PluralRules,
}

impl Scheme {
    /// Create an empty scheme
    pub fn new() -> Self {
        Self::default()
    }

    /// Scheme with the commonly used built-in Kubernetes types registered
    pub fn with_builtin_types() -> Self {
        use k8s_openapi::api::{apps, batch, core, rbac};

        let mut scheme = Self::new();
        scheme
            .register_resource::<core::v1::Pod>()
            .register_resource::<core::v1::ConfigMap>()
            .register_resource::<core::v1::Secret>()
            .register_resource::<core::v1::Service>()
            .register_resource::<core::v1::ServiceAccount>()
            .register_resource::<core::v1::Namespace>()
            .register_resource::<core::v1::Node>()
            .register_resource::<core::v1::Event>()
            .register_resource::<core::v1::Endpoints>()
            .register_resource::<core::v1::PersistentVolume>()
            .register_resource::<core::v1::PersistentVolumeClaim>()
            .register_resource::<apps::v1::Deployment>()
            .register_resource::<apps::v1::StatefulSet>()
            .register_resource::<apps::v1::DaemonSet>()
            .register_resource::<apps::v1::ReplicaSet>()
            .register_resource::<batch::v1::Job>()
            .register_resource::<batch::v1::CronJob>()
            .register_resource::<rbac::v1::Role>()
            .register_resource::<rbac::v1::RoleBinding>()
            .register_resource::<rbac::v1::ClusterRole>()
            .register_resource::<rbac::v1::ClusterRoleBinding>();
        scheme
    }

    /// Register an arbitrary Rust type under the given descriptor
    ///
    /// Use this for custom resources that do not implement `kube::Resource`,
    /// or to register list types by hand.
    pub fn register<K: 'static>(&mut self, descriptor: TypeDescriptor) -> &mut Self {
        self.known.insert(descriptor.clone());
        self.types.insert(TypeId::of::<K>(), descriptor);
        self
    }

    /// Register a `kube::Resource` together with its `ObjectList<K>`
    ///
    /// The resource's own plural is recorded as an override so that irregular
    /// plurals never go through the heuristic.
    pub fn register_resource<K>(&mut self) -> &mut Self
    where
        K: Resource<DynamicType = ()> + 'static,
    {
        let descriptor = TypeDescriptor::of::<K>();
        let list = descriptor.with_kind(format!("{}List", descriptor.kind));
        self.plurals
            .insert(&descriptor.group, &descriptor.kind, K::plural(&()));
        self.register::<ObjectList<K>>(list);
        self.register::<K>(descriptor)
    }

    /// Make a kind known without binding it to a Rust type
    pub fn register_kind(&mut self, descriptor: TypeDescriptor) -> &mut Self {
        self.known.insert(descriptor);
        self
    }

    /// Record an irregular plural for a kind
    pub fn register_plural(
        &mut self,
        group: &str,
        kind: &str,
        plural: impl Into<String>,
    ) -> &mut Self {
        self.plurals.insert(group, kind, plural);
        self
    }

    /// Fluent variant of [`Scheme::register_resource`]
    pub fn with_resource<K>(mut self) -> Self
    where
        K: Resource<DynamicType = ()> + 'static,
    {
        self.register_resource::<K>();
        self
    }

    /// Fluent variant of [`Scheme::register`]
    pub fn with_type<K: 'static>(mut self, descriptor: TypeDescriptor) -> Self {
        self.register::<K>(descriptor);
        self
    }

    /// Look up the descriptor a Rust type was registered under
    pub fn descriptor_of<K: 'static>(&self) -> Result<TypeDescriptor> {
        self.types.get(&TypeId::of::<K>()).cloned().ok_or_else(|| {
            Error::Resolution(format!(
                "no kind is registered for the type {} in scheme",
                type_name::<K>()
            ))
        })
    }

    /// Whether a descriptor is known, either bound to a type or registered on its own
    pub fn recognizes(&self, descriptor: &TypeDescriptor) -> bool {
        self.known.contains(descriptor)
    }

    pub fn plural_rules(&self) -> &PluralRules {
        &self.plurals
    }
}
