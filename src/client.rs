//! Fake client facade
//!
//! Every call resolves the typed object's resource identity, builds one
//! [`Action`], runs it through the reactor chain (falling through to the
//! tracker) and decodes the outcome back into the caller's object through the
//! round-trip codec.

use crate::action::Action;
use crate::identity::{ResourceIdentity, Resolver};
use crate::invocation::Invoker;
use crate::object::{from_generic, to_generic, GenericObject, ObjectKey};
use crate::patch::Patch;
use crate::reactor::{Reaction, Reactor};
use crate::scheme::Scheme;
use crate::tracker::ObjectTracker;
use crate::{Error, Result};
use kube::api::{DeleteParams, ListParams, PatchParams, PostParams};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Failure reported when neither a reactor nor the tracker produced a result
const DEFAULT_FAILURE: &str = "dynamic get fail";

fn default_failure() -> Error {
    Error::Failure(DEFAULT_FAILURE.to_string())
}

/// How operations the fake never supports are reported
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnsupportedPolicy {
    /// Panic, failing the calling test on the spot
    #[default]
    Panic,
    /// Return `Error::UnsupportedOperation`
    ReturnError,
}

/// Namespace scoping and list parameters for `list`
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// `None` lists across all namespaces
    pub namespace: Option<String>,
    pub params: ListParams,
}

impl ListOptions {
    pub fn namespaced(namespace: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            params: ListParams::default(),
        }
    }

    pub fn all() -> Self {
        Self::default()
    }

    pub fn labels(mut self, selector: &str) -> Self {
        self.params = self.params.labels(selector);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.params = self.params.limit(limit);
        self
    }

    pub fn with_params(mut self, params: ListParams) -> Self {
        self.params = params;
        self
    }
}

/// Fake controller client for testing
///
/// Clones share the scheme, the tracker, the reactor chain and the action log.
#[derive(Clone)]
pub struct FakeClient {
    pub(crate) scheme: Arc<Scheme>,
    pub(crate) invoker: Arc<Invoker>,
    pub(crate) unsupported: UnsupportedPolicy,
}

impl FakeClient {
    /// Create an empty client over the given scheme
    pub fn new(scheme: impl Into<Arc<Scheme>>) -> Self {
        Self::with_tracker(scheme, Arc::new(ObjectTracker::new()))
    }

    /// Create a client serving from an existing tracker
    pub fn with_tracker(scheme: impl Into<Arc<Scheme>>, tracker: Arc<ObjectTracker>) -> Self {
        Self {
            scheme: scheme.into(),
            invoker: Arc::new(Invoker::new(tracker)),
            unsupported: UnsupportedPolicy::default(),
        }
    }

    pub fn scheme(&self) -> &Arc<Scheme> {
        &self.scheme
    }

    /// Get the object tracker
    pub fn tracker(&self) -> &Arc<ObjectTracker> {
        self.invoker.tracker()
    }

    pub fn unsupported_policy(&self) -> UnsupportedPolicy {
        self.unsupported
    }

    fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.scheme)
    }

    /// Generic form and resource identity of a typed object
    fn prepare<K>(&self, obj: &K) -> Result<(GenericObject, ResourceIdentity)>
    where
        K: Serialize + 'static,
    {
        let (_, resource) = self.resolver().resolve_type::<K>()?;
        let generic = to_generic(&self.scheme, obj)?;
        Ok((generic, resource))
    }

    /// Decode an invocation result into the caller's object
    ///
    /// A reactor may claim an action without producing an object, which leaves
    /// the caller's object untouched.
    fn decode<K>(&self, result: Option<GenericObject>, obj: &mut K) -> Result<()>
    where
        K: DeserializeOwned + 'static,
    {
        match result {
            Some(object) => from_generic(&self.scheme, &object, obj),
            None => Ok(()),
        }
    }

    /// Report an operation the fake never supports, per the unsupported policy
    pub(crate) fn unsupported(&self, operation: &str) -> Error {
        let err = Error::UnsupportedOperation {
            operation: operation.to_string(),
        };
        match self.unsupported {
            UnsupportedPolicy::Panic => panic!("{}", err),
            UnsupportedPolicy::ReturnError => err,
        }
    }

    /// Get the object stored under `key` into `obj`
    pub fn get<K>(&self, key: &ObjectKey, obj: &mut K) -> Result<()>
    where
        K: DeserializeOwned + 'static,
    {
        let (_, resource) = self.resolver().resolve_type::<K>()?;
        let action = Action::get(resource, &key.namespace, &key.name);
        let result = self.invoker.invoke(action, default_failure)?;
        self.decode(result, obj)
    }

    /// List objects into a list type such as `ObjectList<Pod>`
    pub fn list<L>(&self, list: &mut L, opts: &ListOptions) -> Result<()>
    where
        L: DeserializeOwned + 'static,
    {
        let (kind, resource) = self.resolver().resolve_list::<L>()?;
        let namespace = opts.namespace.as_deref().unwrap_or("");
        let action = Action::list(resource, kind, namespace, opts.params.clone());
        let result = self.invoker.invoke(action, default_failure)?;
        self.decode(result, list)
    }

    /// Create an object; `obj` is refreshed with the stored result
    pub fn create<K>(&self, obj: &mut K, _params: &PostParams) -> Result<()>
    where
        K: Serialize + DeserializeOwned + 'static,
    {
        let (generic, resource) = self.prepare(obj)?;
        let namespace = generic.namespace().unwrap_or_default().to_string();
        let action = Action::create(resource, &namespace, generic);
        let result = self.invoker.invoke(action, default_failure)?;
        self.decode(result, obj)
    }

    /// Replace an object wholesale
    pub fn update<K>(&self, obj: &mut K, _params: &PostParams) -> Result<()>
    where
        K: Serialize + DeserializeOwned + 'static,
    {
        let (generic, resource) = self.prepare(obj)?;
        let namespace = generic.namespace().unwrap_or_default().to_string();
        let action = Action::update(resource, &namespace, generic);
        let result = self.invoker.invoke(action, default_failure)?;
        self.decode(result, obj)
    }

    /// Delete an object
    pub fn delete<K>(&self, obj: &mut K, _params: &DeleteParams) -> Result<()>
    where
        K: Serialize + DeserializeOwned + 'static,
    {
        let (generic, resource) = self.prepare(obj)?;
        let key = generic.key();
        let action = Action::delete(resource, &key.namespace, &key.name);
        let result = self.invoker.invoke(action, default_failure)?;
        self.decode(result, obj)
    }

    /// Patch an object
    pub fn patch<K>(&self, obj: &mut K, patch: &Patch, _params: &PatchParams) -> Result<()>
    where
        K: Serialize + DeserializeOwned + 'static,
    {
        let (generic, resource) = self.prepare(obj)?;
        let key = generic.key();
        let data = patch.data(&generic)?;
        let action = Action::patch(resource, &key.namespace, &key.name, patch.patch_type(), data);
        let result = self.invoker.invoke(action, default_failure)?;
        self.decode(result, obj)
    }

    /// Not supported: always reported through the unsupported policy
    pub fn delete_all_of<K>(&self, _obj: &K, _opts: &ListOptions) -> Result<()>
    where
        K: Serialize + 'static,
    {
        Err(self.unsupported("DeleteAllOf"))
    }

    /// Writer for the `status` subresource
    pub fn status(&self) -> SubResourceClient<'_> {
        self.sub_resource("status")
    }

    /// Writer for an arbitrary subresource
    pub fn sub_resource(&self, name: impl Into<String>) -> SubResourceClient<'_> {
        SubResourceClient {
            client: self,
            name: name.into(),
        }
    }

    /// Insert a reactor at the front of the chain
    ///
    /// `verb` and `resource` accept `"*"`; `resource` may also name a
    /// subresource as `pods/status`.
    pub fn prepend_reactor<F>(&self, verb: &str, resource: &str, reaction: F)
    where
        F: Fn(&Action) -> Reaction + Send + Sync + 'static,
    {
        debug!("Prepending reactor for {} {}", verb, resource);
        self.invoker
            .chain()
            .prepend(Reactor::new(verb, resource, reaction));
    }

    /// Add a reactor at the back of the chain, still ahead of the tracker
    pub fn append_reactor<F>(&self, verb: &str, resource: &str, reaction: F)
    where
        F: Fn(&Action) -> Reaction + Send + Sync + 'static,
    {
        debug!("Appending reactor for {} {}", verb, resource);
        self.invoker
            .chain()
            .append(Reactor::new(verb, resource, reaction));
    }

    /// Seed a typed object into the tracker
    pub fn add_object<K>(&self, obj: &K) -> Result<()>
    where
        K: Serialize + 'static,
    {
        let generic = to_generic(&self.scheme, obj)?;
        self.add_generic(generic)
    }

    /// Seed typed objects into the tracker, stopping at the first failure
    pub fn add_objects<'a, K, I>(&self, objects: I) -> Result<()>
    where
        K: Serialize + 'static,
        I: IntoIterator<Item = &'a K>,
    {
        objects
            .into_iter()
            .try_for_each(|obj| self.add_object(obj))
    }

    /// Seed generic objects into the tracker, stopping at the first failure
    pub fn add_generic_objects<I>(&self, objects: I) -> Result<()>
    where
        I: IntoIterator<Item = GenericObject>,
    {
        objects
            .into_iter()
            .try_for_each(|obj| self.add_generic(obj))
    }

    pub(crate) fn add_generic(&self, object: GenericObject) -> Result<()> {
        let (_, resource) = self.resolver().resolve_object(&object)?;
        self.tracker().add(&resource, object)?;
        Ok(())
    }

    /// Actions invoked so far, in order
    pub fn actions(&self) -> Vec<Action> {
        self.invoker.actions()
    }

    pub fn clear_actions(&self) {
        self.invoker.clear_actions()
    }
}

/// Writer bound to one subresource of the objects it is given
///
/// Only `update` and `patch` are supported; `get` and `create` are reported
/// through the client's unsupported policy.
pub struct SubResourceClient<'a> {
    client: &'a FakeClient,
    name: String,
}

impl SubResourceClient<'_> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replace the subresource of the stored object with the one in `obj`
    pub fn update<K>(&self, obj: &mut K, _params: &PostParams) -> Result<()>
    where
        K: Serialize + DeserializeOwned + 'static,
    {
        let (generic, resource) = self.client.prepare(obj)?;
        let namespace = generic.namespace().unwrap_or_default().to_string();
        let action = Action::update(resource, &namespace, generic).with_subresource(&self.name);
        let result = self.client.invoker.invoke(action, default_failure)?;
        self.client.decode(result, obj)
    }

    /// Patch the subresource of the stored object
    pub fn patch<K>(&self, obj: &mut K, patch: &Patch, _params: &PatchParams) -> Result<()>
    where
        K: Serialize + DeserializeOwned + 'static,
    {
        let (generic, resource) = self.client.prepare(obj)?;
        let key = generic.key();
        let data = patch.data(&generic)?;
        let action = Action::patch(resource, &key.namespace, &key.name, patch.patch_type(), data)
            .with_subresource(&self.name);
        let result = self.client.invoker.invoke(action, default_failure)?;
        self.client.decode(result, obj)
    }

    /// Not supported on subresources
    pub fn get<K>(&self, _obj: &mut K) -> Result<()>
    where
        K: DeserializeOwned + 'static,
    {
        Err(self
            .client
            .unsupported(&format!("get on subresource {}", self.name)))
    }

    /// Not supported on subresources
    pub fn create<K, S>(&self, _obj: &K, _subresource: &mut S) -> Result<()>
    where
        K: Serialize + 'static,
        S: Serialize + DeserializeOwned + 'static,
    {
        Err(self
            .client
            .unsupported(&format!("create on subresource {}", self.name)))
    }
}
