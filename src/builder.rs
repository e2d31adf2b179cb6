//! Builder for constructing fake clients with various options

use crate::action::Action;
use crate::client::{FakeClient, UnsupportedPolicy};
use crate::object::{to_generic, GenericObject};
use crate::reactor::{Reaction, Reactor};
use crate::scheme::Scheme;
use crate::{Error, Result};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Initial object, normalized against the scheme at build time
type Seed = Box<dyn FnOnce(&Scheme) -> Result<GenericObject>>;

/// Builder for creating fake clients
///
/// Provides a fluent API for constructing fake clients with various options:
/// - The scheme typed objects are resolved against
/// - Initial objects, typed or generic, and YAML fixtures
/// - Reactors installed before the first call
/// - How unsupported operations are reported
///
/// # Example
///
/// ```rust
/// use kube_reactor_client::{ClientBuilder, ObjectKey, Scheme};
/// use k8s_openapi::api::core::v1::Pod;
///
/// let mut pod = Pod::default();
/// pod.metadata.name = Some("test".to_string());
/// pod.metadata.namespace = Some("test-ns".to_string());
///
/// let client = ClientBuilder::new()
///     .with_scheme(Scheme::new().with_resource::<Pod>())
///     .with_object(pod)
///     .build()
///     .unwrap();
///
/// let mut fetched = Pod::default();
/// client.get(&ObjectKey::new("test-ns", "test"), &mut fetched).unwrap();
/// assert_eq!(fetched.metadata.name.as_deref(), Some("test"));
/// ```
pub struct ClientBuilder {
    scheme: Arc<Scheme>,
    initial_objects: Vec<Seed>,
    reactors: Vec<Reactor>,
    unsupported: UnsupportedPolicy,
    fixture_dir: Option<PathBuf>,
}

impl ClientBuilder {
    /// Create a new client builder over the built-in scheme
    pub fn new() -> Self {
        Self {
            scheme: Arc::new(Scheme::with_builtin_types()),
            initial_objects: Vec::new(),
            reactors: Vec::new(),
            unsupported: UnsupportedPolicy::default(),
            fixture_dir: None,
        }
    }

    /// Use `scheme` instead of the built-in one
    pub fn with_scheme(mut self, scheme: impl Into<Arc<Scheme>>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Add an initial object
    ///
    /// The object is normalized when the client is built; a type the scheme
    /// does not know fails `build`.
    pub fn with_object<K>(mut self, obj: K) -> Self
    where
        K: Serialize + 'static,
    {
        self.initial_objects
            .push(Box::new(move |scheme| to_generic(scheme, &obj)));
        self
    }

    /// Add multiple initial objects
    pub fn with_objects<K>(mut self, objects: Vec<K>) -> Self
    where
        K: Serialize + 'static,
    {
        for obj in objects {
            self = self.with_object(obj);
        }
        self
    }

    /// Add initial objects from JSON values carrying `apiVersion` and `kind`
    pub fn with_runtime_objects(mut self, objects: Vec<Value>) -> Self {
        for value in objects {
            self.initial_objects
                .push(Box::new(move |_| GenericObject::from_value(value)));
        }
        self
    }

    /// Install a reactor; reactors run in the order they were added here
    pub fn with_reactor<F>(mut self, verb: &str, resource: &str, reaction: F) -> Self
    where
        F: Fn(&Action) -> Reaction + Send + Sync + 'static,
    {
        self.reactors.push(Reactor::new(verb, resource, reaction));
        self
    }

    /// Choose how unsupported operations are reported (panic by default)
    pub fn with_unsupported_policy(mut self, policy: UnsupportedPolicy) -> Self {
        self.unsupported = policy;
        self
    }

    /// Set the fixture directory for loading YAML fixtures
    ///
    /// This directory will be used as the base path for `load_fixture` calls.
    pub fn with_fixture_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fixture_dir = Some(dir.into());
        self
    }

    /// Load objects from a YAML fixture file
    ///
    /// Supports both single-document and multi-document YAML files (separated by `---`).
    /// Objects will be added to the initial objects list and seeded when the client is built.
    ///
    /// If a fixture directory was set with `with_fixture_dir`, the path is relative to that directory.
    /// Otherwise, the path is relative to the current working directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the YAML cannot be parsed.
    pub fn load_fixture(mut self, path: impl AsRef<Path>) -> Result<Self> {
        let fixture_path = match &self.fixture_dir {
            Some(dir) => dir.join(path),
            None => path.as_ref().to_path_buf(),
        };

        let content = std::fs::read_to_string(&fixture_path).map_err(|e| {
            Error::Internal(format!(
                "Failed to read fixture file {:?}: {}",
                fixture_path, e
            ))
        })?;

        use serde::Deserialize;
        for document in serde_yaml::Deserializer::from_str(&content) {
            let value = Value::deserialize(document).map_err(|e| {
                Error::Internal(format!("Failed to parse YAML in {:?}: {}", fixture_path, e))
            })?;
            if value.is_null() {
                continue;
            }

            let object = GenericObject::from_value(value)?;
            debug!("Loaded fixture object {} from {:?}", object.key(), fixture_path);
            self.initial_objects.push(Box::new(move |_| Ok(object)));
        }

        Ok(self)
    }

    /// Load objects from multiple YAML fixture files, in order
    pub fn load_fixtures<P>(mut self, paths: impl IntoIterator<Item = P>) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        for path in paths {
            self = self.load_fixture(path)?;
        }
        Ok(self)
    }

    /// Load objects from a YAML fixture file, panicking on error
    ///
    /// # Panics
    ///
    /// Panics if the fixture file cannot be loaded or parsed.
    pub fn load_fixture_or_panic(self, path: impl AsRef<Path>) -> Self {
        self.load_fixture(path).expect("Failed to load fixture")
    }

    /// Load objects from multiple YAML fixture files, panicking on error
    ///
    /// # Panics
    ///
    /// Panics if any fixture file cannot be loaded or parsed.
    pub fn load_fixtures_or_panic<P>(self, paths: impl IntoIterator<Item = P>) -> Self
    where
        P: AsRef<Path>,
    {
        self.load_fixtures(paths).expect("Failed to load fixtures")
    }

    /// Build the fake client
    ///
    /// # Errors
    ///
    /// Returns the first error hit while normalizing or seeding initial objects,
    /// such as `Error::Resolution` for a kind the scheme does not know.
    pub fn build(self) -> Result<FakeClient> {
        let mut client = FakeClient::new(self.scheme);
        client.unsupported = self.unsupported;

        for reactor in self.reactors {
            client.invoker.chain().append(reactor);
        }

        // Seeded with add() rather than create(), so a missing
        // resourceVersion becomes "999" instead of "1"
        for seed in self.initial_objects {
            let object = seed(&client.scheme)?;
            client.add_generic(object)?;
        }

        Ok(client)
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
