//! In-memory Kubernetes controller client for testing controllers and operators.
//!
//! Based on controller-runtime's fake client from the Go ecosystem: typed
//! objects are resolved through a [`Scheme`], every call becomes an [`Action`]
//! that runs through a chain of user [`Reactor`]s and falls through to an
//! in-memory [`ObjectTracker`], and results come back through a serialize and
//! decode round trip into the caller's object.
//!
//! # Examples
//!
//! ## Create and get
//!
//! ```rust
//! use kube_reactor_client::{ClientBuilder, ObjectKey};
//! use k8s_openapi::api::core::v1::Pod;
//! use kube::api::PostParams;
//!
//! let client = ClientBuilder::new().build().unwrap();
//!
//! let mut pod = Pod::default();
//! pod.metadata.name = Some("test".to_string());
//! pod.metadata.namespace = Some("test-ns".to_string());
//! client.create(&mut pod, &PostParams::default()).unwrap();
//!
//! let mut fetched = Pod::default();
//! client.get(&ObjectKey::new("test-ns", "test"), &mut fetched).unwrap();
//! assert_eq!(fetched.metadata.resource_version.as_deref(), Some("1"));
//! ```
//!
//! ## Injecting failures
//!
//! ```rust
//! use kube_reactor_client::{ClientBuilder, Error, ObjectKey, Reaction};
//! use k8s_openapi::api::core::v1::ConfigMap;
//!
//! let client = ClientBuilder::new().build().unwrap();
//! client.prepend_reactor("get", "configmaps", |_| {
//!     Reaction::error(Error::injected("etcd unavailable"))
//! });
//!
//! let mut cm = ConfigMap::default();
//! let err = client
//!     .get(&ObjectKey::new("default", "settings"), &mut cm)
//!     .unwrap_err();
//! assert!(matches!(err, Error::Injected(_)));
//! ```

mod action;
mod builder;
mod client;
pub mod codec;
mod error;
mod identity;
mod invocation;
pub mod label_selector;
mod object;
mod patch;
mod reactor;
mod scheme;
mod tracker;
mod utils;

#[cfg(test)]
mod builder_test;
#[cfg(test)]
mod reactor_test;
#[cfg(test)]
mod utils_test;

pub use action::{Action, ActionPayload, Verb};
pub use builder::ClientBuilder;
pub use client::{FakeClient, ListOptions, SubResourceClient, UnsupportedPolicy};
pub use error::{Error, Result};
pub use identity::{pluralize, PluralRules, ResourceIdentity, Resolver};
pub use invocation::Invoker;
pub use object::{from_generic, to_generic, GenericObject, ObjectKey, ObjectList};
pub use patch::{Patch, PatchType};
pub use reactor::{Reaction, ReactionFunc, Reactor, ReactorChain};
pub use scheme::{Scheme, TypeDescriptor};
pub use tracker::ObjectTracker;
