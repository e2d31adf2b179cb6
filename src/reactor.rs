//! Reactors for customizing client behavior during testing
//!
//! A reactor is a handler registered for a verb pattern and a resource pattern.
//! Every action walks the chain front to back; the first matching reactor that
//! claims the action decides its outcome and the tracker is never consulted.
//!
//! # Example
//! ```
//! use kube_reactor_client::{ClientBuilder, Error, Reaction, Scheme};
//!
//! let client = ClientBuilder::new()
//!     .with_scheme(Scheme::with_builtin_types())
//!     .build()
//!     .unwrap();
//!
//! client.prepend_reactor("create", "pods", |action| {
//!     if action.name() == "trigger-error" {
//!         return Reaction::error(Error::injected("quota exceeded"));
//!     }
//!     Reaction::Continue
//! });
//! ```

use crate::action::Action;
use crate::object::GenericObject;
use crate::{Error, Result};
use std::sync::{Arc, RwLock};
use tracing::debug;

/// What a reactor decided about an action
#[derive(Debug)]
pub enum Reaction {
    /// Not claimed; the next reactor (or the tracker) handles the action
    Continue,
    /// Claimed; this is the final outcome of the action
    Handled(Result<Option<GenericObject>>),
}

impl Reaction {
    /// Claim the action and answer with `object`
    pub fn object(object: GenericObject) -> Self {
        Reaction::Handled(Ok(Some(object)))
    }

    /// Claim the action and fail it with `err`
    pub fn error(err: Error) -> Self {
        Reaction::Handled(Err(err))
    }

    /// Claim the action without returning an object
    pub fn empty() -> Self {
        Reaction::Handled(Ok(None))
    }

    pub fn is_handled(&self) -> bool {
        matches!(self, Reaction::Handled(_))
    }
}

pub type ReactionFunc = Arc<dyn Fn(&Action) -> Reaction + Send + Sync>;

/// A handler bound to a verb pattern and a resource pattern
#[derive(Clone)]
pub struct Reactor {
    pub verb: String,
    pub resource: String,
    pub(crate) reaction: ReactionFunc,
}

impl Reactor {
    pub fn new<F>(verb: impl Into<String>, resource: impl Into<String>, reaction: F) -> Self
    where
        F: Fn(&Action) -> Reaction + Send + Sync + 'static,
    {
        Self {
            verb: verb.into(),
            resource: resource.into(),
            reaction: Arc::new(reaction),
        }
    }

    pub fn handles(&self, action: &Action) -> bool {
        action.matches(&self.verb, &self.resource)
    }

    pub fn react(&self, action: &Action) -> Reaction {
        (self.reaction)(action)
    }
}

impl std::fmt::Debug for Reactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reactor")
            .field("verb", &self.verb)
            .field("resource", &self.resource)
            .finish_non_exhaustive()
    }
}

/// Ordered list of reactors
#[derive(Debug, Default)]
pub struct ReactorChain {
    reactors: RwLock<Vec<Reactor>>,
}

impl ReactorChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a reactor ahead of every reactor already registered
    pub fn prepend(&self, reactor: Reactor) {
        self.reactors
            .write()
            .expect("ReactorChain lock poisoned")
            .insert(0, reactor);
    }

    /// Add a reactor behind every reactor already registered
    pub fn append(&self, reactor: Reactor) {
        self.reactors
            .write()
            .expect("ReactorChain lock poisoned")
            .push(reactor);
    }

    pub fn len(&self) -> usize {
        self.reactors.read().expect("ReactorChain lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run the chain for an action; `None` when no reactor claimed it
    ///
    /// The chain is snapshotted first so handlers may register reactors
    /// without deadlocking.
    pub fn react(&self, action: &Action) -> Option<Result<Option<GenericObject>>> {
        let reactors = self
            .reactors
            .read()
            .expect("ReactorChain lock poisoned")
            .clone();

        for (position, reactor) in reactors.iter().enumerate() {
            if !reactor.handles(action) {
                continue;
            }
            if let Reaction::Handled(outcome) = reactor.react(action) {
                debug!(
                    "Reactor {} ({} {}) handled {} {}",
                    position,
                    reactor.verb,
                    reactor.resource,
                    action.verb(),
                    action.resource()
                );
                return Some(outcome);
            }
        }
        None
    }
}
