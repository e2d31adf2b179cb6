//! Invocation engine: reactor chain first, tracker as the fallthrough

use crate::action::{Action, ActionPayload, Verb};
use crate::label_selector::parse_label_selector;
use crate::object::{GenericObject, ObjectKey};
use crate::reactor::ReactorChain;
use crate::scheme::TypeDescriptor;
use crate::tracker::ObjectTracker;
use crate::{Error, Result};
use kube::api::ListParams;
use kube::core::SelectorExt;
use serde_json::json;
use std::sync::{Arc, Mutex};
use tracing::{debug, trace};

pub struct Invoker {
    chain: ReactorChain,
    tracker: Arc<ObjectTracker>,
    /// Every action invoked, in order
    actions: Mutex<Vec<Action>>,
}

impl Invoker {
    pub fn new(tracker: Arc<ObjectTracker>) -> Self {
        Self {
            chain: ReactorChain::new(),
            tracker,
            actions: Mutex::new(Vec::new()),
        }
    }

    pub fn chain(&self) -> &ReactorChain {
        &self.chain
    }

    pub fn tracker(&self) -> &Arc<ObjectTracker> {
        &self.tracker
    }

    pub fn actions(&self) -> Vec<Action> {
        self.actions
            .lock()
            .expect("Invoker action log lock poisoned")
            .clone()
    }

    pub fn clear_actions(&self) {
        self.actions
            .lock()
            .expect("Invoker action log lock poisoned")
            .clear();
    }

    /// Run an action to completion
    ///
    /// A reactor that claims the action decides the outcome, untouched. Otherwise
    /// the tracker serves it; `default_error` is reported when the tracker has
    /// nothing to offer for the action.
    pub fn invoke<F>(&self, action: Action, default_error: F) -> Result<Option<GenericObject>>
    where
        F: FnOnce() -> Error,
    {
        trace!(
            "Invoking {} {} {}/{} (subresource: {:?})",
            action.verb(),
            action.resource(),
            action.namespace(),
            action.name(),
            action.subresource()
        );

        self.actions
            .lock()
            .expect("Invoker action log lock poisoned")
            .push(action.clone());

        if let Some(outcome) = self.chain.react(&action) {
            return outcome;
        }

        match self.track(&action)? {
            Some(object) => Ok(Some(object)),
            None => {
                debug!(
                    "Tracker cannot serve {} {}, reporting default error",
                    action.verb(),
                    action.resource()
                );
                Err(default_error())
            }
        }
    }

    fn track(&self, action: &Action) -> Result<Option<GenericObject>> {
        let resource = action.resource();
        let key = ObjectKey::new(action.namespace(), action.name());

        match (action.verb(), action.payload()) {
            (Verb::Get, _) => self.tracker.get(resource, &key).map(Some),
            (Verb::List, ActionPayload::List { kind, params }) => {
                self.list(action, kind, params).map(Some)
            }
            (Verb::Create, ActionPayload::Object(object)) if action.subresource().is_none() => {
                let mut object = object.clone();
                object.set_namespace(action.namespace());
                self.tracker.create(resource, object).map(Some)
            }
            (Verb::Update, ActionPayload::Object(object)) => {
                let mut object = object.clone();
                object.set_namespace(action.namespace());
                self.tracker
                    .update(resource, object, action.subresource())
                    .map(Some)
            }
            (Verb::Delete, _) => self.tracker.delete(resource, &key).map(Some),
            (Verb::Patch, ActionPayload::Patch { patch_type, data }) => self
                .tracker
                .patch(resource, &key, *patch_type, data, action.subresource())
                .map(Some),
            _ => Ok(None),
        }
    }

    /// List object built from tracked items, filtered by label selector and limit
    fn list(
        &self,
        action: &Action,
        kind: &TypeDescriptor,
        params: &ListParams,
    ) -> Result<GenericObject> {
        let mut items = self.tracker.list(action.resource(), action.namespace())?;

        if let Some(selector) = params.label_selector.as_deref() {
            let selector = parse_label_selector(selector)?;
            items.retain(|item| selector.matches(&item.labels()));
        }
        if params.field_selector.is_some() {
            debug!("Field selectors are not evaluated by the tracker, ignoring");
        }
        if let Some(limit) = params.limit {
            items.truncate(limit as usize);
        }

        GenericObject::from_value(json!({
            "apiVersion": kind.api_version(),
            "kind": format!("{}List", kind.kind),
            "metadata": {
                "resourceVersion": "1"
            },
            "items": items,
        }))
    }
}
