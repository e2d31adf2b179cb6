#[cfg(test)]
mod tests {
    use crate::action::Action;
    use crate::identity::ResourceIdentity;
    use crate::object::{GenericObject, ObjectKey};
    use crate::reactor::*;
    use crate::scheme::TypeDescriptor;
    use crate::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn get(resource: &str) -> Action {
        Action::get(ResourceIdentity::new("", "v1", resource), "default", "web")
    }

    fn marker(name: &str) -> GenericObject {
        GenericObject::new(
            &TypeDescriptor::new("", "v1", "Pod"),
            &ObjectKey::new("default", name),
        )
    }

    #[test]
    fn test_empty_chain_claims_nothing() {
        let chain = ReactorChain::new();
        assert!(chain.is_empty());
        assert!(chain.react(&get("pods")).is_none());
    }

    #[test]
    fn test_first_claiming_reactor_wins() {
        let chain = ReactorChain::new();
        chain.append(Reactor::new("get", "pods", |_| Reaction::object(marker("first"))));
        chain.append(Reactor::new("get", "pods", |_| Reaction::object(marker("second"))));

        let outcome = chain.react(&get("pods")).unwrap().unwrap().unwrap();
        assert_eq!(outcome.name(), Some("first"));
    }

    #[test]
    fn test_prepend_runs_ahead_of_existing_reactors() {
        let chain = ReactorChain::new();
        chain.append(Reactor::new("*", "*", |_| Reaction::object(marker("appended"))));
        chain.prepend(Reactor::new("get", "pods", |_| Reaction::object(marker("prepended"))));
        assert_eq!(chain.len(), 2);

        let outcome = chain.react(&get("pods")).unwrap().unwrap().unwrap();
        assert_eq!(outcome.name(), Some("prepended"));
    }

    #[test]
    fn test_continue_passes_to_next_reactor() {
        let seen = Arc::new(AtomicUsize::new(0));
        let chain = ReactorChain::new();

        let counter = seen.clone();
        chain.append(Reactor::new("*", "*", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Reaction::Continue
        }));
        chain.append(Reactor::new("get", "pods", |_| {
            Reaction::error(Error::injected("boom"))
        }));

        let outcome = chain.react(&get("pods")).unwrap();
        assert!(matches!(outcome, Err(Error::Injected(msg)) if msg == "boom"));
        assert_eq!(seen.load(Ordering::SeqCst), 1);

        // Falls off the end of the chain for other resources
        assert!(chain.react(&get("services")).is_none());
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_non_matching_reactor_is_not_called() {
        let called = Arc::new(Mutex::new(false));
        let flag = called.clone();
        let chain = ReactorChain::new();
        chain.append(Reactor::new("list", "pods", move |_| {
            *flag.lock().unwrap() = true;
            Reaction::empty()
        }));

        assert!(chain.react(&get("pods")).is_none());
        assert!(!*called.lock().unwrap());
    }

    #[test]
    fn test_reactor_may_register_reactors() {
        let chain = Arc::new(ReactorChain::new());
        let inner = chain.clone();
        chain.append(Reactor::new("get", "pods", move |_| {
            inner.append(Reactor::new("get", "services", |_| Reaction::empty()));
            Reaction::Continue
        }));

        assert!(chain.react(&get("pods")).is_none());
        assert_eq!(chain.len(), 2);
        assert!(matches!(chain.react(&get("services")), Some(Ok(None))));
    }

    #[test]
    fn test_reaction_helpers() {
        assert!(!Reaction::Continue.is_handled());
        assert!(Reaction::empty().is_handled());
        assert!(Reaction::error(Error::injected("x")).is_handled());

        let reactor = Reactor::new("get", "pods/status", |_| Reaction::Continue);
        assert!(format!("{:?}", reactor).contains("pods/status"));
    }
}
