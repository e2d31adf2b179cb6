#[cfg(test)]
mod tests {
    use crate::builder::ClientBuilder;
    use crate::client::{ListOptions, UnsupportedPolicy};
    use crate::identity::ResourceIdentity;
    use crate::object::{ObjectKey, ObjectList};
    use crate::reactor::Reaction;
    use crate::scheme::{Scheme, TypeDescriptor};
    use crate::Error;
    use k8s_openapi::api::apps::v1::Deployment;
    use k8s_openapi::api::core::v1::{ConfigMap, Pod};
    use k8s_openapi::api::networking::v1::Ingress;
    use serde_json::json;
    use std::path::PathBuf;

    fn fixtures() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    fn pod(namespace: &str, name: &str) -> Pod {
        let mut pod = Pod::default();
        pod.metadata.name = Some(name.to_string());
        pod.metadata.namespace = Some(namespace.to_string());
        pod
    }

    #[test]
    fn test_default_builder_knows_builtin_types() {
        let client = ClientBuilder::default().build().unwrap();
        assert_eq!(client.unsupported_policy(), UnsupportedPolicy::Panic);

        let mut deployments = ObjectList::<Deployment>::new();
        client.list(&mut deployments, &ListOptions::all()).unwrap();
        assert!(deployments.is_empty());
    }

    #[test]
    fn test_with_objects() {
        let client = ClientBuilder::new()
            .with_objects(vec![pod("default", "a"), pod("default", "b")])
            .with_object(pod("other", "c"))
            .build()
            .unwrap();

        let mut pods = ObjectList::<Pod>::new();
        client.list(&mut pods, &ListOptions::all()).unwrap();
        assert_eq!(pods.len(), 3);
    }

    #[test]
    fn test_unregistered_object_fails_build() {
        let result = ClientBuilder::new()
            .with_scheme(Scheme::new().with_resource::<Pod>())
            .with_object(Ingress::default())
            .build();
        assert!(matches!(result, Err(Error::Conversion(_))));
    }

    #[test]
    fn test_with_runtime_objects() {
        let mut scheme = Scheme::with_builtin_types();
        scheme.register_kind(TypeDescriptor::new("example.com", "v1", "Widget"));
        let client = ClientBuilder::new()
            .with_scheme(scheme)
            .with_runtime_objects(vec![
                json!({
                    "apiVersion": "v1",
                    "kind": "ConfigMap",
                    "metadata": {"name": "settings", "namespace": "default"},
                    "data": {"mode": "fast"}
                }),
                json!({
                    "apiVersion": "example.com/v1",
                    "kind": "Widget",
                    "metadata": {"name": "w", "namespace": "default"}
                }),
            ])
            .build()
            .unwrap();

        let mut cm = ConfigMap::default();
        client
            .get(&ObjectKey::new("default", "settings"), &mut cm)
            .unwrap();
        assert_eq!(cm.data.unwrap().get("mode").map(String::as_str), Some("fast"));

        let widget = client
            .tracker()
            .get(
                &ResourceIdentity::new("example.com", "v1", "widgets"),
                &ObjectKey::new("default", "w"),
            )
            .unwrap();
        assert_eq!(widget.resource_version(), Some("999"));
    }

    #[test]
    fn test_runtime_object_of_unknown_kind_fails_build() {
        let result = ClientBuilder::new()
            .with_runtime_objects(vec![json!({
                "apiVersion": "example.com/v1",
                "kind": "Gizmo",
                "metadata": {"name": "g"}
            })])
            .build();
        assert!(matches!(result, Err(Error::Resolution(_))));

        let result = ClientBuilder::new()
            .with_runtime_objects(vec![json!(["not", "an", "object"])])
            .build();
        assert!(matches!(result, Err(Error::Conversion(_))));
    }

    #[test]
    fn test_load_fixture_single_document() {
        let client = ClientBuilder::new()
            .with_fixture_dir(fixtures())
            .load_fixture("configmap.yaml")
            .unwrap()
            .build()
            .unwrap();

        let mut cm = ConfigMap::default();
        client
            .get(&ObjectKey::new("shop", "shop-settings"), &mut cm)
            .unwrap();
        assert_eq!(cm.data.unwrap().get("currency").map(String::as_str), Some("EUR"));
    }

    #[test]
    fn test_load_fixture_multi_document() {
        let client = ClientBuilder::new()
            .with_fixture_dir(fixtures())
            .load_fixture("pods.yaml")
            .unwrap()
            .build()
            .unwrap();

        let mut pods = ObjectList::<Pod>::new();
        client
            .list(&mut pods, &ListOptions::namespaced("shop"))
            .unwrap();
        let names: Vec<_> = pods
            .iter()
            .filter_map(|p| p.metadata.name.as_deref())
            .collect();
        assert_eq!(names, ["web-0", "db-0"]);

        let mut db = Pod::default();
        client.get(&ObjectKey::new("shop", "db-0"), &mut db).unwrap();
        assert_eq!(db.metadata.resource_version.as_deref(), Some("7"));
    }

    #[test]
    fn test_load_fixture_without_dir_uses_path_as_given() {
        let client = ClientBuilder::new()
            .load_fixture(fixtures().join("deployment.yaml"))
            .unwrap()
            .build()
            .unwrap();

        let mut deployment = Deployment::default();
        client
            .get(&ObjectKey::new("shop", "web"), &mut deployment)
            .unwrap();
        assert_eq!(deployment.spec.unwrap().replicas, Some(2));
    }

    #[test]
    fn test_load_fixtures() {
        let client = ClientBuilder::new()
            .with_fixture_dir(fixtures())
            .load_fixtures(["pods.yaml", "configmap.yaml", "deployment.yaml"])
            .unwrap()
            .build()
            .unwrap();

        let mut pods = ObjectList::<Pod>::new();
        client.list(&mut pods, &ListOptions::all()).unwrap();
        assert_eq!(pods.len(), 2);

        let mut configmaps = ObjectList::<ConfigMap>::new();
        client.list(&mut configmaps, &ListOptions::all()).unwrap();
        assert_eq!(configmaps.len(), 1);

        let mut deployments = ObjectList::<Deployment>::new();
        client.list(&mut deployments, &ListOptions::all()).unwrap();
        assert_eq!(deployments.len(), 1);
    }

    #[test]
    fn test_load_fixture_or_panic() {
        let client = ClientBuilder::new()
            .with_fixture_dir(fixtures())
            .load_fixtures_or_panic(["deployment.yaml"])
            .load_fixture_or_panic("configmap.yaml")
            .build()
            .unwrap();

        client
            .get(&ObjectKey::new("shop", "web"), &mut Deployment::default())
            .unwrap();
    }

    #[test]
    fn test_load_fixture_missing_file() {
        let result = ClientBuilder::new()
            .with_fixture_dir(fixtures())
            .load_fixture("nonexistent.yaml");
        assert!(matches!(result, Err(Error::Internal(_))));
    }

    #[test]
    #[should_panic(expected = "Failed to load fixture")]
    fn test_load_fixture_or_panic_missing_file() {
        ClientBuilder::new()
            .with_fixture_dir(fixtures())
            .load_fixture_or_panic("nonexistent.yaml");
    }

    #[test]
    fn test_load_fixture_rejects_non_object_documents() {
        let result = ClientBuilder::new()
            .with_fixture_dir(fixtures())
            .load_fixture("not-an-object.yaml");
        assert!(matches!(result, Err(Error::Conversion(_))));
    }

    #[test]
    fn test_with_reactor_and_policy() {
        let client = ClientBuilder::new()
            .with_object(pod("default", "web"))
            .with_reactor("delete", "pods", |_| Reaction::error(Error::injected("protected")))
            .with_unsupported_policy(UnsupportedPolicy::ReturnError)
            .build()
            .unwrap();

        let err = client
            .delete(&mut pod("default", "web"), &Default::default())
            .unwrap_err();
        assert!(matches!(err, Error::Injected(_)));

        // Seeding never goes through reactors
        assert!(client.actions().iter().all(|a| a.name() == "web"));
        assert_eq!(client.actions().len(), 1);
    }
}
