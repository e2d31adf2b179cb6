#[cfg(test)]
mod tests {
    use crate::utils::*;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    #[test]
    fn test_increment_resource_version() {
        assert_eq!(increment_resource_version("").unwrap(), "1");
        assert_eq!(increment_resource_version("1").unwrap(), "2");
        assert_eq!(increment_resource_version(SEED_RESOURCE_VERSION).unwrap(), "1");
        assert_eq!(increment_resource_version("42").unwrap(), "43");
        assert!(increment_resource_version("abc").is_err());
    }

    #[test]
    fn test_should_be_deleted_needs_timestamp_and_no_finalizers() {
        let mut meta = ObjectMeta::default();
        assert!(!should_be_deleted(&meta));

        meta.deletion_timestamp = Some(now().unwrap());
        assert!(should_be_deleted(&meta));

        meta.finalizers = Some(vec!["example.com/cleanup".to_string()]);
        assert!(!should_be_deleted(&meta));

        meta.finalizers = Some(vec![]);
        assert!(should_be_deleted(&meta));
    }

    #[test]
    fn test_ensure_metadata_fills_identity_once() {
        let mut meta = ObjectMeta {
            name: Some("test".to_string()),
            namespace: Some(String::new()),
            ..Default::default()
        };

        ensure_metadata(&mut meta).unwrap();
        assert_eq!(meta.namespace, None);
        assert!(meta.creation_timestamp.is_some());
        let uid = meta.uid.clone().unwrap();
        assert_eq!(uid.len(), 36);

        ensure_metadata(&mut meta).unwrap();
        assert_eq!(meta.uid.as_deref(), Some(uid.as_str()));
    }
}
