use crate::{Error, Result};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, Time};
use serde_json::Value;

/// Resource version given to seeded objects that carry none
pub const SEED_RESOURCE_VERSION: &str = "999";

pub fn increment_resource_version(current: &str) -> Result<String> {
    match current {
        "" => Ok("1".to_string()),
        SEED_RESOURCE_VERSION => Ok("1".to_string()),
        v => {
            let num: u64 = v
                .parse()
                .map_err(|_| Error::Internal(format!("Invalid resource version: {}", v)))?;
            Ok((num + 1).to_string())
        }
    }
}

pub fn should_be_deleted(meta: &ObjectMeta) -> bool {
    meta.deletion_timestamp.is_some() && meta.finalizers.as_ref().is_none_or(Vec::is_empty)
}

/// Current time at second precision, as the API server stamps it
pub fn now() -> Result<Time> {
    let stamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    Ok(serde_json::from_value(Value::String(stamp))?)
}

/// Fill in the server-populated identity fields of a newly stored object
pub fn ensure_metadata(meta: &mut ObjectMeta) -> Result<()> {
    if meta.namespace.as_deref() == Some("") {
        meta.namespace = None;
    }
    if meta.creation_timestamp.is_none() {
        meta.creation_timestamp = Some(now()?);
    }
    if meta.uid.is_none() {
        meta.uid = Some(uuid::Uuid::new_v4().to_string());
    }
    Ok(())
}
