//! Round-trip codec
//!
//! Results are handed back to callers the way a real client receives them:
//! serialized to bytes, then decoded into the caller's typed object. Anything
//! the target type does not declare is lost on the way, and a payload of the
//! wrong kind is rejected instead of being silently coerced.

use crate::object::GenericObject;
use crate::scheme::{Scheme, TypeDescriptor};
use crate::{Error, Result};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::any::type_name;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TypeMeta {
    #[serde(default)]
    api_version: Option<String>,
    #[serde(default)]
    kind: Option<String>,
}

/// Serialize a generic object to its wire form
pub fn encode(object: &GenericObject) -> Result<Bytes> {
    let data = serde_json::to_vec(object)
        .map_err(|e| Error::Conversion(format!("failed to encode object: {}", e)))?;
    Ok(Bytes::from(data))
}

/// Decode wire bytes into `target`, replacing its previous contents
///
/// When the target type is registered, the payload's `apiVersion`/`kind`
/// (if present) must match the registration.
pub fn decode_into<K>(scheme: &Scheme, data: &[u8], target: &mut K) -> Result<()>
where
    K: DeserializeOwned + 'static,
{
    let type_meta: TypeMeta = serde_json::from_slice(data)
        .map_err(|e| Error::Conversion(format!("failed to read type information: {}", e)))?;

    if let Ok(expected) = scheme.descriptor_of::<K>() {
        check_type_meta(&type_meta, &expected)?;
    }

    *target = serde_json::from_slice(data).map_err(|e| {
        Error::Conversion(format!("failed to decode into {}: {}", type_name::<K>(), e))
    })?;
    Ok(())
}

fn check_type_meta(found: &TypeMeta, expected: &TypeDescriptor) -> Result<()> {
    if let Some(kind) = found.kind.as_deref().filter(|k| !k.is_empty()) {
        if kind != expected.kind {
            return Err(Error::Conversion(format!(
                "cannot decode kind {} into {}",
                kind, expected
            )));
        }
    }
    if let Some(api_version) = found.api_version.as_deref().filter(|v| !v.is_empty()) {
        if api_version != expected.api_version() {
            return Err(Error::Conversion(format!(
                "cannot decode apiVersion {} into {}",
                api_version, expected
            )));
        }
    }
    Ok(())
}
