//! Patch payloads and their application

use crate::object::GenericObject;
use crate::Result;
use bytes::Bytes;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// Patch types, named after the content type a real client would send
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(clippy::enum_variant_names)]
pub enum PatchType {
    /// RFC 6902 JSON Patch - application/json-patch+json
    JsonPatch,
    /// RFC 7386 JSON Merge Patch - application/merge-patch+json
    MergePatch,
    /// Kubernetes Strategic Merge Patch - application/strategic-merge-patch+json
    StrategicMergePatch,
}

impl PatchType {
    pub fn content_type(&self) -> &'static str {
        match self {
            PatchType::JsonPatch => "application/json-patch+json",
            PatchType::MergePatch => "application/merge-patch+json",
            PatchType::StrategicMergePatch => "application/strategic-merge-patch+json",
        }
    }
}

impl fmt::Display for PatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.content_type())
    }
}

/// A patch passed to `FakeClient::patch`
///
/// Every variant resolves to a [`PatchType`] tag and a byte payload.
#[derive(Debug, Clone)]
pub enum Patch {
    Merge(Value),
    Strategic(Value),
    Json(json_patch::Patch),
    /// Merge patch computed from this snapshot to the object being patched
    MergeFrom(Value),
    Raw { patch_type: PatchType, data: Bytes },
}

impl Patch {
    /// Snapshot `original`; the patch becomes the difference between the
    /// snapshot and whatever object it is applied with
    pub fn merge_from<K: Serialize>(original: &K) -> Result<Self> {
        Ok(Patch::MergeFrom(serde_json::to_value(original)?))
    }

    pub fn patch_type(&self) -> PatchType {
        match self {
            Patch::Merge(_) | Patch::MergeFrom(_) => PatchType::MergePatch,
            Patch::Strategic(_) => PatchType::StrategicMergePatch,
            Patch::Json(_) => PatchType::JsonPatch,
            Patch::Raw { patch_type, .. } => *patch_type,
        }
    }

    /// Payload bytes for a patch against `current`
    pub fn data(&self, current: &GenericObject) -> Result<Bytes> {
        let data = match self {
            Patch::Merge(value) | Patch::Strategic(value) => serde_json::to_vec(value)?,
            Patch::Json(ops) => serde_json::to_vec(ops)?,
            Patch::MergeFrom(original) => {
                let modified = Value::Object(current.as_map().clone());
                serde_json::to_vec(&merge_patch_diff(original, &modified))?
            }
            Patch::Raw { data, .. } => return Ok(data.clone()),
        };
        Ok(Bytes::from(data))
    }
}

/// Apply patch bytes to a document in place
pub fn apply_patch(existing: &mut Value, patch_type: PatchType, data: &[u8]) -> Result<()> {
    match patch_type {
        PatchType::JsonPatch => {
            let ops: json_patch::Patch = serde_json::from_slice(data)?;
            json_patch::patch(existing, &ops)?;
        }
        PatchType::MergePatch => {
            let patch: Value = serde_json::from_slice(data)?;
            json_patch::merge(existing, &patch);
        }
        PatchType::StrategicMergePatch => {
            // Full strategic merge needs per-field patch strategies from the schema
            let patch: Value = serde_json::from_slice(data)?;
            json_patch::merge(existing, &patch);
        }
    }
    Ok(())
}

/// RFC 7386 merge patch that turns `original` into `modified`
pub fn merge_patch_diff(original: &Value, modified: &Value) -> Value {
    let (Value::Object(original), Value::Object(modified)) = (original, modified) else {
        return modified.clone();
    };

    let mut patch = Map::new();
    for key in original.keys() {
        if !modified.contains_key(key) {
            patch.insert(key.clone(), Value::Null);
        }
    }
    for (key, new_value) in modified {
        match original.get(key) {
            Some(old_value) if old_value == new_value => {}
            Some(old_value) if old_value.is_object() && new_value.is_object() => {
                patch.insert(key.clone(), merge_patch_diff(old_value, new_value));
            }
            _ => {
                patch.insert(key.clone(), new_value.clone());
            }
        }
    }
    Value::Object(patch)
}
