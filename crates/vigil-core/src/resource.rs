//! Resource descriptor and property tree
//!
//! Rules inspect a semi-structured property bag reflecting the declared
//! state of a single infrastructure resource. The tree is a plain tagged
//! union so rules can navigate nested optional fields without reflection.
//! A field that is absent (`get` returns `None`) is distinct from a field
//! that is present but null (`Some(&ResourceValue::Null)`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A node in a resource property tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Sequence(Vec<ResourceValue>),
    Mapping(BTreeMap<String, ResourceValue>),
}

impl ResourceValue {
    /// Look up a key in a mapping node
    ///
    /// Returns `None` both when the key is absent and when `self` is not a
    /// mapping.
    pub fn get(&self, key: &str) -> Option<&ResourceValue> {
        match self {
            Self::Mapping(map) => map.get(key),
            _ => None,
        }
    }

    /// Navigate a dotted path, e.g. `"metadataOptions.httpTokens"`
    pub fn path(&self, path: &str) -> Option<&ResourceValue> {
        path.split('.').try_fold(self, |node, key| node.get(key))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[ResourceValue]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&BTreeMap<String, ResourceValue>> {
        match self {
            Self::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Shorthand for "path resolves to boolean true"
    pub fn is_true(&self, path: &str) -> bool {
        self.path(path).and_then(ResourceValue::as_bool) == Some(true)
    }
}

impl From<serde_json::Value> for ResourceValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::Sequence(items.into_iter().map(Into::into).collect())
            }
            serde_json::Value::Object(map) => {
                Self::Mapping(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

/// The type name plus property tree of a single resource under evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    /// Provider resource type, e.g. `aws:ec2/instance:Instance`
    pub resource_type: String,

    /// Declared properties of the resource
    pub properties: ResourceValue,

    /// Optional stable identifier used when reporting violations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urn: Option<String>,
}

impl ResourceDescriptor {
    /// Create a descriptor for a resource type and property tree
    pub fn new(resource_type: impl Into<String>, properties: ResourceValue) -> Self {
        Self {
            resource_type: resource_type.into(),
            properties,
            urn: None,
        }
    }

    /// Attach a stable resource identifier
    pub fn with_urn(mut self, urn: impl Into<String>) -> Self {
        self.urn = Some(urn.into());
        self
    }

    /// Check the provider resource type
    pub fn is_type(&self, resource_type: &str) -> bool {
        self.resource_type == resource_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_absent_and_null_are_distinct() {
        let tree: ResourceValue = json!({ "present": null }).into();

        assert!(tree.get("absent").is_none());
        assert_eq!(tree.get("present"), Some(&ResourceValue::Null));
        assert!(tree.get("present").is_some_and(ResourceValue::is_null));
    }

    #[test]
    fn test_path_navigation() {
        let tree: ResourceValue = json!({
            "metadataOptions": { "httpTokens": "required" }
        })
        .into();

        assert_eq!(
            tree.path("metadataOptions.httpTokens").and_then(ResourceValue::as_str),
            Some("required")
        );
        assert!(tree.path("metadataOptions.missing").is_none());
        assert!(tree.path("missing.httpTokens").is_none());
    }

    #[test]
    fn test_path_through_non_mapping_yields_none() {
        let tree: ResourceValue = json!({ "leaf": 42 }).into();
        assert!(tree.path("leaf.deeper").is_none());
        assert_eq!(tree.path("leaf").and_then(ResourceValue::as_f64), Some(42.0));
    }

    #[test]
    fn test_is_true() {
        let tree: ResourceValue = json!({
            "encrypted": true,
            "public": false,
            "name": "db"
        })
        .into();

        assert!(tree.is_true("encrypted"));
        assert!(!tree.is_true("public"));
        assert!(!tree.is_true("name"));
        assert!(!tree.is_true("absent"));
    }

    #[test]
    fn test_sequence_conversion() {
        let tree: ResourceValue = json!({ "items": [1, "two", true] }).into();
        let items = tree.get("items").and_then(ResourceValue::as_sequence).unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[1].as_str(), Some("two"));
    }

    #[test]
    fn test_mapping_access() {
        let tree: ResourceValue = json!({ "tags": { "env": "prod" } }).into();
        let tags = tree.get("tags").and_then(ResourceValue::as_mapping).unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags.get("env").and_then(ResourceValue::as_str), Some("prod"));
        assert!(tree.as_mapping().is_some());
        assert!(tree.get("tags").unwrap().get("env").unwrap().as_mapping().is_none());
    }

    #[test]
    fn test_descriptor_type_check() {
        let resource =
            ResourceDescriptor::new("aws:s3/bucket:Bucket", json!({}).into()).with_urn("bucket-1");
        assert!(resource.is_type("aws:s3/bucket:Bucket"));
        assert!(!resource.is_type("aws:ec2/instance:Instance"));
        assert_eq!(resource.urn.as_deref(), Some("bucket-1"));
    }
}
