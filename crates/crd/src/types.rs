//! CRD schema node types

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Formats accepted by the Kubernetes API server in structural schemas
pub const SUPPORTED_FORMATS: &[&str] = &[
    "int32",
    "int64",
    "float",
    "double",
    "byte",
    "date",
    "date-time",
    "password",
];

/// One node of a CRD OpenAPI v3 validation schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonSchemaProps {
    /// Emitted property key override, consumed by the parent and never serialized
    #[serde(skip)]
    pub id: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,

    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_: Vec<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<f64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<JsonSchemaProps>>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, JsonSchemaProps>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<JsonSchemaPropsOrBool>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<JsonSchemaProps>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<JsonSchemaProps>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<JsonSchemaProps>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not: Option<Box<JsonSchemaProps>>,

    #[serde(
        rename = "x-kubernetes-preserve-unknown-fields",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub x_kubernetes_preserve_unknown_fields: Option<bool>,

    #[serde(
        rename = "x-kubernetes-list-type",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub x_kubernetes_list_type: Option<String>,

    #[serde(
        rename = "x-kubernetes-list-map-keys",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub x_kubernetes_list_map_keys: Vec<String>,

    #[serde(
        rename = "x-kubernetes-validations",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub x_kubernetes_validations: Vec<ValidationRule>,
}

/// `additionalProperties` is either a schema or a boolean
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonSchemaPropsOrBool {
    Bool(bool),
    Schema(Box<JsonSchemaProps>),
}

/// A CEL validation rule attached to a schema node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRule {
    pub rule: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
}

impl ValidationRule {
    pub fn new(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            message: message.into(),
        }
    }
}

impl JsonSchemaProps {
    /// An object node with a description and no properties
    pub fn object(description: impl Into<String>) -> Self {
        Self {
            type_: Some("object".to_string()),
            description: Some(description.into()),
            ..Default::default()
        }
    }

    /// A string node with a description
    pub fn string(description: impl Into<String>) -> Self {
        Self {
            type_: Some("string".to_string()),
            description: Some(description.into()),
            ..Default::default()
        }
    }

    pub fn type_name(&self) -> &str {
        self.type_.as_deref().unwrap_or("")
    }

    pub fn is_object(&self) -> bool {
        self.type_name() == "object"
    }

    pub fn property(&self, key: &str) -> Option<&JsonSchemaProps> {
        self.properties.get(key)
    }

    pub fn property_mut(&mut self, key: &str) -> Option<&mut JsonSchemaProps> {
        self.properties.get_mut(key)
    }

    /// Follow a chain of property keys from this node
    pub fn descend(&self, keys: &[&str]) -> Option<&JsonSchemaProps> {
        let mut node = self;
        for key in keys {
            node = node.properties.get(*key)?;
        }
        Some(node)
    }

    pub fn descend_mut(&mut self, keys: &[&str]) -> Option<&mut JsonSchemaProps> {
        let mut node = self;
        for key in keys {
            node = node.properties.get_mut(*key)?;
        }
        Some(node)
    }

    /// Whether this node accepts arbitrary fields
    pub fn preserves_unknown_fields(&self) -> bool {
        self.x_kubernetes_preserve_unknown_fields == Some(true)
    }

    /// Add a validation rule unless an identical one is already present
    pub fn add_validation(&mut self, rule: ValidationRule) {
        if !self.x_kubernetes_validations.contains(&rule) {
            self.x_kubernetes_validations.push(rule);
        }
    }

    /// Add a key to `required`, keeping the list sorted and free of duplicates
    pub fn add_required(&mut self, key: &str) {
        if !self.required.iter().any(|r| r == key) {
            self.required.push(key.to_string());
            self.required.sort();
        }
    }

    pub fn remove_required(&mut self, key: &str) {
        self.required.retain(|r| r != key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_serialization_skips_empty_fields() {
        let mut props = JsonSchemaProps::object("An object");
        props
            .properties
            .insert("name".to_string(), JsonSchemaProps::string("A name"));
        props.id = Some("renamed".to_string());

        let value = serde_json::to_value(&props).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "type": "object",
                "description": "An object",
                "properties": {
                    "name": {"type": "string", "description": "A name"}
                }
            })
        );
    }

    #[test]
    fn test_additional_properties_forms() {
        let allows: JsonSchemaPropsOrBool = serde_json::from_str("true").unwrap();
        assert_eq!(allows, JsonSchemaPropsOrBool::Bool(true));

        let schema: JsonSchemaPropsOrBool = serde_json::from_str(r#"{"type":"string"}"#).unwrap();
        match schema {
            JsonSchemaPropsOrBool::Schema(props) => assert_eq!(props.type_name(), "string"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_required_helpers_keep_sorted_set() {
        let mut props = JsonSchemaProps::object("");
        props.add_required("b");
        props.add_required("a");
        props.add_required("b");
        assert_eq!(props.required, vec!["a", "b"]);

        props.remove_required("a");
        assert_eq!(props.required, vec!["b"]);
    }

    #[test]
    fn test_add_validation_deduplicates() {
        let mut props = JsonSchemaProps::object("");
        props.add_validation(ValidationRule::new("self == oldSelf", "immutable"));
        props.add_validation(ValidationRule::new("self == oldSelf", "immutable"));
        assert_eq!(props.x_kubernetes_validations.len(), 1);
    }

    #[test]
    fn test_descend_mut() {
        let mut root = JsonSchemaProps::object("root");
        let mut spec = JsonSchemaProps::object("spec");
        spec.properties
            .insert("v1".to_string(), JsonSchemaProps::object("v1"));
        root.properties.insert("spec".to_string(), spec);

        assert!(root.descend_mut(&["spec", "v1"]).is_some());
        assert!(root.descend_mut(&["spec", "v2"]).is_none());
    }
}
