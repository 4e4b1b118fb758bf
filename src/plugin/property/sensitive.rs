use openapi2crd_crd::JsonSchemaProps;
use serde_json::{json, Value};

use crate::extensions::{KUBERNETES_MAPPING, OPENAPI_MAPPING};
use crate::plugin::{PropertyPlugin, PropertyRequest};

pub const SENSITIVE_PREFIX: &str = "SENSITIVE FIELD";

/// Replaces sensitive fields with a reference to a key of a Kubernetes secret
#[derive(Debug, Default)]
pub struct SensitiveProperties;

impl SensitiveProperties {
    fn secret_ref(leaf: &str, description: Option<&str>) -> JsonSchemaProps {
        let mut key =
            JsonSchemaProps::string("Key of the secret data containing the sensitive field value.");
        key.default = Some(Value::String(format!(".data.{leaf}")));

        let description = match description {
            Some(original) if !original.is_empty() => format!("{SENSITIVE_PREFIX}\n\n{original}"),
            _ => SENSITIVE_PREFIX.to_string(),
        };

        let mut secret_ref = JsonSchemaProps::object(description);
        secret_ref.id = Some(format!("{leaf}SecretRef"));
        secret_ref.properties.insert(
            "name".to_string(),
            JsonSchemaProps::string("Name of the secret containing the sensitive field value."),
        );
        secret_ref.properties.insert("key".to_string(), key);
        secret_ref
    }
}

impl PropertyPlugin for SensitiveProperties {
    fn name(&self) -> &'static str {
        "sensitive_properties"
    }

    fn process(&self, request: &mut PropertyRequest<'_>) {
        let path = request.json_path();
        if !request
            .mapping
            .filters
            .sensitive_properties
            .contains(&path)
        {
            return;
        }

        let Some(leaf) = request.path.last().cloned() else {
            return;
        };
        let description = request
            .property
            .as_ref()
            .and_then(|p| p.description.clone());

        request.property = Some(Self::secret_ref(&leaf, description.as_deref()));

        // The secret reference has no sub-schema of the original left
        let node = request.extensions.node_mut(request.node);
        node.properties.clear();
        node.items = None;

        request.extensions.set_extension(
            request.node,
            KUBERNETES_MAPPING,
            json!({
                "type": {
                    "kind": "Secret",
                    "resource": "secrets",
                    "version": "v1",
                },
                "nameSelector": ".name",
                "propertySelectors": ["$.data.#"],
            }),
        );
        request.extensions.set_extension(
            request.node,
            OPENAPI_MAPPING,
            json!({
                "property": path,
                "type": request.schema.type_name().unwrap_or_default(),
            }),
        );
    }
}
