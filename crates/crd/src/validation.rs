//! Structural validation of generated CRDs

use crate::schema::CustomResourceDefinition;
use crate::types::{JsonSchemaProps, JsonSchemaPropsOrBool, SUPPORTED_FORMATS};
use tracing::debug;

/// Validates a finished CRD, returning one message per violation
pub trait CrdValidator: Send + Sync {
    fn validate(&self, crd: &CustomResourceDefinition) -> Vec<String>;
}

/// Checks the subset of API-server rules that generated CRDs can violate:
/// naming, versions, and structural-schema constraints.
#[derive(Debug, Clone, Default)]
pub struct StructuralValidator;

impl StructuralValidator {
    pub fn new() -> Self {
        Self
    }

    fn validate_names(&self, crd: &CustomResourceDefinition, errors: &mut Vec<String>) {
        let names = &crd.spec.names;

        if names.kind.is_empty() {
            errors.push("spec.names.kind: Required value".to_string());
        }

        if names.plural.is_empty() {
            errors.push("spec.names.plural: Required value".to_string());
        } else if names.plural != names.plural.to_lowercase() {
            errors.push(format!(
                "spec.names.plural: Invalid value: {:?}: must be lowercase",
                names.plural
            ));
        }

        let expected = format!("{}.{}", names.plural, crd.spec.group);
        if crd.metadata.name != expected {
            errors.push(format!(
                "metadata.name: Invalid value: {:?}: must be spec.names.plural+\".\"+spec.group ({:?})",
                crd.metadata.name, expected
            ));
        }
    }

    fn validate_versions(&self, crd: &CustomResourceDefinition, errors: &mut Vec<String>) {
        if crd.spec.versions.is_empty() {
            errors.push("spec.versions: Invalid value: must have at least one version".to_string());
            return;
        }

        let storage = crd.spec.versions.iter().filter(|v| v.storage).count();
        if storage != 1 {
            errors.push(format!(
                "spec.versions: Invalid value: must have exactly one version marked as storage version, found {storage}"
            ));
        }
    }

    fn validate_schema(&self, crd: &CustomResourceDefinition, errors: &mut Vec<String>) {
        let Some(root) = crd.schema() else {
            errors.push("spec.validation.openAPIV3Schema: Required value".to_string());
            return;
        };

        if root.type_name() != "object" {
            errors.push(
                "spec.validation.openAPIV3Schema.type: Unsupported value: must be object at the root"
                    .to_string(),
            );
        }

        self.validate_node(root, "spec.validation.openAPIV3Schema", errors);
    }

    fn validate_node(&self, node: &JsonSchemaProps, path: &str, errors: &mut Vec<String>) {
        if node.type_.is_none() && !node.preserves_unknown_fields() {
            errors.push(format!("{path}.type: Required value: must not be empty for specified object fields"));
        }

        if let Some(format) = &node.format {
            if !SUPPORTED_FORMATS.contains(&format.as_str()) {
                errors.push(format!("{path}.format: Unsupported value: {format:?}"));
            }
        }

        if node.type_name() == "array" && node.items.is_none() {
            errors.push(format!("{path}.items: Required value: must be specified for array types"));
        }

        if !node.properties.is_empty() && node.additional_properties.is_some() {
            errors.push(format!(
                "{path}.additionalProperties: Forbidden: additionalProperties and properties are mutual exclusive"
            ));
        }

        for required in &node.required {
            if !node.properties.contains_key(required) && !node.preserves_unknown_fields() {
                errors.push(format!(
                    "{path}.required: Invalid value: {required:?}: no such property"
                ));
            }
        }

        for rule in &node.x_kubernetes_validations {
            if rule.rule.trim().is_empty() {
                errors.push(format!("{path}.x-kubernetes-validations: Required value: rule is empty"));
            }
        }

        for (key, child) in &node.properties {
            self.validate_node(child, &format!("{path}.properties[{key}]"), errors);
        }

        if let Some(items) = &node.items {
            self.validate_node(items, &format!("{path}.items"), errors);
        }

        if let Some(JsonSchemaPropsOrBool::Schema(additional)) = &node.additional_properties {
            self.validate_node(additional, &format!("{path}.additionalProperties"), errors);
        }

        for (name, branches) in [
            ("allOf", &node.all_of),
            ("oneOf", &node.one_of),
            ("anyOf", &node.any_of),
        ] {
            for (i, branch) in branches.iter().enumerate() {
                self.validate_branch(branch, &format!("{path}.{name}[{i}]"), errors);
            }
        }
    }

    /// Junctor branches may omit `type`, but still must not carry unknown formats
    fn validate_branch(&self, node: &JsonSchemaProps, path: &str, errors: &mut Vec<String>) {
        if let Some(format) = &node.format {
            if !SUPPORTED_FORMATS.contains(&format.as_str()) {
                errors.push(format!("{path}.format: Unsupported value: {format:?}"));
            }
        }
        for (key, child) in &node.properties {
            self.validate_node(child, &format!("{path}.properties[{key}]"), errors);
        }
    }
}

impl CrdValidator for StructuralValidator {
    fn validate(&self, crd: &CustomResourceDefinition) -> Vec<String> {
        debug!("Validating CRD {}", crd.metadata.name);

        let mut errors = Vec::new();
        self.validate_names(crd, &mut errors);
        self.validate_versions(crd, &mut errors);
        self.validate_schema(crd, &mut errors);

        for column in &crd.spec.additional_printer_columns {
            if !column.json_path.starts_with('.') {
                errors.push(format!(
                    "spec.additionalPrinterColumns[{}].jsonPath: Invalid value: {:?}: must be a simple json path starting with .",
                    column.name, column.json_path
                ));
            }
        }

        errors
    }
}
