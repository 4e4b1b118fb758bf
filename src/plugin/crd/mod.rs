//! CRD skeleton plugin

use openapi2crd_crd::{
    CustomResourceDefinition, CustomResourceDefinitionNames, CustomResourceDefinitionSpec,
    CustomResourceDefinitionStatus, CustomResourceDefinitionVersion, CustomResourceSubresources,
    CustomResourceValidation, JsonSchemaProps, ObjectMeta, ResourceScope, StatusSubresource,
};
use tracing::debug;

use crate::config::{CrdConfig, Gvk};
use crate::plugin::{CrdPlugin, CrdRequest, PluginError};

const API_CONVENTIONS: &str = "More info: https://git.k8s.io/community/contributors/devel/sig-architecture/api-conventions.md#spec-and-status";

/// Plural and singular resource names for a kind, e.g. `cities` and `city` for `City`
pub fn guess_kind_to_resource(gvk: &Gvk) -> (String, String) {
    if gvk.kind.is_empty() {
        return (String::new(), String::new());
    }
    let singular = gvk.kind.to_lowercase();
    (cruet::to_plural(&singular), singular)
}

/// Builds names, versions, subresources and the `spec`/`status` schema roots
#[derive(Debug, Default)]
pub struct Base;

impl Base {
    fn spec_description(singular: &str, config: &CrdConfig) -> String {
        let versions: Vec<String> = config
            .major_versions()
            .iter()
            .map(|v| format!("- {v}"))
            .collect();
        format!(
            "Specification of the {singular} supporting the following versions:\n\n{}\n\nAt most one versioned spec can be specified. {API_CONVENTIONS}",
            versions.join("\n")
        )
    }

    fn status_schema(singular: &str) -> JsonSchemaProps {
        let mut status = JsonSchemaProps::object(format!(
            "Most recently observed read-only status of the {singular} for the specified resource version. This data may not be up to date and is populated by the system. {API_CONVENTIONS}"
        ));
        status
            .properties
            .insert("conditions".to_string(), conditions_schema());
        status
    }
}

/// `status.conditions`, a list map keyed by condition type
pub fn conditions_schema() -> JsonSchemaProps {
    let mut condition = JsonSchemaProps {
        type_: Some("object".to_string()),
        required: vec!["type".to_string(), "status".to_string()],
        ..Default::default()
    };
    let fields = [
        ("type", "string", None, "Type of condition."),
        (
            "status",
            "string",
            None,
            "Status of the condition, one of True, False, Unknown.",
        ),
        (
            "lastTransitionTime",
            "string",
            Some("date-time"),
            "Last time the condition transitioned from one status to another.",
        ),
        (
            "reason",
            "string",
            None,
            "The reason for the condition's last transition.",
        ),
        (
            "message",
            "string",
            None,
            "A human readable message indicating details about the transition.",
        ),
        (
            "observedGeneration",
            "integer",
            None,
            "observedGeneration represents the .metadata.generation that the condition was set based upon.",
        ),
    ];
    for (name, type_, format, description) in fields {
        condition.properties.insert(
            name.to_string(),
            JsonSchemaProps {
                type_: Some(type_.to_string()),
                format: format.map(str::to_string),
                description: Some(description.to_string()),
                ..Default::default()
            },
        );
    }

    JsonSchemaProps {
        type_: Some("array".to_string()),
        description: Some(
            "Represents the latest available observations of a resource's current state."
                .to_string(),
        ),
        items: Some(Box::new(condition)),
        x_kubernetes_list_type: Some("map".to_string()),
        x_kubernetes_list_map_keys: vec!["type".to_string()],
        ..Default::default()
    }
}

impl CrdPlugin for Base {
    fn name(&self) -> &'static str {
        "base"
    }

    fn process(&self, request: &mut CrdRequest<'_>) -> Result<(), PluginError> {
        let config = request.crd_config;
        let gvk = &config.gvk;
        let (plural, singular) = guess_kind_to_resource(gvk);
        debug!("Creating CRD skeleton for {}.{}", plural, gvk.group);

        let mut root = JsonSchemaProps::object(format!(
            "A {singular}, managed by the MongoDB Kubernetes Atlas Operator."
        ));
        root.properties.insert(
            "spec".to_string(),
            JsonSchemaProps::object(Self::spec_description(&singular, config)),
        );
        root.properties
            .insert("status".to_string(), Self::status_schema(&singular));

        *request.crd = CustomResourceDefinition {
            metadata: ObjectMeta {
                name: format!("{plural}.{}", gvk.group),
                ..Default::default()
            },
            spec: CustomResourceDefinitionSpec {
                group: gvk.group.clone(),
                names: CustomResourceDefinitionNames {
                    plural,
                    singular,
                    kind: gvk.kind.clone(),
                    list_kind: format!("{}List", gvk.kind),
                    short_names: config.short_names.clone(),
                    categories: config.categories.clone(),
                },
                scope: ResourceScope::Namespaced,
                versions: vec![CustomResourceDefinitionVersion {
                    name: gvk.version.clone(),
                    served: true,
                    storage: true,
                }],
                validation: Some(CustomResourceValidation {
                    open_api_v3_schema: root,
                }),
                subresources: Some(CustomResourceSubresources {
                    status: Some(StatusSubresource {}),
                }),
                additional_printer_columns: Vec::new(),
                preserve_unknown_fields: Some(false),
            },
            status: CustomResourceDefinitionStatus {
                stored_versions: vec![gvk.version.clone()],
            },
        };

        Ok(())
    }
}
