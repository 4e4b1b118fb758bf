//! CustomResourceDefinition document model

use crate::types::JsonSchemaProps;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// API version of the rendered CRD documents
pub const CRD_API_VERSION: &str = "apiextensions.k8s.io/v1";

/// A CustomResourceDefinition under construction.
///
/// The model keeps a single `spec.validation` schema shared by every served
/// version; [`CustomResourceDefinition::to_v1`] renders it in the
/// per-version layout the API server expects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomResourceDefinition {
    pub metadata: ObjectMeta,
    pub spec: CustomResourceDefinitionSpec,
    #[serde(default)]
    pub status: CustomResourceDefinitionStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomResourceDefinitionSpec {
    pub group: String,
    pub names: CustomResourceDefinitionNames,
    pub scope: ResourceScope,
    #[serde(default)]
    pub versions: Vec<CustomResourceDefinitionVersion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<CustomResourceValidation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subresources: Option<CustomResourceSubresources>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_printer_columns: Vec<PrinterColumn>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preserve_unknown_fields: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomResourceDefinitionNames {
    pub plural: String,
    pub singular: String,
    pub kind: String,
    pub list_kind: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub short_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceScope {
    #[default]
    Namespaced,
    Cluster,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomResourceDefinitionVersion {
    pub name: String,
    pub served: bool,
    pub storage: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomResourceValidation {
    #[serde(rename = "openAPIV3Schema")]
    pub open_api_v3_schema: JsonSchemaProps,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomResourceSubresources {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusSubresource>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSubresource {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrinterColumn {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub json_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomResourceDefinitionStatus {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stored_versions: Vec<String>,
}

impl CustomResourceDefinition {
    /// Root of the validation schema, if the skeleton has been created
    pub fn schema(&self) -> Option<&JsonSchemaProps> {
        self.spec
            .validation
            .as_ref()
            .map(|v| &v.open_api_v3_schema)
    }

    pub fn schema_mut(&mut self) -> Option<&mut JsonSchemaProps> {
        self.spec
            .validation
            .as_mut()
            .map(|v| &mut v.open_api_v3_schema)
    }

    /// The `spec` node of the validation schema
    pub fn spec_props_mut(&mut self) -> Option<&mut JsonSchemaProps> {
        self.schema_mut()?.property_mut("spec")
    }

    /// The `status` node of the validation schema
    pub fn status_props_mut(&mut self) -> Option<&mut JsonSchemaProps> {
        self.schema_mut()?.property_mut("status")
    }

    /// Render as an `apiextensions.k8s.io/v1` document.
    ///
    /// The shared schema, printer columns and subresources are copied onto
    /// every version entry.
    pub fn to_v1(&self) -> Value {
        let schema = self
            .schema()
            .map(|s| serde_json::to_value(s).unwrap_or(Value::Null));

        let versions: Vec<Value> = self
            .spec
            .versions
            .iter()
            .map(|version| {
                let mut entry = json!({
                    "name": version.name,
                    "served": version.served,
                    "storage": version.storage,
                });
                if let Some(schema) = &schema {
                    entry["schema"] = json!({ "openAPIV3Schema": schema });
                }
                if !self.spec.additional_printer_columns.is_empty() {
                    entry["additionalPrinterColumns"] =
                        json!(self.spec.additional_printer_columns);
                }
                if let Some(subresources) = &self.spec.subresources {
                    entry["subresources"] = json!(subresources);
                }
                entry
            })
            .collect();

        let mut metadata = json!({ "name": self.metadata.name });
        if !self.metadata.annotations.is_empty() {
            metadata["annotations"] = json!(self.metadata.annotations);
        }

        json!({
            "apiVersion": CRD_API_VERSION,
            "kind": "CustomResourceDefinition",
            "metadata": metadata,
            "spec": {
                "group": self.spec.group,
                "names": self.spec.names,
                "scope": self.spec.scope,
                "versions": versions,
            },
        })
    }
}
