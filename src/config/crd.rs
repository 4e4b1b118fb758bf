//! CRD definition and mapping configuration

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Group, version and kind of a generated resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gvk {
    pub group: String,
    pub version: String,
    pub kind: String,
}

/// One generated CustomResourceDefinition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrdConfig {
    pub gvk: Gvk,

    #[serde(default)]
    pub categories: Vec<String>,

    #[serde(default)]
    pub short_names: Vec<String>,

    /// Plugin set to run, the default set when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin_set: Option<String>,

    /// One mapping per supported major version
    #[serde(default)]
    pub mappings: Vec<CrdMapping>,
}

impl CrdConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gvk.kind.is_empty() || self.gvk.group.is_empty() || self.gvk.version.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "CRD {:?}: gvk group, version and kind must all be set",
                self.gvk.kind
            )));
        }

        for mapping in &self.mappings {
            if mapping.major_version.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "CRD {}: mapping major version cannot be empty",
                    self.gvk.kind
                )));
            }
        }

        Ok(())
    }

    /// Configured major versions, in declaration order
    pub fn major_versions(&self) -> Vec<&str> {
        self.mappings
            .iter()
            .map(|m| m.major_version.as_str())
            .collect()
    }
}

/// Name of another object in the same document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalObjectReference {
    pub name: String,
}

/// One API major version surface of a resource
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrdMapping {
    pub major_version: String,

    #[serde(rename = "openAPIRef")]
    pub openapi_ref: LocalObjectReference,

    #[serde(default)]
    pub parameters_mapping: PropertyMapping,

    #[serde(default)]
    pub entry_mapping: PropertyMapping,

    #[serde(default)]
    pub status_mapping: PropertyMapping,
}

/// Drives one call into the property converter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyMapping {
    /// Name of a schema under `components.schemas`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    #[serde(default)]
    pub path: PropertyPath,

    #[serde(default)]
    pub filters: Filters,

    #[serde(default)]
    pub references: Vec<Reference>,
}

impl PropertyMapping {
    /// The configured schema name, ignoring empty strings
    pub fn schema_name(&self) -> Option<&str> {
        self.schema.as_deref().filter(|s| !s.is_empty())
    }
}

/// An HTTP operation of the OpenAPI document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyPath {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub verb: String,

    #[serde(default)]
    pub request_body: RequestBody,
}

impl PropertyPath {
    pub fn is_set(&self) -> bool {
        !self.name.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBody {
    #[serde(default)]
    pub mime_type: String,
}

/// Property filters applied by the property plugins
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filters {
    /// Keep only read-only properties
    #[serde(default)]
    pub read_only: bool,

    /// Drop read-only properties
    #[serde(default)]
    pub read_write_only: bool,

    /// JSON paths of properties to drop
    #[serde(default)]
    pub skip_properties: Vec<String>,

    /// JSON paths of properties replaced by secret references
    #[serde(default)]
    pub sensitive_properties: Vec<String>,
}

/// A cross-resource pointer field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// Name of the generated reference property
    pub name: String,

    /// JSON path of the source property the reference supersedes
    pub property: String,

    pub target: Target,
}

impl Reference {
    /// Last segment of the source property path, e.g. `groupId` for `$.groupId`
    pub fn property_leaf(&self) -> &str {
        crate::utils::leaf_name(&self.property)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    #[serde(rename = "type")]
    pub type_: TargetType,

    /// Candidate properties of the target, in priority order
    #[serde(default)]
    pub properties: Vec<String>,
}

/// Resource type descriptor of a reference target
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetType {
    pub kind: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub group: String,

    pub version: String,

    pub resource: String,
}
