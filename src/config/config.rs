//! Main configuration structure and implementation

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::{CrdConfig, PluginSetDeclaration};

/// Required value of the document `kind`
pub const KIND: &str = "Config";

/// Required value of the document `apiVersion`
pub const API_VERSION: &str = "atlas2crd.mongodb.com/v1alpha1";

/// Errors raised while reading or validating a configuration document
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("unsupported configuration document {kind:?} {api_version:?}, expected kind {KIND:?} and apiVersion {API_VERSION:?}")]
    Discriminator { kind: String, api_version: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Document kind, always `Config`
    pub kind: String,

    /// Document API version
    pub api_version: String,

    pub spec: ConfigSpec,
}

/// Body of the configuration document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSpec {
    /// Loadable OpenAPI documents
    #[serde(default)]
    pub openapi: Vec<OpenApiDefinition>,

    /// One entry per generated CRD
    #[serde(default)]
    pub crd: Vec<CrdConfig>,

    /// Named plugin sets
    #[serde(default)]
    pub plugin_sets: Vec<PluginSetDeclaration>,

    /// Abort the run on the first failing CRD instead of continuing with the rest
    #[serde(default)]
    pub fail_fast: bool,
}

/// A named, loadable OpenAPI document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenApiDefinition {
    pub name: String,

    /// Local path or URI of the document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Versioned API-client package reference, `module@version`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_str(&content)
    }

    /// Parse and validate a configuration document
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.kind != KIND || self.api_version != API_VERSION {
            return Err(ConfigError::Discriminator {
                kind: self.kind.clone(),
                api_version: self.api_version.clone(),
            });
        }

        let mut names = HashSet::new();
        for definition in &self.spec.openapi {
            definition.validate()?;
            if !names.insert(definition.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate OpenAPI definition name {:?}",
                    definition.name
                )));
            }
        }

        for crd in &self.spec.crd {
            crd.validate()?;
            for mapping in &crd.mappings {
                if !names.contains(mapping.openapi_ref.name.as_str()) {
                    return Err(ConfigError::Invalid(format!(
                        "CRD {}: mapping {} references undeclared OpenAPI definition {:?}",
                        crd.gvk.kind, mapping.major_version, mapping.openapi_ref.name
                    )));
                }
            }
        }

        Ok(())
    }

    /// Look up an OpenAPI definition by name
    pub fn definition(&self, name: &str) -> Option<&OpenApiDefinition> {
        self.spec.openapi.iter().find(|d| d.name == name)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            kind: KIND.to_string(),
            api_version: API_VERSION.to_string(),
            spec: ConfigSpec::default(),
        }
    }
}

impl OpenApiDefinition {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.is_empty() {
            return Err(ConfigError::Invalid(
                "OpenAPI definition name cannot be empty".to_string(),
            ));
        }

        match (&self.path, &self.package) {
            (Some(_), None) | (None, Some(_)) => Ok(()),
            _ => Err(ConfigError::Invalid(format!(
                "OpenAPI definition {:?} must set exactly one of path or package",
                self.name
            ))),
        }
    }
}
