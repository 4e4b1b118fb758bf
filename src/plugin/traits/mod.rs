//! Stage traits and their requests
//!
//! Every pipeline stage has its own trait and request shape. A plugin
//! implements exactly one stage.

use openapi2crd_crd::{CustomResourceDefinition, JsonSchemaProps};

use crate::config::{CrdConfig, CrdMapping, PropertyMapping};
use crate::converter::Converter;
use crate::extensions::{ExtensionsTree, NodeId};
use crate::openapi::{OpenApiDocument, Schema};
use crate::plugin::PluginError;

/// Builds the CRD skeleton, once per CRD
pub trait CrdPlugin: Send + Sync {
    fn name(&self) -> &'static str;

    fn process(&self, request: &mut CrdRequest<'_>) -> Result<(), PluginError>;
}

/// Processes one major-version mapping against the CRD under construction
pub trait MappingPlugin: Send + Sync {
    fn name(&self) -> &'static str;

    fn process(&self, request: &mut MappingRequest<'_>) -> Result<(), PluginError>;
}

/// Rewrites, filters or annotates a single converted schema node
pub trait PropertyPlugin: Send + Sync {
    fn name(&self) -> &'static str;

    /// Setting `request.property` to `None` drops the node
    fn process(&self, request: &mut PropertyRequest<'_>);
}

/// Writes annotations into the extensions tree after a mapping is processed
pub trait ExtensionPlugin: Send + Sync {
    fn name(&self) -> &'static str;

    fn process(&self, request: &mut ExtensionRequest<'_>) -> Result<(), PluginError>;
}

pub struct CrdRequest<'a> {
    pub crd: &'a mut CustomResourceDefinition,
    pub crd_config: &'a CrdConfig,
    pub extensions: &'a mut ExtensionsTree,
}

pub struct MappingRequest<'a> {
    pub crd: &'a mut CustomResourceDefinition,
    pub crd_config: &'a CrdConfig,
    pub mapping: &'a CrdMapping,
    pub openapi: &'a OpenApiDocument,
    pub extensions: &'a mut ExtensionsTree,
    pub converter: &'a dyn Converter,
}

impl MappingRequest<'_> {
    /// `spec.<majorVersion>` of the CRD schema
    pub fn version_props_mut(&mut self) -> Result<&mut JsonSchemaProps, PluginError> {
        let version = self.mapping.major_version.as_str();
        self.crd
            .spec_props_mut()
            .ok_or(PluginError::MissingNode("spec"))?
            .property_mut(version)
            .ok_or_else(|| PluginError::VersionNotFound(version.to_string()))
    }

    /// Extensions node mirroring `spec.<majorVersion>`
    pub fn version_extensions(&mut self) -> NodeId {
        let root = self.extensions.root();
        self.extensions
            .descend(root, &["spec", self.mapping.major_version.as_str()])
    }
}

pub struct PropertyRequest<'a> {
    /// Node produced by the converter, `None` once dropped
    pub property: Option<JsonSchemaProps>,
    /// Resolved source schema of the node
    pub schema: &'a Schema,
    pub document: &'a OpenApiDocument,
    pub mapping: &'a PropertyMapping,
    pub extensions: &'a mut ExtensionsTree,
    /// Extensions node of the converted node
    pub node: NodeId,
    pub path: &'a [String],
}

impl PropertyRequest<'_> {
    /// Rendered JSON path of the node
    pub fn json_path(&self) -> String {
        crate::utils::json_path(self.path)
    }

    /// Resolved source schema of a child property
    pub fn child_schema(&self, key: &str) -> Option<&Schema> {
        self.document.resolve(self.schema.properties.get(key)?)
    }
}

pub struct ExtensionRequest<'a> {
    pub crd: &'a CustomResourceDefinition,
    pub crd_config: &'a CrdConfig,
    pub mapping: &'a CrdMapping,
    pub openapi: &'a OpenApiDocument,
    pub extensions: &'a mut ExtensionsTree,
}
