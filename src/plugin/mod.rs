//! Plugin architecture for the CRD compilation pipeline

use std::fmt;
use std::sync::Arc;
use thiserror::Error;

pub mod crd;
pub mod extension;
pub mod mapping;
pub mod property;
pub mod registry;
pub mod traits;

pub use registry::{resolve_plugin_sets, PluginCatalog, ResolveError, ResolvedPluginSet};
pub use traits::*;

/// Pipeline stage a plugin runs in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Crd,
    Mapping,
    Property,
    Extension,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Crd => "crd",
            Stage::Mapping => "mapping",
            Stage::Property => "property",
            Stage::Extension => "extension",
        };
        f.write_str(name)
    }
}

/// A plugin instance, tagged by the stage it implements
#[derive(Clone)]
pub enum Plugin {
    Crd(Arc<dyn CrdPlugin>),
    Mapping(Arc<dyn MappingPlugin>),
    Property(Arc<dyn PropertyPlugin>),
    Extension(Arc<dyn ExtensionPlugin>),
}

impl Plugin {
    pub fn name(&self) -> &'static str {
        match self {
            Plugin::Crd(p) => p.name(),
            Plugin::Mapping(p) => p.name(),
            Plugin::Property(p) => p.name(),
            Plugin::Extension(p) => p.name(),
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            Plugin::Crd(_) => Stage::Crd,
            Plugin::Mapping(_) => Stage::Mapping,
            Plugin::Property(_) => Stage::Property,
            Plugin::Extension(_) => Stage::Extension,
        }
    }
}

impl fmt::Debug for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.stage(), self.name())
    }
}

/// Errors raised by CRD, mapping and extension plugins
#[derive(Debug, Error)]
pub enum PluginError {
    #[error("CRD schema has no {0} node")]
    MissingNode(&'static str),

    #[error("version {0} not found in spec")]
    VersionNotFound(String),

    #[error("OpenAPI path {0} does not exist")]
    PathNotFound(String),

    #[error("verb {0:?} unsupported")]
    UnsupportedVerb(String),

    #[error("OpenAPI path {path} has no {verb} operation")]
    OperationNotFound { path: String, verb: String },

    #[error("OpenAPI path {path} {verb} has no {mime_type:?} request body schema")]
    RequestBodyNotFound {
        path: String,
        verb: String,
        mime_type: String,
    },

    #[error("{section} schema {name:?} not found in openapi spec")]
    SchemaNotFound { section: &'static str, name: String },

    #[error("{section} schema {name:?} produced no CRD schema")]
    EmptySchema { section: &'static str, name: String },

    #[error("reference target must have at least one property defined")]
    EmptyReferenceTarget,

    #[error("{plugin} plugin failed for {kind} {major_version}: {source}")]
    Stage {
        plugin: &'static str,
        kind: String,
        major_version: String,
        #[source]
        source: Box<PluginError>,
    },
}

impl PluginError {
    /// Attach plugin and resource context
    pub fn in_stage(self, plugin: &'static str, kind: &str, major_version: &str) -> Self {
        PluginError::Stage {
            plugin,
            kind: kind.to_string(),
            major_version: major_version.to_string(),
            source: Box::new(self),
        }
    }
}
