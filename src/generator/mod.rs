//! CRD generation driver
//!
//! Runs the CRD plugins once per configured CRD, then for every mapping loads
//! its OpenAPI document and runs the mapping and extension plugins against
//! the CRD under construction. The pruned extensions tree is attached as the
//! `api-mappings` annotation and the result is validated structurally.

use indexmap::IndexMap;
use openapi2crd_crd::{CrdValidator, CustomResourceDefinition, StructuralValidator};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::{Config, ConfigError, CrdConfig, OpenApiDefinition};
use crate::converter::PropertyConverter;
use crate::extensions::ExtensionsTree;
use crate::openapi::{LoadError, Loader, OpenApiDocument, PackageLoader, PathLoader};
use crate::plugin::{
    resolve_plugin_sets, CrdPlugin, CrdRequest, ExtensionPlugin, ExtensionRequest,
    MappingPlugin, MappingRequest, PluginCatalog, PluginError, ResolveError, ResolvedPluginSet,
};
use crate::utils::calculate_hash;

mod report;

pub use report::{GenerationOutput, GenerationReport};

/// Annotation carrying the serialized extensions tree
pub const API_MAPPINGS_ANNOTATION: &str = "api-mappings";

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to resolve plugin sets: {0}")]
    Resolve(#[from] ResolveError),

    #[error("CRD {kind}: major version {major_version} is mapped more than once")]
    DuplicateMajorVersion { kind: String, major_version: String },

    #[error("CRD {kind}: plugin set {set} is not declared")]
    UnknownPluginSet { kind: String, set: String },

    #[error("no default plugin set")]
    NoDefaultSet,

    #[error("OpenAPI definition {0} is not declared")]
    UnknownDefinition(String),

    #[error("failed to load OpenAPI definition {name}: {source}")]
    Load {
        name: String,
        #[source]
        source: LoadError,
    },

    #[error(transparent)]
    Plugin(#[from] PluginError),

    #[error("CRD {kind}: failed to serialize api mappings: {source}")]
    Annotation {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Plugins of one resolved set, split by stage
struct StagePlugins {
    crd: Vec<Arc<dyn CrdPlugin>>,
    mapping: Vec<Arc<dyn MappingPlugin>>,
    extension: Vec<Arc<dyn ExtensionPlugin>>,
    converter: PropertyConverter,
}

impl From<&ResolvedPluginSet> for StagePlugins {
    fn from(set: &ResolvedPluginSet) -> Self {
        Self {
            crd: set.crd_plugins(),
            mapping: set.mapping_plugins(),
            extension: set.extension_plugins(),
            converter: PropertyConverter::new(set.property_plugins()),
        }
    }
}

/// Compiles CRD configurations into CustomResourceDefinitions
pub struct Generator {
    definitions: IndexMap<String, OpenApiDefinition>,
    plugin_sets: Vec<ResolvedPluginSet>,
    path_loader: Arc<dyn Loader>,
    package_loader: Option<Arc<dyn Loader>>,
    validator: Arc<dyn CrdValidator>,
    documents: HashMap<String, Arc<OpenApiDocument>>,
    digests: HashMap<String, String>,
}

impl Generator {
    /// Validate the configuration and resolve its plugin sets against the
    /// built-in catalog
    pub fn new(config: &Config) -> Result<Self, GenerateError> {
        Self::with_catalog(config, &PluginCatalog::builtin())
    }

    pub fn with_catalog(config: &Config, catalog: &PluginCatalog) -> Result<Self, GenerateError> {
        config.validate()?;

        let declarations = if config.spec.plugin_sets.is_empty() {
            vec![catalog.default_declaration()]
        } else {
            config.spec.plugin_sets.clone()
        };
        let plugin_sets = resolve_plugin_sets(&declarations, catalog)?;

        let definitions = config
            .spec
            .openapi
            .iter()
            .map(|d| (d.name.clone(), d.clone()))
            .collect();

        Ok(Self {
            definitions,
            plugin_sets,
            path_loader: Arc::new(PathLoader::new()),
            package_loader: PackageLoader::from_env()
                .ok()
                .map(|l| Arc::new(l) as Arc<dyn Loader>),
            validator: Arc::new(StructuralValidator::new()),
            documents: HashMap::new(),
            digests: HashMap::new(),
        })
    }

    /// Loader for definitions with a `path`
    pub fn with_path_loader(mut self, loader: impl Loader + 'static) -> Self {
        self.path_loader = Arc::new(loader);
        self
    }

    /// Loader for definitions with a `package`
    pub fn with_package_loader(mut self, loader: impl Loader + 'static) -> Self {
        self.package_loader = Some(Arc::new(loader));
        self
    }

    pub fn with_validator(mut self, validator: impl CrdValidator + 'static) -> Self {
        self.validator = Arc::new(validator);
        self
    }

    pub fn plugin_sets(&self) -> &[ResolvedPluginSet] {
        &self.plugin_sets
    }

    fn plugin_set(&self, config: &CrdConfig) -> Result<&ResolvedPluginSet, GenerateError> {
        match &config.plugin_set {
            Some(name) => self
                .plugin_sets
                .iter()
                .find(|s| &s.name == name)
                .ok_or_else(|| GenerateError::UnknownPluginSet {
                    kind: config.gvk.kind.clone(),
                    set: name.clone(),
                }),
            None => self
                .plugin_sets
                .iter()
                .find(|s| s.default)
                .ok_or(GenerateError::NoDefaultSet),
        }
    }

    /// Load a definition once per run
    async fn document(&mut self, name: &str) -> Result<Arc<OpenApiDocument>, GenerateError> {
        if let Some(document) = self.documents.get(name) {
            return Ok(document.clone());
        }

        let definition = self
            .definitions
            .get(name)
            .ok_or_else(|| GenerateError::UnknownDefinition(name.to_string()))?;
        let load_error = |source| GenerateError::Load {
            name: name.to_string(),
            source,
        };

        let document = match (&definition.path, &definition.package) {
            (Some(path), _) => self.path_loader.load(path).await,
            (None, Some(package)) => match &self.package_loader {
                Some(loader) => loader.load(package).await,
                None => Err(LoadError::NoModuleCache),
            },
            (None, None) => Err(LoadError::InvalidPackage(String::new())),
        }
        .map_err(load_error)?;
        info!("Loaded OpenAPI definition {} ({})", name, document.info.version);

        if let Ok(bytes) = serde_json::to_vec(&document) {
            self.digests.insert(name.to_string(), calculate_hash(&bytes));
        }

        let document = Arc::new(document);
        self.documents.insert(name.to_string(), document.clone());
        Ok(document)
    }

    /// Generate one CRD, returning it with its validation findings
    pub async fn generate(
        &mut self,
        config: &CrdConfig,
    ) -> Result<(CustomResourceDefinition, Vec<String>), GenerateError> {
        let kind = config.gvk.kind.as_str();

        let mut seen = HashSet::new();
        for major_version in config.major_versions() {
            if !seen.insert(major_version) {
                return Err(GenerateError::DuplicateMajorVersion {
                    kind: kind.to_string(),
                    major_version: major_version.to_string(),
                });
            }
        }

        let plugins = StagePlugins::from(self.plugin_set(config)?);
        let mut crd = CustomResourceDefinition::default();
        let mut extensions = ExtensionsTree::new();

        for plugin in &plugins.crd {
            debug!("Running CRD plugin {} for {}", plugin.name(), kind);
            plugin
                .process(&mut CrdRequest {
                    crd: &mut crd,
                    crd_config: config,
                    extensions: &mut extensions,
                })
                .map_err(|e| e.in_stage(plugin.name(), kind, ""))?;
        }

        for mapping in &config.mappings {
            let major_version = mapping.major_version.as_str();
            let openapi = self.document(&mapping.openapi_ref.name).await?;

            for plugin in &plugins.mapping {
                debug!("Running mapping plugin {} for {} {}", plugin.name(), kind, major_version);
                plugin
                    .process(&mut MappingRequest {
                        crd: &mut crd,
                        crd_config: config,
                        mapping,
                        openapi: &openapi,
                        extensions: &mut extensions,
                        converter: &plugins.converter,
                    })
                    .map_err(|e| e.in_stage(plugin.name(), kind, major_version))?;
            }

            for plugin in &plugins.extension {
                debug!("Running extension plugin {} for {} {}", plugin.name(), kind, major_version);
                plugin
                    .process(&mut ExtensionRequest {
                        crd: &crd,
                        crd_config: config,
                        mapping,
                        openapi: &openapi,
                        extensions: &mut extensions,
                    })
                    .map_err(|e| e.in_stage(plugin.name(), kind, major_version))?;
            }
        }

        let annotation = extensions
            .into_annotation()
            .map_err(|source| GenerateError::Annotation {
                kind: kind.to_string(),
                source,
            })?;
        if let Some(annotation) = annotation {
            crd.metadata
                .annotations
                .insert(API_MAPPINGS_ANNOTATION.to_string(), annotation);
        }

        let findings = self.validator.validate(&crd);
        for finding in &findings {
            warn!("CRD {} failed validation: {}", crd.metadata.name, finding);
        }

        Ok((crd, findings))
    }

    /// Generate every configured CRD.
    ///
    /// A failing CRD is recorded in the report and the run continues with the
    /// next one, unless `fail_fast` is set.
    pub async fn generate_all(
        &mut self,
        configs: &[CrdConfig],
        fail_fast: bool,
    ) -> Result<GenerationOutput, GenerateError> {
        info!("Generating {} CRDs", configs.len());
        let mut output = GenerationOutput::default();

        for config in configs {
            match self.generate(config).await {
                Ok((crd, findings)) => {
                    info!("Generated {}", crd.metadata.name);
                    output.report.crds.push(crd.metadata.name.clone());
                    output.report.warnings.extend(
                        findings
                            .into_iter()
                            .map(|f| format!("{}: {}", crd.metadata.name, f)),
                    );
                    output.crds.push(crd);
                }
                Err(e) if fail_fast => return Err(e),
                Err(e) => {
                    error!("Failed to generate CRD {}: {}", config.gvk.kind, e);
                    output.report.failures.push(format!("{}: {}", config.gvk.kind, e));
                }
            }
        }

        output.report.documents = self
            .digests
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Ok(output)
    }
}
