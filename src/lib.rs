//! openapi2crd Library
//!
//! Compiles OpenAPI resource descriptions into Kubernetes
//! CustomResourceDefinitions. A YAML configuration names the OpenAPI
//! documents to load and, for every CRD, which schemas feed each major
//! version's `spec` and `status`. A pipeline of named plugins builds the CRD
//! schema and records how its fields map back to the source API.

pub mod cel;
pub mod cli;
pub mod config;
pub mod converter;
pub mod extensions;
pub mod generator;
pub mod openapi;
pub mod plugin;
pub mod utils;

pub use config::{Config, ConfigError, CrdConfig};
pub use generator::{GenerateError, GenerationOutput, GenerationReport, Generator};
pub use openapi::{LoadError, Loader, OpenApiDocument};
pub use openapi2crd_crd::CustomResourceDefinition;
pub use plugin::{PluginCatalog, PluginError, ResolveError};

use tracing::info;

/// Generate every CRD of a configuration with the built-in plugins and loaders
pub async fn generate(config: &Config) -> Result<GenerationOutput, GenerateError> {
    info!(
        "Generating CRDs from {} OpenAPI definitions",
        config.spec.openapi.len()
    );
    Generator::new(config)?
        .generate_all(&config.spec.crd, config.spec.fail_fast)
        .await
}
