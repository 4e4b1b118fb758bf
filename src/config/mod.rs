//! Configuration management for openapi2crd

pub mod config;
pub mod crd;
pub mod plugins;


// Re-export main types for convenience
pub use config::{Config, ConfigError, ConfigSpec, OpenApiDefinition, API_VERSION, KIND};
pub use crd::*;
pub use plugins::PluginSetDeclaration;
