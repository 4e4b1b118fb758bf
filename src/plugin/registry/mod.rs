//! Plugin catalog and plugin set resolution

use indexmap::IndexMap;
use std::sync::Arc;

use crate::config::PluginSetDeclaration;
use crate::plugin::crd::Base;
use crate::plugin::extension::{OpenApiVersion, ReferenceMetadata};
use crate::plugin::mapping::{
    ConnectionSecret, Entry, MajorVersion, MutualExclusiveGroup, MutualExclusiveMajorVersions,
    Parameters, PrintConditions, References, Status,
};
use crate::plugin::property::{
    ReadOnlyProperty, ReadWriteProperty, SensitiveProperties, SkippedProperties,
};
use crate::plugin::{CrdPlugin, ExtensionPlugin, MappingPlugin, Plugin, PropertyPlugin};

mod resolver;

pub use resolver::{resolve_plugin_sets, ResolveError};

/// Name of the set used when the configuration declares none
pub const DEFAULT_SET: &str = "default";

/// Name-to-plugin registry of every available plugin
#[derive(Clone, Default)]
pub struct PluginCatalog {
    /// Plugins in registration order
    plugins: IndexMap<&'static str, Plugin>,
}

impl PluginCatalog {
    /// An empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog holding every built-in plugin, in canonical pipeline order
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        catalog.register(Plugin::Crd(Arc::new(Base)));

        catalog.register(Plugin::Mapping(Arc::new(MajorVersion)));
        catalog.register(Plugin::Mapping(Arc::new(Parameters)));
        catalog.register(Plugin::Mapping(Arc::new(Entry)));
        catalog.register(Plugin::Mapping(Arc::new(Status)));
        catalog.register(Plugin::Mapping(Arc::new(References)));
        catalog.register(Plugin::Mapping(Arc::new(MutualExclusiveGroup)));
        catalog.register(Plugin::Mapping(Arc::new(MutualExclusiveMajorVersions)));
        catalog.register(Plugin::Mapping(Arc::new(ConnectionSecret)));
        catalog.register(Plugin::Mapping(Arc::new(PrintConditions)));

        catalog.register(Plugin::Property(Arc::new(ReadOnlyProperty)));
        catalog.register(Plugin::Property(Arc::new(ReadWriteProperty)));
        catalog.register(Plugin::Property(Arc::new(SkippedProperties)));
        catalog.register(Plugin::Property(Arc::new(SensitiveProperties)));

        catalog.register(Plugin::Extension(Arc::new(OpenApiVersion)));
        catalog.register(Plugin::Extension(Arc::new(ReferenceMetadata)));
        catalog
    }

    /// Register a plugin under its own name, replacing any previous one
    pub fn register(&mut self, plugin: Plugin) {
        self.plugins.insert(plugin.name(), plugin);
    }

    pub fn get(&self, name: &str) -> Option<&Plugin> {
        self.plugins.get(name)
    }

    /// Registered plugin names, in registration order
    pub fn names(&self) -> Vec<&'static str> {
        self.plugins.keys().copied().collect()
    }

    /// Default set running every registered plugin
    pub fn default_declaration(&self) -> PluginSetDeclaration {
        PluginSetDeclaration {
            default: true,
            ..PluginSetDeclaration::new(DEFAULT_SET, &self.names())
        }
    }
}

/// A plugin set with inheritance applied and names resolved to instances
#[derive(Debug, Clone)]
pub struct ResolvedPluginSet {
    pub name: String,

    pub default: bool,

    /// Plugins by name, parent plugins first, without duplicates
    pub plugins: IndexMap<String, Plugin>,
}

impl ResolvedPluginSet {
    pub fn crd_plugins(&self) -> Vec<Arc<dyn CrdPlugin>> {
        self.plugins
            .values()
            .filter_map(|p| match p {
                Plugin::Crd(p) => Some(p.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn mapping_plugins(&self) -> Vec<Arc<dyn MappingPlugin>> {
        self.plugins
            .values()
            .filter_map(|p| match p {
                Plugin::Mapping(p) => Some(p.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn property_plugins(&self) -> Vec<Arc<dyn PropertyPlugin>> {
        self.plugins
            .values()
            .filter_map(|p| match p {
                Plugin::Property(p) => Some(p.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn extension_plugins(&self) -> Vec<Arc<dyn ExtensionPlugin>> {
        self.plugins
            .values()
            .filter_map(|p| match p {
                Plugin::Extension(p) => Some(p.clone()),
                _ => None,
            })
            .collect()
    }
}
