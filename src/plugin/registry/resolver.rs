//! Plugin set resolution
//!
//! Declarations are resolved breadth-first through a rotating queue: a set
//! whose parent is not resolved yet goes back to the tail. When a full pass
//! over the queue resolves nothing, the remaining sets form a cycle.

use indexmap::IndexMap;
use std::collections::{HashSet, VecDeque};
use thiserror::Error;
use tracing::debug;

use super::{PluginCatalog, ResolvedPluginSet};
use crate::config::PluginSetDeclaration;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("circular dependency detected in plugin set {set}")]
    CircularDependency { set: String },

    #[error("plugin {plugin} not found for plugin set {set}")]
    PluginNotFound { set: String, plugin: String },

    #[error("plugin set {set} inherits from unknown plugin set {parent}")]
    UnknownParent { set: String, parent: String },

    #[error("plugin set {0} is declared more than once")]
    DuplicateSet(String),

    #[error("multiple default plugin sets: {0:?}")]
    MultipleDefaults(Vec<String>),
}

/// Resolve declarations into ordered plugin sets, parents before children
pub fn resolve_plugin_sets(
    declarations: &[PluginSetDeclaration],
    catalog: &PluginCatalog,
) -> Result<Vec<ResolvedPluginSet>, ResolveError> {
    let mut declared = HashSet::new();
    for declaration in declarations {
        if !declared.insert(declaration.name.as_str()) {
            return Err(ResolveError::DuplicateSet(declaration.name.clone()));
        }
    }

    let mut queue: VecDeque<&PluginSetDeclaration> = declarations.iter().collect();
    // Sets re-queued since the last one resolved, and the first of them
    let mut stalled = 0usize;
    let mut stalled_since: Option<&str> = None;
    let mut resolved: IndexMap<String, ResolvedPluginSet> = IndexMap::new();

    while let Some(declaration) = queue.pop_front() {
        let name = declaration.name.as_str();

        let parent = match &declaration.inherit {
            Some(parent) if !declared.contains(parent.as_str()) => {
                return Err(ResolveError::UnknownParent {
                    set: name.to_string(),
                    parent: parent.clone(),
                });
            }
            Some(parent) => match resolved.get(parent) {
                Some(parent) => Some(parent),
                None => {
                    stalled += 1;
                    let first = *stalled_since.get_or_insert(name);
                    if stalled > queue.len() {
                        return Err(ResolveError::CircularDependency {
                            set: first.to_string(),
                        });
                    }
                    queue.push_back(declaration);
                    continue;
                }
            },
            None => None,
        };

        let mut plugins = parent.map(|p| p.plugins.clone()).unwrap_or_default();
        for plugin_name in &declaration.plugins {
            let plugin = catalog
                .get(plugin_name)
                .ok_or_else(|| ResolveError::PluginNotFound {
                    set: name.to_string(),
                    plugin: plugin_name.clone(),
                })?;
            if !plugins.contains_key(plugin_name) {
                plugins.insert(plugin_name.clone(), plugin.clone());
            }
        }

        stalled = 0;
        stalled_since = None;
        debug!("Resolved plugin set {} with {} plugins", name, plugins.len());
        resolved.insert(
            name.to_string(),
            ResolvedPluginSet {
                name: name.to_string(),
                default: declaration.default,
                plugins,
            },
        );
    }

    let mut sets: Vec<ResolvedPluginSet> = resolved.into_values().collect();

    let defaults: Vec<String> = sets
        .iter()
        .filter(|s| s.default)
        .map(|s| s.name.clone())
        .collect();
    if defaults.len() > 1 {
        return Err(ResolveError::MultipleDefaults(defaults));
    }
    if defaults.is_empty() {
        if let Some(first) = sets.first_mut() {
            first.default = true;
        }
    }

    Ok(sets)
}
