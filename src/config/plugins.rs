//! Plugin set declarations

use serde::{Deserialize, Serialize};

/// A named plugin set as written in the configuration document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginSetDeclaration {
    /// Set name
    pub name: String,

    /// Whether this set runs for CRDs that do not name one
    #[serde(default)]
    pub default: bool,

    /// Parent set whose plugins run first
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inherit: Option<String>,

    /// Plugin names, in execution order within each stage
    #[serde(default)]
    pub plugins: Vec<String>,
}

impl PluginSetDeclaration {
    pub fn new(name: impl Into<String>, plugins: &[&str]) -> Self {
        Self {
            name: name.into(),
            plugins: plugins.iter().map(|p| p.to_string()).collect(),
            ..Default::default()
        }
    }

    /// Builder-style parent assignment
    pub fn inheriting(mut self, parent: impl Into<String>) -> Self {
        self.inherit = Some(parent.into());
        self
    }
}
