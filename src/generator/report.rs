//! Result types for generation runs

use chrono::{DateTime, Utc};
use openapi2crd_crd::CustomResourceDefinition;
use serde::Serialize;
use std::collections::BTreeMap;

/// Summary of one generation run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationReport {
    /// When the run started
    pub generated_at: DateTime<Utc>,

    /// Names of the generated CRDs, in configuration order
    pub crds: Vec<String>,

    /// SHA-256 digest of every OpenAPI definition loaded, by definition name
    pub documents: BTreeMap<String, String>,

    /// Structural validation findings, reported but never fatal
    pub warnings: Vec<String>,

    /// CRD configurations that failed to generate
    pub failures: Vec<String>,
}

impl GenerationReport {
    pub fn new() -> Self {
        Self {
            generated_at: Utc::now(),
            crds: Vec::new(),
            documents: BTreeMap::new(),
            warnings: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

impl Default for GenerationReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Generated CRDs together with the run report
#[derive(Debug, Clone, Default)]
pub struct GenerationOutput {
    pub crds: Vec<CustomResourceDefinition>,
    pub report: GenerationReport,
}
