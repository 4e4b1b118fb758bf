use openapi2crd_crd::JsonSchemaProps;
use tracing::debug;

use crate::plugin::{MappingPlugin, MappingRequest, PluginError};

/// Creates the empty `spec.<majorVersion>` object
#[derive(Debug, Default)]
pub struct MajorVersion;

impl MappingPlugin for MajorVersion {
    fn name(&self) -> &'static str {
        "major_version"
    }

    fn process(&self, request: &mut MappingRequest<'_>) -> Result<(), PluginError> {
        let kind = request.crd_config.gvk.kind.to_lowercase();
        let major_version = request.mapping.major_version.clone();
        debug!("Adding spec.{}", major_version);

        let spec = request
            .crd
            .spec_props_mut()
            .ok_or(PluginError::MissingNode("spec"))?;
        let description = format!("The spec of the {kind} resource for version {major_version}.");
        spec.properties
            .insert(major_version, JsonSchemaProps::object(description));

        Ok(())
    }
}
