use openapi2crd_crd::JsonSchemaProps;
use tracing::debug;

use crate::config::Reference;
use crate::plugin::{MappingPlugin, MappingRequest, PluginError};

/// Object property pointing at another Kubernetes resource by name
pub fn reference_schema(reference: &Reference) -> Result<JsonSchemaProps, PluginError> {
    let target_property = reference
        .target
        .properties
        .first()
        .ok_or(PluginError::EmptyReferenceTarget)?;
    let kind = &reference.target.type_.kind;
    let leaf = reference.property_leaf();

    let mut schema = JsonSchemaProps::object(format!(
        "A reference to a \"{kind}\" resource.\nThe value of \"{target_property}\" will be used to set \"{leaf}\".\nMutually exclusive with the \"{leaf}\" property."
    ));
    schema.properties.insert(
        "name".to_string(),
        JsonSchemaProps::string(format!("Name of the \"{kind}\" resource.")),
    );
    Ok(schema)
}

/// Adds reference properties next to the fields they supersede.
///
/// Parameter references land on `spec.<majorVersion>`, entry references on
/// `spec.<majorVersion>.entry`.
#[derive(Debug, Default)]
pub struct References;

impl References {
    fn apply(
        target: &mut JsonSchemaProps,
        references: &[Reference],
    ) -> Result<(), PluginError> {
        for reference in references {
            let schema = reference_schema(reference)?;
            debug!("Adding reference {}", reference.name);
            target.properties.insert(reference.name.clone(), schema);
            target.remove_required(reference.property_leaf());
        }
        Ok(())
    }
}

impl MappingPlugin for References {
    fn name(&self) -> &'static str {
        "reference"
    }

    fn process(&self, request: &mut MappingRequest<'_>) -> Result<(), PluginError> {
        let mapping = request.mapping;
        let parameters = &mapping.parameters_mapping.references;
        let entry = &mapping.entry_mapping.references;
        if parameters.is_empty() && entry.is_empty() {
            return Ok(());
        }

        let version = request.version_props_mut()?;
        Self::apply(version, parameters)?;

        if !entry.is_empty() {
            let entry_props = version
                .property_mut("entry")
                .ok_or(PluginError::MissingNode("entry"))?;
            Self::apply(entry_props, entry)?;
        }

        Ok(())
    }
}
