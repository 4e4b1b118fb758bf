use tracing::{debug, trace};

use crate::cel;
use crate::plugin::mapping::convert_mapping;
use crate::plugin::{MappingPlugin, MappingRequest, PluginError};

/// Verbs whose parameters can become spec properties
const ALLOWED_VERBS: &[&str] = &["get", "post", "put", "patch"];

/// Paging and formatting parameters with no place in a resource spec
const IGNORED_PARAMETERS: &[&str] = &["includeCount", "itemsPerPage", "pageNum", "envelope", "pretty"];

/// Turns the parameters of the mapped operation into immutable
/// `spec.<majorVersion>` properties
#[derive(Debug, Default)]
pub struct Parameters;

impl MappingPlugin for Parameters {
    fn name(&self) -> &'static str {
        "parameters"
    }

    fn process(&self, request: &mut MappingRequest<'_>) -> Result<(), PluginError> {
        let crd_mapping = request.mapping;
        let mapping = &crd_mapping.parameters_mapping;
        let path = &mapping.path;
        if !path.is_set() {
            return Ok(());
        }

        let openapi = request.openapi;
        let item = openapi
            .path(&path.name)
            .ok_or_else(|| PluginError::PathNotFound(path.name.clone()))?;

        let verb = path.verb.to_ascii_lowercase();
        if !ALLOWED_VERBS.contains(&verb.as_str()) {
            return Err(PluginError::UnsupportedVerb(path.verb.clone()));
        }
        let operation = item
            .operation(&verb)
            .ok_or_else(|| PluginError::OperationNotFound {
                path: path.name.clone(),
                verb: path.verb.clone(),
            })?;

        let version_node = request.version_extensions();
        // ensure the version exists before converting anything
        request.version_props_mut()?;

        for parameter in item.parameters.iter().chain(operation.parameters.iter()) {
            let Some(parameter) = openapi.resolve_parameter(parameter) else {
                trace!("Skipping unresolvable parameter {:?}", parameter.reference);
                continue;
            };
            if IGNORED_PARAMETERS.contains(&parameter.name.as_str()) {
                continue;
            }
            let Some(schema) = &parameter.schema else {
                continue;
            };

            let node = request.extensions.child(version_node, &parameter.name);
            let Some(mut property) = convert_mapping(request, schema, mapping, node) else {
                continue;
            };
            debug!("Adding parameter {} to {}", parameter.name, path.name);

            if let Some(description) = &parameter.description {
                property.description = Some(description.clone());
            }
            property.add_validation(cel::immutable_rule(&parameter.name));

            let version = request.version_props_mut()?;
            version.properties.insert(parameter.name.clone(), property);
            if parameter.required {
                version.add_required(&parameter.name);
            }
        }

        Ok(())
    }
}
