//! Mapping plugins, run once per major-version mapping

use openapi2crd_crd::JsonSchemaProps;

use crate::config::PropertyMapping;
use crate::converter::PropertyConvertInput;
use crate::extensions::NodeId;
use crate::openapi::{OpenApiDocument, Schema};
use crate::plugin::{MappingRequest, PluginError};

mod connection_secret;
mod entry;
mod major_version;
mod mutual_exclusive;
mod parameters;
mod print_conditions;
mod references;
mod status;

pub use connection_secret::ConnectionSecret;
pub use entry::Entry;
pub use major_version::MajorVersion;
pub use mutual_exclusive::{MutualExclusiveGroup, MutualExclusiveMajorVersions};
pub use parameters::Parameters;
pub use print_conditions::PrintConditions;
pub use references::References;
pub use status::Status;

/// Source schema of a property mapping.
///
/// A schema name wins over a path; with neither configured there is nothing
/// to convert.
pub(crate) fn mapping_schema<'a>(
    document: &'a OpenApiDocument,
    mapping: &PropertyMapping,
    section: &'static str,
) -> Result<Option<&'a Schema>, PluginError> {
    if let Some(name) = mapping.schema_name() {
        return document
            .schema(name)
            .map(Some)
            .ok_or_else(|| PluginError::SchemaNotFound {
                section,
                name: name.to_string(),
            });
    }

    if !mapping.path.is_set() {
        return Ok(None);
    }

    let path = &mapping.path;
    let item = document
        .path(&path.name)
        .ok_or_else(|| PluginError::PathNotFound(path.name.clone()))?;
    let operation =
        item.operation(&path.verb)
            .ok_or_else(|| PluginError::OperationNotFound {
                path: path.name.clone(),
                verb: path.verb.clone(),
            })?;

    let body_not_found = || PluginError::RequestBodyNotFound {
        path: path.name.clone(),
        verb: path.verb.clone(),
        mime_type: path.request_body.mime_type.clone(),
    };
    let body = operation
        .request_body
        .as_ref()
        .and_then(|body| document.resolve_request_body(body))
        .ok_or_else(body_not_found)?;
    let media = if path.request_body.mime_type.is_empty() {
        body.content.values().next()
    } else {
        body.content.get(&path.request_body.mime_type)
    };

    media
        .and_then(|m| m.schema.as_ref())
        .map(Some)
        .ok_or_else(body_not_found)
}

/// Run the converter on a mapping schema rooted at `node`
pub(crate) fn convert_mapping(
    request: &mut MappingRequest<'_>,
    schema: &Schema,
    mapping: &PropertyMapping,
    node: NodeId,
) -> Option<JsonSchemaProps> {
    let input = PropertyConvertInput::new(request.openapi, schema, node, mapping);
    request.converter.convert(input, &mut *request.extensions)
}
