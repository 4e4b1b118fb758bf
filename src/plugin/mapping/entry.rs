use tracing::debug;

use crate::plugin::mapping::{convert_mapping, mapping_schema};
use crate::plugin::{MappingPlugin, MappingRequest, PluginError};

const SECTION: &str = "entry";

/// Converts the entry schema into `spec.<majorVersion>.entry`
#[derive(Debug, Default)]
pub struct Entry;

impl MappingPlugin for Entry {
    fn name(&self) -> &'static str {
        "entry"
    }

    fn process(&self, request: &mut MappingRequest<'_>) -> Result<(), PluginError> {
        let crd_mapping = request.mapping;
        let mapping = &crd_mapping.entry_mapping;
        let Some(schema) = mapping_schema(request.openapi, mapping, SECTION)? else {
            return Ok(());
        };

        request.version_props_mut()?;
        let version_node = request.version_extensions();
        let node = request.extensions.child(version_node, SECTION);

        let mut entry = convert_mapping(request, schema, mapping, node).ok_or_else(|| {
            PluginError::EmptySchema {
                section: SECTION,
                name: mapping
                    .schema_name()
                    .unwrap_or(mapping.path.name.as_str())
                    .to_string(),
            }
        })?;

        let kind = request.crd_config.gvk.kind.to_lowercase();
        let plural = request.crd.spec.names.plural.clone();
        entry.description = Some(format!(
            "The entry fields of the {kind} resource spec. These fields can be set for creating and updating {plural}."
        ));
        debug!("Adding spec.{}.entry", crd_mapping.major_version);

        request
            .version_props_mut()?
            .properties
            .insert(SECTION.to_string(), entry);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::mapping::test_support::{Fixture, MAJOR_VERSION};
    use crate::plugin::mapping::MajorVersion;

    #[test]
    fn test_entry_from_schema_name() {
        let mut fixture = Fixture::group();
        fixture.run(0, &[&MajorVersion, &Entry]).unwrap();

        let entry = &fixture.version(MAJOR_VERSION).properties["entry"];
        assert_eq!(
            entry.description.as_deref(),
            Some("The entry fields of the group resource spec. These fields can be set for creating and updating groups.")
        );
        assert_eq!(
            entry.properties.keys().collect::<Vec<_>>(),
            vec!["name", "orgId", "tags"]
        );
        assert_eq!(entry.required, vec!["name", "orgId"]);

        let tag = entry.properties["tags"].items.as_ref().unwrap();
        assert_eq!(tag.required, vec!["key", "value"]);
        assert_eq!(tag.properties["key"].description.as_deref(), Some("Label key."));
    }

    #[test]
    fn test_entry_from_request_body() {
        let mut fixture = Fixture::group();
        let mapping = &mut fixture.config.mappings[0].entry_mapping;
        mapping.schema = None;
        mapping.path.name = "/api/atlas/v2/groups/{groupId}/clusters".to_string();
        mapping.path.verb = "post".to_string();
        mapping.path.request_body.mime_type = "application/vnd.atlas.2025-03-12+json".to_string();

        fixture.run(0, &[&MajorVersion, &Entry]).unwrap();

        let entry = &fixture.version(MAJOR_VERSION).properties["entry"];
        assert_eq!(entry.properties.keys().collect::<Vec<_>>(), vec!["name"]);
    }

    #[test]
    fn test_unknown_schema() {
        let mut fixture = Fixture::group();
        fixture.config.mappings[0].entry_mapping.schema = Some("NonExistentSchema".to_string());

        let err = fixture.run(0, &[&MajorVersion, &Entry]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "entry schema \"NonExistentSchema\" not found in openapi spec"
        );
    }

    #[test]
    fn test_unknown_media_type() {
        let mut fixture = Fixture::group();
        let mapping = &mut fixture.config.mappings[0].entry_mapping;
        mapping.schema = None;
        mapping.path.name = "/api/atlas/v2/groups".to_string();
        mapping.path.verb = "post".to_string();
        mapping.path.request_body.mime_type = "application/json".to_string();

        let err = fixture.run(0, &[&MajorVersion, &Entry]).unwrap_err();
        assert!(matches!(err, PluginError::RequestBodyNotFound { .. }));
    }

    #[test]
    fn test_missing_version() {
        let mut fixture = Fixture::group();
        let err = fixture.run(0, &[&Entry]).unwrap_err();
        assert_eq!(err.to_string(), "version v20250312 not found in spec");
    }
}
