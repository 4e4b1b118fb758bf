use tracing::debug;

use crate::plugin::mapping::{convert_mapping, mapping_schema};
use crate::plugin::{MappingPlugin, MappingRequest, PluginError};

/// Converts the status schema into `status.<majorVersion>`, if one is mapped
#[derive(Debug, Default)]
pub struct Status;

impl MappingPlugin for Status {
    fn name(&self) -> &'static str {
        "status"
    }

    fn process(&self, request: &mut MappingRequest<'_>) -> Result<(), PluginError> {
        let crd_mapping = request.mapping;
        let mapping = &crd_mapping.status_mapping;
        let Some(schema) = mapping_schema(request.openapi, mapping, "status")? else {
            return Ok(());
        };

        let major_version = crd_mapping.major_version.as_str();
        let root = request.extensions.root();
        let node = request.extensions.descend(root, &["status", major_version]);

        let Some(mut status) = convert_mapping(request, schema, mapping, node) else {
            return Ok(());
        };
        let kind = request.crd_config.gvk.kind.to_lowercase();
        status.description = Some(format!(
            "The last observed Atlas state of the {kind} resource for version {major_version}."
        ));
        debug!("Adding status.{}", major_version);

        request
            .crd
            .status_props_mut()
            .ok_or(PluginError::MissingNode("status"))?
            .properties
            .insert(major_version.to_string(), status);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::mapping::test_support::{Fixture, MAJOR_VERSION};

    #[test]
    fn test_status_keeps_read_only_properties() {
        let mut fixture = Fixture::group();
        fixture.run(0, &[&Status]).unwrap();

        let status = &fixture.status().properties[MAJOR_VERSION];
        assert_eq!(
            status.properties.keys().collect::<Vec<_>>(),
            vec!["created", "id"]
        );
        assert!(status.required.is_empty());
        assert!(fixture.status().properties.contains_key("conditions"));
    }

    #[test]
    fn test_status_is_optional() {
        let mut fixture = Fixture::group();
        fixture.config.mappings[0].status_mapping = Default::default();
        fixture.run(0, &[&Status]).unwrap();

        assert!(!fixture.status().properties.contains_key(MAJOR_VERSION));
    }

    #[test]
    fn test_unknown_status_schema() {
        let mut fixture = Fixture::group();
        fixture.config.mappings[0].status_mapping.schema = Some("Missing".to_string());

        let err = fixture.run(0, &[&Status]).unwrap_err();
        assert_eq!(err.to_string(), "status schema \"Missing\" not found in openapi spec");
    }
}
