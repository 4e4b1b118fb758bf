//! Extension plugins, writing mapping annotations into the extensions tree

use serde_json::json;
use tracing::debug;

use crate::config::Reference;
use crate::extensions::{KUBERNETES_MAPPING, OPENAPI_MAPPING};
use crate::plugin::{ExtensionPlugin, ExtensionRequest, PluginError};

/// Records which OpenAPI definition and API version a major version maps to
#[derive(Debug, Default)]
pub struct OpenApiVersion;

impl ExtensionPlugin for OpenApiVersion {
    fn name(&self) -> &'static str {
        "openapi_version"
    }

    fn process(&self, request: &mut ExtensionRequest<'_>) -> Result<(), PluginError> {
        let major_version = request.mapping.major_version.as_str();
        let root = request.extensions.root();
        let node = request.extensions.descend(root, &["spec", major_version]);

        request.extensions.set_extension(
            node,
            OPENAPI_MAPPING,
            json!({
                "definition": request.mapping.openapi_ref.name,
                "version": request.openapi.info.version,
            }),
        );
        Ok(())
    }
}

/// Records how reference properties resolve against their target resources
#[derive(Debug, Default)]
pub struct ReferenceMetadata;

impl ReferenceMetadata {
    fn annotate(
        request: &mut ExtensionRequest<'_>,
        parent: &[&str],
        references: &[Reference],
    ) -> Result<(), PluginError> {
        for reference in references {
            if reference.target.properties.is_empty() {
                return Err(PluginError::EmptyReferenceTarget);
            }
            debug!("Annotating reference {}", reference.name);

            let root = request.extensions.root();
            let parent_node = request.extensions.descend(root, parent);
            let node = request.extensions.child(parent_node, &reference.name);
            let target = &reference.target;
            request.extensions.set_extension(
                node,
                KUBERNETES_MAPPING,
                json!({
                    "type": {
                        "kind": target.type_.kind,
                        "group": target.type_.group,
                        "version": target.type_.version,
                        "resource": target.type_.resource,
                    },
                    "nameSelector": ".name",
                    "properties": target.properties,
                }),
            );
            request.extensions.set_extension(
                node,
                OPENAPI_MAPPING,
                json!({ "property": reference.property }),
            );
        }
        Ok(())
    }
}

impl ExtensionPlugin for ReferenceMetadata {
    fn name(&self) -> &'static str {
        "reference_metadata"
    }

    fn process(&self, request: &mut ExtensionRequest<'_>) -> Result<(), PluginError> {
        let mapping = request.mapping;
        let major_version = mapping.major_version.as_str();
        Self::annotate(
            request,
            &["spec", major_version],
            &mapping.parameters_mapping.references,
        )?;
        Self::annotate(
            request,
            &["spec", major_version, "entry"],
            &mapping.entry_mapping.references,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extensions::ExtensionsTree;
    use crate::plugin::mapping::test_support::{group_ref, Fixture, MAJOR_VERSION};
    use serde_json::Value;

    fn run(fixture: &mut Fixture, plugin: &dyn ExtensionPlugin) -> Result<(), PluginError> {
        plugin.process(&mut ExtensionRequest {
            crd: &fixture.crd,
            crd_config: &fixture.config,
            mapping: &fixture.config.mappings[0],
            openapi: &fixture.document,
            extensions: &mut fixture.extensions,
        })
    }

    fn version_node(tree: &ExtensionsTree) -> crate::extensions::NodeId {
        let spec = tree.get_child(tree.root(), "spec").unwrap();
        tree.get_child(spec, MAJOR_VERSION).unwrap()
    }

    #[test]
    fn test_openapi_version() {
        let mut fixture = Fixture::group();
        run(&mut fixture, &OpenApiVersion).unwrap();

        let node = version_node(&fixture.extensions);
        assert_eq!(
            fixture.extensions.extension(node, OPENAPI_MAPPING),
            Some(&json!({"definition": "v20250312", "version": "2.0"}))
        );
    }

    #[test]
    fn test_parameter_reference_metadata() {
        let mut fixture = Fixture::cluster();
        run(&mut fixture, &ReferenceMetadata).unwrap();

        let tree = &fixture.extensions;
        let node = tree.get_child(version_node(tree), "groupRef").unwrap();
        assert_eq!(
            tree.extension(node, KUBERNETES_MAPPING),
            Some(&json!({
                "type": {
                    "kind": "Group",
                    "group": "atlas.generated.mongodb.com",
                    "version": "v1",
                    "resource": "groups",
                },
                "nameSelector": ".name",
                "properties": ["$.status.v20250312.id"],
            }))
        );
        assert_eq!(
            tree.extension(node, OPENAPI_MAPPING),
            Some(&json!({"property": "$.groupId"}))
        );
    }

    #[test]
    fn test_entry_reference_metadata() {
        let mut fixture = Fixture::cluster();
        let mapping = &mut fixture.config.mappings[0];
        mapping.parameters_mapping.references.clear();
        mapping.entry_mapping.references = vec![group_ref()];
        run(&mut fixture, &ReferenceMetadata).unwrap();

        let tree = &fixture.extensions;
        let entry = tree.get_child(version_node(tree), "entry").unwrap();
        let node = tree.get_child(entry, "groupRef").unwrap();
        assert!(tree.extension(node, KUBERNETES_MAPPING).is_some());
    }

    #[test]
    fn test_no_references_leaves_tree_empty() {
        let mut fixture = Fixture::group();
        run(&mut fixture, &ReferenceMetadata).unwrap();

        let annotation = fixture.extensions.clone().into_annotation().unwrap();
        assert_eq!(annotation, None::<String>);
    }

    #[test]
    fn test_empty_target() {
        let mut fixture = Fixture::cluster();
        fixture.config.mappings[0].parameters_mapping.references[0]
            .target
            .properties
            .clear();

        let err = run(&mut fixture, &ReferenceMetadata).unwrap_err();
        assert!(matches!(err, PluginError::EmptyReferenceTarget));
        let value: Value = fixture.extensions.to_value(fixture.extensions.root());
        assert!(value.get("properties").is_none());
    }
}
