use openapi2crd_crd::{JsonSchemaProps, ValidationRule};
use std::collections::BTreeSet;

use crate::cel;
use crate::plugin::property::SENSITIVE_PREFIX;
use crate::plugin::{MappingPlugin, MappingRequest, PluginError};

pub const CONNECTION_SECRET_REF: &str = "connectionSecretRef";

/// Identity fields scoping every Atlas resource, besides reference leaves
const IDENTITY_FIELDS: &[&str] = &["groupId"];

/// Adds `spec.connectionSecretRef` and requires it whenever a version sets a
/// raw identity field
#[derive(Debug, Default)]
pub struct ConnectionSecret;

impl ConnectionSecret {
    fn secret_ref() -> JsonSchemaProps {
        let mut secret_ref = JsonSchemaProps::object(format!(
            "{SENSITIVE_PREFIX}\n\nReference to a secret containing the credentials to setup the connection to Atlas."
        ));
        secret_ref.properties.insert(
            "name".to_string(),
            JsonSchemaProps::string("Name of the secret containing the Atlas credentials."),
        );
        secret_ref
    }
}

impl MappingPlugin for ConnectionSecret {
    fn name(&self) -> &'static str {
        "connection_secret"
    }

    fn process(&self, request: &mut MappingRequest<'_>) -> Result<(), PluginError> {
        let mapping = request.mapping;
        let spec = request
            .crd
            .spec_props_mut()
            .ok_or(PluginError::MissingNode("spec"))?;

        spec.properties
            .entry(CONNECTION_SECRET_REF.to_string())
            .or_insert_with(Self::secret_ref);

        if !spec.properties.contains_key(&mapping.major_version) {
            return Err(PluginError::VersionNotFound(mapping.major_version.clone()));
        }

        let identities: BTreeSet<&str> = IDENTITY_FIELDS
            .iter()
            .copied()
            .chain(mapping.parameters_mapping.references.iter().map(|r| r.property_leaf()))
            .collect();

        let mut rules = Vec::new();
        for (version, props) in &spec.properties {
            if version == CONNECTION_SECRET_REF {
                continue;
            }
            for id in &identities {
                if !props.properties.contains_key(*id) {
                    continue;
                }
                rules.push(ValidationRule::new(
                    cel::required_if(&format!("{version}.{id}"), CONNECTION_SECRET_REF),
                    format!("spec.{CONNECTION_SECRET_REF} must be set if spec.{version}.{id} is set."),
                ));
            }
        }
        for rule in rules {
            spec.add_validation(rule);
        }

        Ok(())
    }
}
