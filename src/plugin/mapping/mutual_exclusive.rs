use tracing::debug;

use crate::cel;
use crate::plugin::{MappingPlugin, MappingRequest, PluginError};

/// Requires exactly one of a raw identity field and the reference replacing it
#[derive(Debug, Default)]
pub struct MutualExclusiveGroup;

impl MappingPlugin for MutualExclusiveGroup {
    fn name(&self) -> &'static str {
        "mutual_exclusive_group"
    }

    fn process(&self, request: &mut MappingRequest<'_>) -> Result<(), PluginError> {
        let mapping = request.mapping;
        let version = request.version_props_mut()?;

        let groups = [
            (None, &mapping.parameters_mapping.references),
            (Some("entry"), &mapping.entry_mapping.references),
        ];
        for (key, references) in groups {
            let target = match key {
                Some(key) => match version.property_mut(key) {
                    Some(target) => target,
                    None => continue,
                },
                None => &mut *version,
            };

            for reference in references {
                let leaf = reference.property_leaf();
                if target.property(leaf).is_none() || target.property(&reference.name).is_none() {
                    continue;
                }
                debug!("{} and {} are mutually exclusive", leaf, reference.name);
                target.add_validation(cel::exactly_one_of_rule(&[leaf, reference.name.as_str()]));
            }
        }

        Ok(())
    }
}

/// Requires exactly one major version to be set once several are mapped
#[derive(Debug, Default)]
pub struct MutualExclusiveMajorVersions;

impl MappingPlugin for MutualExclusiveMajorVersions {
    fn name(&self) -> &'static str {
        "mutual_exclusive_major_versions"
    }

    fn process(&self, request: &mut MappingRequest<'_>) -> Result<(), PluginError> {
        let configured = request.crd_config.major_versions();
        let current = request.mapping.major_version.as_str();
        let spec = request
            .crd
            .spec_props_mut()
            .ok_or(PluginError::MissingNode("spec"))?;

        let present: Vec<&str> = configured
            .into_iter()
            .filter(|v| spec.properties.contains_key(*v))
            .collect();
        if present.len() < 2 {
            return Ok(());
        }

        let previous: Vec<&str> = present.iter().copied().filter(|v| *v != current).collect();
        if previous.len() >= 2 {
            let stale = cel::exactly_one_of_rule(&previous);
            spec.x_kubernetes_validations.retain(|rule| *rule != stale);
        }
        spec.add_validation(cel::exactly_one_of_rule(&present));

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::mapping::test_support::{crd_config, group_mapping, Fixture, MAJOR_VERSION};
    use crate::plugin::mapping::{MajorVersion, Parameters, References};

    #[test]
    fn test_identity_and_reference_are_exclusive() {
        let mut fixture = Fixture::cluster();
        fixture
            .run(
                0,
                &[&MajorVersion, &Parameters, &References, &MutualExclusiveGroup],
            )
            .unwrap();

        let rules = &fixture.version(MAJOR_VERSION).x_kubernetes_validations;
        assert_eq!(rules.len(), 1);
        assert_eq!(
            rules[0].rule,
            "(has(self.groupId) && !has(self.groupRef)) || (!has(self.groupId) && has(self.groupRef))"
        );
        assert_eq!(rules[0].message, "exactly one of \"groupId\", \"groupRef\" must be set");
    }

    #[test]
    fn test_no_rule_without_identity_field() {
        let mut fixture = Fixture::cluster();
        fixture
            .run(0, &[&MajorVersion, &References, &MutualExclusiveGroup])
            .unwrap();
        assert!(fixture
            .version(MAJOR_VERSION)
            .x_kubernetes_validations
            .is_empty());
    }

    #[test]
    fn test_group_missing_version() {
        let mut fixture = Fixture::cluster();
        let err = fixture.run(0, &[&MutualExclusiveGroup]).unwrap_err();
        assert_eq!(err.to_string(), "version v20250312 not found in spec");
    }

    #[test]
    fn test_major_versions_rule_tracks_present_versions() {
        let mut fixture = Fixture::new(crd_config(
            "Group",
            vec![
                group_mapping("v20231115"),
                group_mapping(MAJOR_VERSION),
                group_mapping("v20260101"),
            ],
        ));
        fixture
            .run(0, &[&MajorVersion, &MutualExclusiveMajorVersions])
            .unwrap();
        assert!(fixture.spec().x_kubernetes_validations.is_empty());

        fixture
            .run(1, &[&MajorVersion, &MutualExclusiveMajorVersions])
            .unwrap();
        let rules = &fixture.spec().x_kubernetes_validations;
        assert_eq!(rules.len(), 1);
        assert_eq!(
            rules[0].rule,
            "(has(self.v20231115) && !has(self.v20250312)) || (!has(self.v20231115) && has(self.v20250312))"
        );

        fixture
            .run(2, &[&MajorVersion, &MutualExclusiveMajorVersions])
            .unwrap();
        let rules = &fixture.spec().x_kubernetes_validations;
        assert_eq!(rules.len(), 1);
        assert_eq!(
            rules[0].message,
            "exactly one of \"v20231115\", \"v20250312\", \"v20260101\" must be set"
        );
    }
}
