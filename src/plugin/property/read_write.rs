use crate::plugin::{PropertyPlugin, PropertyRequest};

/// Drops read-only properties when the `readWriteOnly` filter is set
#[derive(Debug, Default)]
pub struct ReadWriteProperty;

impl PropertyPlugin for ReadWriteProperty {
    fn name(&self) -> &'static str {
        "read_write_property"
    }

    fn process(&self, request: &mut PropertyRequest<'_>) {
        if !request.mapping.filters.read_write_only {
            return;
        }

        if request.schema.read_only {
            request.property = None;
            return;
        }

        let Some(property) = &request.property else {
            return;
        };
        let required: Vec<String> = property
            .required
            .iter()
            .filter(|key| !request.child_schema(key).is_some_and(|s| s.read_only))
            .cloned()
            .collect();

        if let Some(property) = request.property.as_mut() {
            property.required = required;
        }
    }
}
