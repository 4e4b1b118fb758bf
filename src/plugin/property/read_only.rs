use crate::plugin::{PropertyPlugin, PropertyRequest};
use crate::utils::is_root;

/// Keeps only read-only properties when the `readOnly` filter is set.
///
/// Writable nodes below the root are dropped; the root survives with
/// `required` narrowed to its read-only children.
#[derive(Debug, Default)]
pub struct ReadOnlyProperty;

impl PropertyPlugin for ReadOnlyProperty {
    fn name(&self) -> &'static str {
        "read_only_property"
    }

    fn process(&self, request: &mut PropertyRequest<'_>) {
        if !request.mapping.filters.read_only || request.schema.read_only {
            return;
        }

        let Some(property) = &request.property else {
            return;
        };
        let required: Vec<String> = property
            .required
            .iter()
            .filter(|key| request.child_schema(key).is_some_and(|s| s.read_only))
            .cloned()
            .collect();

        if !is_root(request.path) {
            request.property = None;
            return;
        }

        if let Some(property) = request.property.as_mut() {
            property.required = required;
        }
    }
}
