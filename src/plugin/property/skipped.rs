use crate::plugin::{PropertyPlugin, PropertyRequest};
use crate::utils::json_path;

/// Drops properties whose JSON path is listed in `skipProperties`
#[derive(Debug, Default)]
pub struct SkippedProperties;

impl PropertyPlugin for SkippedProperties {
    fn name(&self) -> &'static str {
        "skipped_properties"
    }

    fn process(&self, request: &mut PropertyRequest<'_>) {
        let skip = &request.mapping.filters.skip_properties;
        if skip.is_empty() {
            return;
        }

        let path = request.json_path();
        if skip.contains(&path) {
            request.property = None;
            return;
        }

        let Some(property) = request.property.as_mut() else {
            return;
        };
        if property.properties.is_empty() {
            return;
        }

        let mut segments = request.path.to_vec();
        property.required.retain(|key| {
            segments.push(key.clone());
            let skipped = skip.contains(&json_path(&segments));
            segments.pop();
            !skipped
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Filters;
    use crate::plugin::property::test_support::convert;
    use std::sync::Arc;

    fn skipping(paths: &[&str]) -> Filters {
        Filters {
            skip_properties: paths.iter().map(|p| p.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_skipped_property_removed_from_required() {
        let (result, _) = convert(Arc::new(SkippedProperties), skipping(&["$.password"]), "Credentials");
        let credentials = result.unwrap();
        assert!(!credentials.properties.contains_key("password"));
        assert_eq!(credentials.required, vec!["username"]);
    }

    #[test]
    fn test_skip_inside_arrays() {
        let (result, tree) = convert(Arc::new(SkippedProperties), skipping(&["$.links[*].href"]), "Credentials");
        let links = &result.unwrap().properties["links"];
        let item = links.items.as_ref().unwrap();
        assert!(item.properties.is_empty());
        assert_eq!(item.x_kubernetes_preserve_unknown_fields, Some(true));

        let links_node = tree.get_child(tree.root(), "links").unwrap();
        let item_node = tree.node(links_node).items.unwrap();
        assert!(tree.get_child(item_node, "href").is_none());
    }

    #[test]
    fn test_skip_root() {
        let (result, _) = convert(Arc::new(SkippedProperties), skipping(&["$"]), "Credentials");
        assert!(result.is_none());
    }
}
