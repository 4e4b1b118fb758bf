//! Recursive OpenAPI to CRD schema converter
//!
//! Every call converts one OpenAPI schema node into one CRD schema node and
//! keeps one extensions-tree node in step with it. Property plugins run on
//! each node once its children are built.

use inflections::Inflect;
use openapi2crd_crd::{JsonSchemaProps, JsonSchemaPropsOrBool, SUPPORTED_FORMATS};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::trace;

use crate::config::PropertyMapping;
use crate::extensions::{ExtensionsTree, NodeId};
use crate::openapi::{ref_name, OpenApiDocument, Schema};
use crate::plugin::{PropertyPlugin, PropertyRequest};
use crate::utils::{ITEMS_SEGMENT, ROOT_SEGMENT};

/// Recursion bound; deeper branches are left out of the output
pub const MAX_DEPTH: usize = 10;

/// Description of the synthetic discriminator of tagged unions
pub const DISCRIMINATOR_DESCRIPTION: &str =
    "Type is the discriminator for the different possible values";

/// Input of one conversion step
#[derive(Clone)]
pub struct PropertyConvertInput<'a> {
    pub document: &'a OpenApiDocument,
    pub schema: Option<&'a Schema>,
    /// Extensions node receiving this node's annotations
    pub extensions: NodeId,
    pub property_config: &'a PropertyMapping,
    pub depth: usize,
    pub path: Vec<String>,
}

impl<'a> PropertyConvertInput<'a> {
    /// Input for the root of a conversion
    pub fn new(
        document: &'a OpenApiDocument,
        schema: &'a Schema,
        extensions: NodeId,
        property_config: &'a PropertyMapping,
    ) -> Self {
        Self {
            document,
            schema: Some(schema),
            extensions,
            property_config,
            depth: 0,
            path: vec![ROOT_SEGMENT.to_string()],
        }
    }

    fn child(&self, schema: Option<&'a Schema>, extensions: NodeId, segment: Option<&str>) -> Self {
        let mut path = self.path.clone();
        if let Some(segment) = segment {
            path.push(segment.to_string());
        }
        Self {
            document: self.document,
            schema,
            extensions,
            property_config: self.property_config,
            depth: self.depth + 1,
            path,
        }
    }
}

/// Converts OpenAPI schema nodes into CRD schema nodes
pub trait Converter {
    fn convert(
        &self,
        input: PropertyConvertInput<'_>,
        tree: &mut ExtensionsTree,
    ) -> Option<JsonSchemaProps>;
}

/// Converter running a chain of property plugins on every node
#[derive(Default, Clone)]
pub struct PropertyConverter {
    plugins: Vec<Arc<dyn PropertyPlugin>>,
}

impl PropertyConverter {
    pub fn new(plugins: Vec<Arc<dyn PropertyPlugin>>) -> Self {
        Self { plugins }
    }

    fn convert_slice<'a>(
        &self,
        schemas: &'a [Schema],
        input: &PropertyConvertInput<'a>,
        tree: &mut ExtensionsTree,
    ) -> Vec<JsonSchemaProps> {
        schemas
            .iter()
            .filter_map(|schema| {
                self.convert(input.child(Some(schema), input.extensions, None), tree)
            })
            .collect()
    }

    /// Convert child properties, returning them with the renames plugins applied
    fn convert_properties<'a>(
        &self,
        schema: &'a Schema,
        input: &PropertyConvertInput<'a>,
        tree: &mut ExtensionsTree,
    ) -> (BTreeMap<String, JsonSchemaProps>, BTreeMap<String, String>) {
        let mut properties = BTreeMap::new();
        let mut renames = BTreeMap::new();

        for (key, child_schema) in &schema.properties {
            let child_node = tree.alloc();
            let Some(mut result) =
                self.convert(input.child(Some(child_schema), child_node, Some(key.as_str())), tree)
            else {
                continue;
            };

            let name = match result.id.take() {
                Some(id) => {
                    renames.insert(key.clone(), id.clone());
                    id
                }
                None => key.clone(),
            };

            tree.attach(input.extensions, name.clone(), child_node);
            properties.insert(name, result);
        }

        (properties, renames)
    }

    /// Rewrite a `oneOf` of `$ref`s into an object with one property per
    /// branch and a string discriminator.
    fn tagged_union<'a>(
        &self,
        mut props: JsonSchemaProps,
        schema: &'a Schema,
        input: &PropertyConvertInput<'a>,
        tree: &mut ExtensionsTree,
    ) -> JsonSchemaProps {
        props.type_ = Some("object".to_string());
        props.one_of.clear();
        if !schema.allows_additional_properties() {
            props.x_kubernetes_preserve_unknown_fields = None;
        }

        let mut options = Vec::with_capacity(schema.one_of.len());
        for branch in &schema.one_of {
            let Some(reference) = &branch.reference else {
                continue;
            };
            let name = ref_name(reference).to_camel_case();
            options.push(Value::String(name.clone()));

            let branch_node = tree.alloc();
            if let Some(converted) =
                self.convert(input.child(Some(branch), branch_node, Some(name.as_str())), tree)
            {
                tree.attach(input.extensions, name.clone(), branch_node);
                props.properties.insert(name, converted);
            }
        }

        props.properties.insert(
            "type".to_string(),
            JsonSchemaProps {
                type_: Some("string".to_string()),
                description: Some(DISCRIMINATOR_DESCRIPTION.to_string()),
                enum_: options,
                ..Default::default()
            },
        );

        props
    }
}

/// Whether `schema` is a `oneOf` made only of references
fn is_ref_union(schema: &Schema) -> bool {
    !schema.one_of.is_empty() && schema.one_of.iter().all(|s| s.reference.is_some())
}

/// Recompute `required` as the sorted set of surviving property keys,
/// following renames applied by property plugins.
pub fn reconcile_required(props: &mut JsonSchemaProps, renames: &BTreeMap<String, String>) {
    let required: BTreeSet<String> = props
        .required
        .iter()
        .map(|key| renames.get(key).unwrap_or(key))
        .filter(|key| props.properties.contains_key(key.as_str()))
        .cloned()
        .collect();
    props.required = required.into_iter().collect();
}

impl Converter for PropertyConverter {
    fn convert(
        &self,
        input: PropertyConvertInput<'_>,
        tree: &mut ExtensionsTree,
    ) -> Option<JsonSchemaProps> {
        if input.depth >= MAX_DEPTH {
            trace!("Depth limit reached at {:?}", input.path);
            return None;
        }

        let mut input = input;
        if input.path.is_empty() {
            input.path.push(ROOT_SEGMENT.to_string());
        }

        let schema = input.document.resolve(input.schema?)?;
        let node = input.extensions;

        let mut props = JsonSchemaProps {
            type_: schema.type_name().map(str::to_string),
            format: schema.format.clone(),
            title: schema.title.clone(),
            description: schema.description.clone(),
            example: schema.example.clone(),
            enum_: schema.enum_.clone(),
            multiple_of: schema.multiple_of,
            required: schema.required.clone(),
            ..Default::default()
        };

        if let Some(items) = schema.items.as_deref() {
            let items_node = tree.items(node);
            props.items = self
                .convert(input.child(Some(items), items_node, Some(ITEMS_SEGMENT)), tree)
                .map(Box::new);
        }

        let union = is_ref_union(schema);

        props.all_of = self.convert_slice(&schema.all_of, &input, tree);
        props.any_of = self.convert_slice(&schema.any_of, &input, tree);
        if !union {
            props.one_of = self.convert_slice(&schema.one_of, &input, tree);
        }

        let (properties, renames) = self.convert_properties(schema, &input, tree);
        props.properties = properties;

        if let Some(not) = schema.not.as_deref() {
            props.not = self
                .convert(input.child(Some(not), node, None), tree)
                .map(Box::new);
        }

        if let Some(additional) = schema.additional_properties_schema() {
            props.additional_properties = Some(
                match self.convert(input.child(Some(additional), node, None), tree) {
                    Some(converted) => JsonSchemaPropsOrBool::Schema(Box::new(converted)),
                    None => JsonSchemaPropsOrBool::Bool(true),
                },
            );
        }

        let mut request = PropertyRequest {
            property: Some(props),
            schema,
            document: input.document,
            mapping: input.property_config,
            extensions: &mut *tree,
            node,
            path: &input.path,
        };
        for plugin in &self.plugins {
            plugin.process(&mut request);
            if request.property.is_none() {
                trace!("{} dropped {}", plugin.name(), request.json_path());
                return None;
            }
        }
        let mut props = request.property?;

        if props.type_.is_none() {
            props.type_ = Some("object".to_string());
        }

        if props.is_object()
            && props.items.is_none()
            && props.properties.is_empty()
            && props.additional_properties.is_none()
        {
            props.x_kubernetes_preserve_unknown_fields = Some(true);
        }

        if schema.allows_additional_properties() {
            props.x_kubernetes_preserve_unknown_fields = Some(true);
        }

        if let Some(format) = &props.format {
            if !SUPPORTED_FORMATS.contains(&format.as_str()) {
                props.format = None;
            }
        }

        if union && props.properties.is_empty() && props.additional_properties.is_none() {
            props = self.tagged_union(props, schema, &input, tree);
        } else if union {
            props.one_of = self.convert_slice(&schema.one_of, &input, tree);
        }

        reconcile_required(&mut props, &renames);

        Some(props)
    }
}

#[cfg(test)]
mod tests;
