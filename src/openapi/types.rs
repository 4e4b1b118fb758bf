//! OpenAPI 3.0 document model
//!
//! Only the parts of the document the compiler reads are modelled; unknown
//! keys are ignored during deserialization.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Prefix of local schema references
pub const SCHEMAS_PREFIX: &str = "#/components/schemas/";
const PARAMETERS_PREFIX: &str = "#/components/parameters/";
const REQUEST_BODIES_PREFIX: &str = "#/components/requestBodies/";

/// Upper bound on chained `$ref` hops
const MAX_REF_HOPS: usize = 32;

/// OpenAPI specification
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpenApiDocument {
    /// OpenAPI version
    #[serde(default)]
    pub openapi: String,

    /// API information
    #[serde(default)]
    pub info: ApiInfo,

    /// Paths/endpoints
    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,

    #[serde(default)]
    pub components: Components,
}

/// API information
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiInfo {
    #[serde(default)]
    pub title: String,

    /// API version
    #[serde(default)]
    pub version: String,
}

/// Path item (endpoint)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,

    /// Parameters shared by every operation of the path
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
}

impl PathItem {
    /// Operation for an HTTP verb, case-insensitive
    pub fn operation(&self, verb: &str) -> Option<&Operation> {
        match verb.to_ascii_lowercase().as_str() {
            "get" => self.get.as_ref(),
            "post" => self.post.as_ref(),
            "put" => self.put.as_ref(),
            "delete" => self.delete.as_ref(),
            "patch" => self.patch.as_ref(),
            _ => None,
        }
    }
}

/// API operation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// Operation parameters
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,

    /// Request body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
}

/// Parameter, or a `$ref` to one under `components.parameters`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    /// Parameter name
    #[serde(default)]
    pub name: String,

    /// Parameter location
    #[serde(rename = "in", default)]
    pub location: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Whether parameter is required
    #[serde(default)]
    pub required: bool,

    /// Parameter schema
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

/// Request body, or a `$ref` to one under `components.requestBodies`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestBody {
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Content by media type
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,

    #[serde(default)]
    pub required: bool,
}

/// Media type
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

/// Components (v3)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    #[serde(default)]
    pub schemas: IndexMap<String, Schema>,

    #[serde(default)]
    pub parameters: IndexMap<String, Parameter>,

    #[serde(default)]
    pub request_bodies: IndexMap<String, RequestBody>,
}

/// `type` is a single name in 3.0 documents and may be a list in later ones
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    Single(String),
    Multiple(Vec<String>),
}

/// `additionalProperties` is either a boolean or a schema
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Bool(bool),
    Schema(Box<Schema>),
}

/// Schema
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    /// Schema reference
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<SchemaType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,

    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_: Vec<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<f64>,

    /// Required properties
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,

    #[serde(default)]
    pub read_only: bool,

    /// Schema items (for arrays)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, Schema>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<AdditionalProperties>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<Schema>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<Schema>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<Schema>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not: Option<Box<Schema>>,
}

impl Schema {
    /// First declared type name
    pub fn type_name(&self) -> Option<&str> {
        match self.type_.as_ref()? {
            SchemaType::Single(name) => Some(name.as_str()),
            SchemaType::Multiple(names) => names.first().map(String::as_str),
        }
    }

    /// A schema holding only a `$ref`
    pub fn reference(target: impl Into<String>) -> Self {
        Self {
            reference: Some(target.into()),
            ..Default::default()
        }
    }

    /// `true` when `additionalProperties: true` was declared
    pub fn allows_additional_properties(&self) -> bool {
        matches!(self.additional_properties, Some(AdditionalProperties::Bool(true)))
    }

    /// Schema given for `additionalProperties`, if any
    pub fn additional_properties_schema(&self) -> Option<&Schema> {
        match &self.additional_properties {
            Some(AdditionalProperties::Schema(schema)) => Some(schema),
            _ => None,
        }
    }
}

/// Name a `$ref` points at, e.g. `Group` for `#/components/schemas/Group`
pub fn ref_name(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or(reference)
}

impl OpenApiDocument {
    /// A named schema under `components.schemas`
    pub fn schema(&self, name: &str) -> Option<&Schema> {
        self.components.schemas.get(name)
    }

    /// Follow `$ref`s until a concrete schema is reached.
    ///
    /// Returns `None` for dangling or non-local references and for reference
    /// chains that never reach a concrete schema.
    pub fn resolve<'a>(&'a self, schema: &'a Schema) -> Option<&'a Schema> {
        let mut current = schema;
        for _ in 0..MAX_REF_HOPS {
            let Some(reference) = &current.reference else {
                return Some(current);
            };
            current = self
                .components
                .schemas
                .get(reference.strip_prefix(SCHEMAS_PREFIX)?)?;
        }
        None
    }

    pub fn path(&self, name: &str) -> Option<&PathItem> {
        self.paths.get(name)
    }

    /// Resolve a parameter `$ref` against `components.parameters`
    pub fn resolve_parameter<'a>(&'a self, parameter: &'a Parameter) -> Option<&'a Parameter> {
        match &parameter.reference {
            None => Some(parameter),
            Some(reference) => self
                .components
                .parameters
                .get(reference.strip_prefix(PARAMETERS_PREFIX)?),
        }
    }

    /// Resolve a request body `$ref` against `components.requestBodies`
    pub fn resolve_request_body<'a>(&'a self, body: &'a RequestBody) -> Option<&'a RequestBody> {
        match &body.reference {
            None => Some(body),
            Some(reference) => self
                .components
                .request_bodies
                .get(reference.strip_prefix(REQUEST_BODIES_PREFIX)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r##"
openapi: 3.0.1
info:
  title: Test
  version: "1.0"
paths:
  /groups:
    parameters:
      - $ref: "#/components/parameters/envelope"
    post:
      parameters:
        - name: projectOwnerId
          in: query
          schema:
            type: string
      requestBody:
        $ref: "#/components/requestBodies/GroupBody"
components:
  parameters:
    envelope:
      name: envelope
      in: query
      schema:
        type: boolean
  requestBodies:
    GroupBody:
      content:
        application/json:
          schema:
            $ref: "#/components/schemas/Group"
  schemas:
    Alias:
      $ref: "#/components/schemas/Group"
    Group:
      type: object
      properties:
        name:
          type: [string, "null"]
        tags:
          type: object
          additionalProperties: true
"##;

    fn document() -> OpenApiDocument {
        serde_yaml::from_str(DOCUMENT).unwrap()
    }

    #[test]
    fn test_resolve_follows_reference_chain() {
        let doc = document();
        let alias = Schema::reference("#/components/schemas/Alias");
        let resolved = doc.resolve(&alias).unwrap();
        assert_eq!(resolved.type_name(), Some("object"));
        assert_eq!(resolved.properties["name"].type_name(), Some("string"));
        assert!(resolved.properties["tags"].allows_additional_properties());
    }

    #[test]
    fn test_resolve_dangling_and_cyclic_references() {
        let mut doc = document();
        assert!(doc.resolve(&Schema::reference("#/components/schemas/Missing")).is_none());
        assert!(doc.resolve(&Schema::reference("other.yaml#/Group")).is_none());

        doc.components
            .schemas
            .insert("Loop".into(), Schema::reference("#/components/schemas/Loop"));
        assert!(doc.resolve(&Schema::reference("#/components/schemas/Loop")).is_none());
    }

    #[test]
    fn test_operation_parameters_and_body() {
        let doc = document();
        let path = doc.path("/groups").unwrap();
        let post = path.operation("POST").unwrap();
        assert!(path.operation("get").is_none());

        let shared = doc.resolve_parameter(&path.parameters[0]).unwrap();
        assert_eq!(shared.name, "envelope");

        let body = doc
            .resolve_request_body(post.request_body.as_ref().unwrap())
            .unwrap();
        let schema = body.content["application/json"].schema.as_ref().unwrap();
        assert_eq!(ref_name(schema.reference.as_deref().unwrap()), "Group");
    }
}
