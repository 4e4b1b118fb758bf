//! Converter tests

use super::*;
use crate::extensions::OPENAPI_MAPPING;
use crate::openapi::parse_document;
use serde_json::json;

const DOCUMENT: &str = r##"
openapi: 3.0.1
paths: {}
components:
  schemas:
    Account:
      type: object
      required: [username, password, internal, missing]
      properties:
        username:
          type: string
          description: Login name
          example: admin
        password:
          type: string
          format: password
        internal:
          type: string
        createdAt:
          type: string
          format: date-time
        email:
          type: string
          format: email
        tags:
          type: array
          items:
            type: string
        labels:
          type: object
          additionalProperties:
            type: string
        metadata:
          type: object
          additionalProperties: true
        settings:
          type: object
    Node:
      type: object
      properties:
        child:
          $ref: "#/components/schemas/Node"
    Pet:
      oneOf:
        - $ref: "#/components/schemas/Dog"
        - $ref: "#/components/schemas/CatOwner"
    Inline:
      oneOf:
        - $ref: "#/components/schemas/Dog"
        - type: object
          properties:
            whiskers:
              type: integer
    Dog:
      type: object
      properties:
        bark:
          type: boolean
    CatOwner:
      type: object
      properties:
        cats:
          type: integer
          format: int32
"##;

fn document() -> OpenApiDocument {
    parse_document(DOCUMENT, "test").unwrap()
}

fn convert_with(
    converter: &PropertyConverter,
    doc: &OpenApiDocument,
    name: &str,
    tree: &mut ExtensionsTree,
) -> Option<JsonSchemaProps> {
    let mapping = PropertyMapping::default();
    let root = tree.root();
    converter.convert(
        PropertyConvertInput::new(doc, doc.schema(name).unwrap(), root, &mapping),
        tree,
    )
}

fn convert(name: &str) -> JsonSchemaProps {
    let doc = document();
    let mut tree = ExtensionsTree::new();
    convert_with(&PropertyConverter::default(), &doc, name, &mut tree).unwrap()
}

#[test]
fn test_scalar_facets_are_copied() {
    let account = convert("Account");
    let username = &account.properties["username"];
    assert_eq!(username.type_name(), "string");
    assert_eq!(username.description.as_deref(), Some("Login name"));
    assert_eq!(username.example, Some(json!("admin")));
    assert!(username.x_kubernetes_preserve_unknown_fields.is_none());
}

#[test]
fn test_required_only_lists_existing_properties() {
    let account = convert("Account");
    assert_eq!(account.required, vec!["internal", "password", "username"]);
}

#[test]
fn test_format_whitelist() {
    let account = convert("Account");
    assert_eq!(account.properties["password"].format.as_deref(), Some("password"));
    assert_eq!(account.properties["createdAt"].format.as_deref(), Some("date-time"));
    assert_eq!(account.properties["email"].format, None);
}

#[test]
fn test_arrays_and_maps() {
    let account = convert("Account");

    let tags = &account.properties["tags"];
    assert_eq!(tags.type_name(), "array");
    assert_eq!(tags.items.as_ref().unwrap().type_name(), "string");

    match account.properties["labels"].additional_properties.as_ref().unwrap() {
        JsonSchemaPropsOrBool::Schema(schema) => assert_eq!(schema.type_name(), "string"),
        other => panic!("unexpected {other:?}"),
    }
    assert!(account.properties["labels"].x_kubernetes_preserve_unknown_fields.is_none());
}

#[test]
fn test_open_objects_preserve_unknown_fields() {
    let account = convert("Account");
    assert_eq!(account.properties["metadata"].x_kubernetes_preserve_unknown_fields, Some(true));
    assert_eq!(account.properties["settings"].x_kubernetes_preserve_unknown_fields, Some(true));
    assert!(account.x_kubernetes_preserve_unknown_fields.is_none());
}

#[test]
fn test_depth_limit_cuts_recursive_schemas() {
    let node = convert("Node");

    let mut levels = 1;
    let mut current = &node;
    while let Some(child) = current.properties.get("child") {
        levels += 1;
        current = child;
    }

    assert_eq!(levels, MAX_DEPTH);
    assert_eq!(current.x_kubernetes_preserve_unknown_fields, Some(true));
}

#[test]
fn test_depth_limit_at_entry() {
    let doc = document();
    let mapping = PropertyMapping::default();
    let mut tree = ExtensionsTree::new();
    let mut input =
        PropertyConvertInput::new(&doc, doc.schema("Dog").unwrap(), tree.root(), &mapping);
    input.depth = MAX_DEPTH;
    assert!(PropertyConverter::default().convert(input, &mut tree).is_none());

    let mut input =
        PropertyConvertInput::new(&doc, doc.schema("Dog").unwrap(), tree.root(), &mapping);
    input.schema = None;
    assert!(PropertyConverter::default().convert(input, &mut tree).is_none());
}

#[test]
fn test_ref_union_becomes_tagged_object() {
    let pet = convert("Pet");

    assert_eq!(pet.type_name(), "object");
    assert!(pet.one_of.is_empty());
    assert!(pet.x_kubernetes_preserve_unknown_fields.is_none());
    assert_eq!(pet.properties["dog"].properties["bark"].type_name(), "boolean");
    assert_eq!(pet.properties["catOwner"].properties["cats"].format.as_deref(), Some("int32"));

    let discriminator = &pet.properties["type"];
    assert_eq!(discriminator.type_name(), "string");
    assert_eq!(discriminator.enum_, vec![json!("dog"), json!("catOwner")]);
    assert_eq!(discriminator.description.as_deref(), Some(DISCRIMINATOR_DESCRIPTION));
}

#[test]
fn test_inline_union_branch_keeps_one_of() {
    let inline = convert("Inline");
    assert_eq!(inline.one_of.len(), 2);
    assert!(inline.properties.is_empty());
    assert_eq!(inline.one_of[1].properties["whiskers"].type_name(), "integer");
}

/// Renames `$.password`, annotates it, and drops `$.internal`
struct SecretPlugin;

impl PropertyPlugin for SecretPlugin {
    fn name(&self) -> &'static str {
        "secret"
    }

    fn process(&self, request: &mut PropertyRequest<'_>) {
        match request.json_path().as_str() {
            "$.password" => {
                if let Some(property) = request.property.as_mut() {
                    property.id = Some("passwordSecretRef".to_string());
                }
                request
                    .extensions
                    .set_extension(request.node, OPENAPI_MAPPING, json!({"property": "$.password"}));
            }
            "$.internal" => request.property = None,
            _ => {}
        }
    }
}

#[test]
fn test_plugins_rename_and_drop_properties() {
    let doc = document();
    let mut tree = ExtensionsTree::new();
    let converter = PropertyConverter::new(vec![Arc::new(SecretPlugin)]);
    let account = convert_with(&converter, &doc, "Account", &mut tree).unwrap();

    assert!(account.properties.contains_key("passwordSecretRef"));
    assert!(!account.properties.contains_key("password"));
    assert!(!account.properties.contains_key("internal"));
    assert_eq!(account.required, vec!["passwordSecretRef", "username"]);

    let root = tree.root();
    let renamed = tree.get_child(root, "passwordSecretRef").unwrap();
    assert_eq!(
        tree.extension(renamed, OPENAPI_MAPPING),
        Some(&json!({"property": "$.password"}))
    );
    assert!(tree.get_child(root, "internal").is_none());
    assert!(tree.get_child(root, "password").is_none());
}

#[test]
fn test_extensions_tree_mirrors_schema() {
    let doc = document();
    let mut tree = ExtensionsTree::new();
    let account = convert_with(&PropertyConverter::default(), &doc, "Account", &mut tree).unwrap();

    let root = tree.root();
    let keys: Vec<&String> = tree.node(root).properties.keys().collect();
    let expected: Vec<&String> = account.properties.keys().collect();
    assert_eq!(keys, expected);

    let tags = tree.get_child(root, "tags").unwrap();
    assert!(tree.node(tags).items.is_some());
}

#[test]
fn test_reconcile_required_follows_renames() {
    let mut props = JsonSchemaProps::object("");
    props.properties.insert("b".into(), JsonSchemaProps::string(""));
    props.properties.insert("aSecretRef".into(), JsonSchemaProps::object(""));
    props.required = vec!["b".into(), "a".into(), "gone".into(), "b".into()];

    let renames = BTreeMap::from([("a".to_string(), "aSecretRef".to_string())]);
    reconcile_required(&mut props, &renames);
    assert_eq!(props.required, vec!["aSecretRef", "b"]);
}
