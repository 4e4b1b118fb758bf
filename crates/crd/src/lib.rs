//! CustomResourceDefinition model, rendering and structural validation

pub mod schema;
pub mod types;
pub mod validation;

pub use schema::{
    CustomResourceDefinition, CustomResourceDefinitionNames, CustomResourceDefinitionSpec,
    CustomResourceDefinitionStatus, CustomResourceDefinitionVersion, CustomResourceSubresources,
    CustomResourceValidation, ObjectMeta, PrinterColumn, ResourceScope, StatusSubresource,
};
pub use types::{JsonSchemaProps, JsonSchemaPropsOrBool, ValidationRule, SUPPORTED_FORMATS};
pub use validation::{CrdValidator, StructuralValidator};
