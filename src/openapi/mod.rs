//! OpenAPI documents: model and loaders

pub mod loader;
pub mod types;

pub use loader::{parse_document, LoadError, Loader, PackageLoader, PathLoader};
pub use types::*;
