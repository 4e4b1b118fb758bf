//! Property plugins, run by the converter on every schema node

mod read_only;
mod read_write;
mod sensitive;
mod skipped;

pub use read_only::ReadOnlyProperty;
pub use read_write::ReadWriteProperty;
pub use sensitive::{SensitiveProperties, SENSITIVE_PREFIX};
pub use skipped::SkippedProperties;
