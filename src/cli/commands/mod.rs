//! CLI command modules

pub mod generate;
pub mod plugins;
pub mod validate;
