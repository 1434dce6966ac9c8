//! `blockforge-schema` — which node types may nest where, and which
//! attributes each accepts.

pub mod registry;
pub mod validation;

pub use registry::{AllowedValues, RegistryError, SchemaEntry, SchemaRegistry, ROOT};
pub use validation::{validate, ValidatedTree, Validator};
