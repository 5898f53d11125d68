//! Schema model
//!
//! Describes which row columns belong to which entity and how entities nest.
//! Schemas are validated once at construction.

pub mod plan;
pub mod property;

pub use plan::{Schema, SchemaDocument};
pub use property::Property;
