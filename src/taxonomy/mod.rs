//! Versioned skill taxonomy: external catalog format and the immutable store

pub mod catalog;
pub mod store;

pub use catalog::{CatalogEntry, SkillCategory, TaxonomyCatalog};
pub use store::{SkillEntity, TaxonomyRegistry, TaxonomyStore};
