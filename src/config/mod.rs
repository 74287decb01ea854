pub mod catalog;
pub mod settings;

pub use catalog::{CatalogEntry, CatalogSection, ChecklistCatalog};
pub use settings::{HeaderRole, Settings};
