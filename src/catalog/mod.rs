//! Product catalog and inventory data.
//!
//! - [`model`]: products, inventory records, search filters and updates
//! - [`store`]: the [`CatalogStore`] data-access trait
//! - [`memory`]: an in-memory store seeded from sample data or a JSON file

pub mod memory;
pub mod model;
pub mod store;

pub use memory::{CatalogData, InMemoryStore};
pub use model::{
    InventoryRecord, InventorySnapshot, Product, ProductUpdate, SearchQuery, CATEGORIES,
    MUTABLE_FIELDS,
};
pub use store::{CatalogStore, DataError, DataResult};
