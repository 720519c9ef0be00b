//! The data-access interface used by capability handlers.

use thiserror::Error;

use super::model::{InventoryRecord, InventorySnapshot, Product, ProductUpdate, SearchQuery};

/// Result type for data-access operations.
pub type DataResult<T> = Result<T, DataError>;

/// Failures reported by a [`CatalogStore`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataError {
    /// The referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind ("product", "inventory record").
        entity: &'static str,
        /// The identifier that was looked up.
        id: String,
    },

    /// The backing store could not serve the request.
    #[error("data unavailable: {message}")]
    Unavailable {
        /// Description of the failure.
        message: String,
    },
}

impl DataError {
    /// Creates a [`DataError::NotFound`].
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Creates a [`DataError::Unavailable`].
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

/// Storage and retrieval of products and inventory.
///
/// Implementations may block; handlers call them synchronously, one request at
/// a time per session.
pub trait CatalogStore: Send + Sync {
    /// Returns every product in catalog order.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Unavailable`] if the store cannot be read.
    fn list_products(&self) -> DataResult<Vec<Product>>;

    /// Returns one product.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::NotFound`] for an unknown id.
    fn get_product(&self, product_id: &str) -> DataResult<Product>;

    /// Returns the products matching `query`, in catalog order.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Unavailable`] if the store cannot be read.
    fn search(&self, query: &SearchQuery) -> DataResult<Vec<Product>>;

    /// Returns the inventory record for one product.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::NotFound`] if the product has no inventory record.
    fn get_inventory(&self, product_id: &str) -> DataResult<InventoryRecord>;

    /// Returns every inventory record.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Unavailable`] if the store cannot be read.
    fn inventory_snapshot(&self) -> DataResult<InventorySnapshot>;

    /// Applies a partial update and returns the updated product.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::NotFound`] for an unknown id.
    fn update_product(&self, product_id: &str, update: &ProductUpdate) -> DataResult<Product>;
}
