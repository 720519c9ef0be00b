//! In-memory [`CatalogStore`] implementation.
//!
//! The store is seeded once at startup, either from the built-in sample
//! catalog or from a JSON data file:
//!
//! ```json
//! {
//!   "products": [{ "id": "AAG001", "name": "...", "category": "Activewear",
//!                  "price": 49.99, "description": "...", "sizes": [], "colors": [] }],
//!   "inventory": [{ "product_id": "AAG001", "total_stock": 150, "available": 120,
//!                   "reserved": 30, "last_updated": "2024-01-15T10:30:00Z" }]
//! }
//! ```
//!
//! Updates live for the lifetime of the process only.

use std::collections::HashSet;
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Deserialize;

use super::model::{
    InventoryRecord, InventorySnapshot, Product, ProductUpdate, SearchQuery, CATEGORIES,
};
use super::store::{CatalogStore, DataError, DataResult};
use crate::config::CatalogConfig;
use crate::error::ConfigError;

/// Timestamp of the bundled sample inventory (2024-01-15T10:30:00Z).
const SAMPLE_TIMESTAMP: i64 = 1_705_314_600;

fn sample_product(
    id: &str,
    name: &str,
    price: f64,
    description: &str,
    sizes: &[&str],
    colors: &[&str],
) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        category: "Activewear".to_string(),
        price,
        description: description.to_string(),
        sizes: sizes.iter().map(ToString::to_string).collect(),
        colors: colors.iter().map(ToString::to_string).collect(),
    }
}

/// Seed data for an [`InMemoryStore`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogData {
    /// Catalog products.
    #[serde(default)]
    pub products: Vec<Product>,
    /// Inventory records, at most one per product.
    #[serde(default)]
    pub inventory: Vec<InventoryRecord>,
}

impl CatalogData {
    /// Loads seed data from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable, malformed or
    /// fails [`CatalogData::validate`].
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let data: Self = serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        data.validate()?;

        Ok(data)
    }

    /// The bundled Active Apparel Group sample catalog.
    #[must_use]
    pub fn sample() -> Self {
        let last_updated = DateTime::<Utc>::from_timestamp(SAMPLE_TIMESTAMP, 0).unwrap_or_default();

        let stock = |product_id: &str, total_stock: u32, available: u32, reserved: u32| InventoryRecord {
            product_id: product_id.to_string(),
            total_stock,
            available,
            reserved,
            last_updated,
        };

        Self {
            products: vec![
                sample_product(
                    "AAG001",
                    "Performance Athletic Shirt",
                    49.99,
                    "Moisture-wicking athletic shirt perfect for workouts",
                    &["XS", "S", "M", "L", "XL", "XXL"],
                    &["Black", "Navy", "Gray", "Red"],
                ),
                sample_product(
                    "AAG002",
                    "Yoga Leggings",
                    69.99,
                    "High-waisted compression leggings with side pockets",
                    &["XS", "S", "M", "L", "XL"],
                    &["Black", "Navy", "Charcoal", "Purple"],
                ),
                sample_product(
                    "AAG003",
                    "Running Shorts",
                    39.99,
                    "Lightweight 5-inch inseam running shorts with liner",
                    &["S", "M", "L", "XL", "XXL"],
                    &["Black", "Navy", "Royal Blue", "Green"],
                ),
            ],
            inventory: vec![
                stock("AAG001", 150, 120, 30),
                stock("AAG002", 89, 75, 14),
                stock("AAG003", 200, 180, 20),
            ],
        }
    }

    /// Validates the seed data.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] for duplicate product ids,
    /// empty ids, categories outside [`CATEGORIES`], negative prices, inventory referencing unknown products,
    /// duplicate inventory records, or stock counts that do not add up.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::ValidationError { message };

        let mut ids = HashSet::new();
        for product in &self.products {
            if product.id.trim().is_empty() {
                return Err(invalid("product id must not be empty".to_string()));
            }
            if !ids.insert(product.id.as_str()) {
                return Err(invalid(format!("duplicate product id '{}'", product.id)));
            }
            if !CATEGORIES.contains(&product.category.as_str()) {
                return Err(invalid(format!(
                    "product '{}' has unknown category '{}' (expected one of: {})",
                    product.id,
                    product.category,
                    CATEGORIES.join(", ")
                )));
            }
            if !product.price.is_finite() || product.price < 0.0 {
                return Err(invalid(format!(
                    "product '{}' has invalid price {}",
                    product.id, product.price
                )));
            }
        }

        let mut stocked = HashSet::new();
        for record in &self.inventory {
            if !ids.contains(record.product_id.as_str()) {
                return Err(invalid(format!(
                    "inventory references unknown product '{}'",
                    record.product_id
                )));
            }
            if !stocked.insert(record.product_id.as_str()) {
                return Err(invalid(format!(
                    "duplicate inventory record for '{}'",
                    record.product_id
                )));
            }
            if !record.is_consistent() {
                return Err(invalid(format!(
                    "inventory for '{}': available ({}) + reserved ({}) != total_stock ({})",
                    record.product_id, record.available, record.reserved, record.total_stock
                )));
            }
        }

        Ok(())
    }
}

/// A [`CatalogStore`] backed by ordered in-memory maps.
#[derive(Debug)]
pub struct InMemoryStore {
    products: RwLock<IndexMap<String, Product>>,
    inventory: RwLock<IndexMap<String, InventoryRecord>>,
}

impl InMemoryStore {
    /// Creates a store from seed data.
    ///
    /// Later duplicates overwrite earlier ones; run [`CatalogData::validate`]
    /// first if that matters.
    #[must_use]
    pub fn new(data: CatalogData) -> Self {
        let products = data
            .products
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();
        let inventory = data
            .inventory
            .into_iter()
            .map(|r| (r.product_id.clone(), r))
            .collect();

        Self {
            products: RwLock::new(products),
            inventory: RwLock::new(inventory),
        }
    }

    /// Creates a store holding the bundled sample catalog.
    #[must_use]
    pub fn sample() -> Self {
        Self::new(CatalogData::sample())
    }

    /// Creates a store from the configured data file, or the sample catalog
    /// when none is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the data file cannot be loaded.
    pub fn from_config(settings: &CatalogConfig) -> Result<Self, ConfigError> {
        match settings.data_file {
            Some(ref path) => {
                let data = CatalogData::from_json_file(path)?;
                tracing::info!(
                    path = %path.display(),
                    products = data.products.len(),
                    "Loaded catalog data file"
                );
                Ok(Self::new(data))
            }
            None => {
                tracing::info!("No catalog data file configured, using sample catalog");
                Ok(Self::sample())
            }
        }
    }

    fn products(&self) -> DataResult<RwLockReadGuard<'_, IndexMap<String, Product>>> {
        self.products
            .read()
            .map_err(|_| DataError::unavailable("product table lock poisoned"))
    }

    fn products_mut(&self) -> DataResult<RwLockWriteGuard<'_, IndexMap<String, Product>>> {
        self.products
            .write()
            .map_err(|_| DataError::unavailable("product table lock poisoned"))
    }

    fn inventory(&self) -> DataResult<RwLockReadGuard<'_, IndexMap<String, InventoryRecord>>> {
        self.inventory
            .read()
            .map_err(|_| DataError::unavailable("inventory table lock poisoned"))
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::sample()
    }
}

impl CatalogStore for InMemoryStore {
    fn list_products(&self) -> DataResult<Vec<Product>> {
        Ok(self.products()?.values().cloned().collect())
    }

    fn get_product(&self, product_id: &str) -> DataResult<Product> {
        self.products()?
            .get(product_id)
            .cloned()
            .ok_or_else(|| DataError::not_found("product", product_id))
    }

    fn search(&self, query: &SearchQuery) -> DataResult<Vec<Product>> {
        Ok(self
            .products()?
            .values()
            .filter(|p| query.matches(p))
            .cloned()
            .collect())
    }

    fn get_inventory(&self, product_id: &str) -> DataResult<InventoryRecord> {
        self.inventory()?
            .get(product_id)
            .cloned()
            .ok_or_else(|| DataError::not_found("inventory record", product_id))
    }

    fn inventory_snapshot(&self) -> DataResult<InventorySnapshot> {
        let records = self.inventory()?.values().cloned().collect();
        Ok(InventorySnapshot::new(records))
    }

    fn update_product(&self, product_id: &str, update: &ProductUpdate) -> DataResult<Product> {
        let mut products = self.products_mut()?;
        let product = products
            .get_mut(product_id)
            .ok_or_else(|| DataError::not_found("product", product_id))?;

        product.apply(update);
        tracing::debug!(
            product_id,
            fields = ?update.changed_fields(),
            "Product updated"
        );

        Ok(product.clone())
    }
}
