//! `product://catalog` and `product://inventory` resources.

use std::sync::Arc;

use serde_json::json;

use crate::catalog::CatalogStore;
use crate::error::CapabilityResult;
use crate::mcp::envelope::{to_json_text, Payload, ResourceContents};
use crate::mcp::registry::{CapabilityDescriptor, CapabilityHandler};
use crate::mcp::schema::Arguments;

/// URI of the catalog resource.
pub const CATALOG_URI: &str = "product://catalog";
/// URI of the inventory resource.
pub const INVENTORY_URI: &str = "product://inventory";

const JSON_MIME: &str = "application/json";

fn json_contents(uri: &str, text: String) -> Payload {
    Payload::Resource(ResourceContents {
        uri: uri.to_string(),
        mime_type: JSON_MIME.to_string(),
        text,
    })
}

/// Full product list.
pub struct CatalogResource {
    store: Arc<dyn CatalogStore>,
}

impl CatalogResource {
    /// Creates the resource over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Returns the resource descriptor.
    #[must_use]
    pub fn descriptor() -> CapabilityDescriptor {
        CapabilityDescriptor::resource(
            CATALOG_URI,
            "Product Catalog",
            "Access to the Active Apparel Group product catalog",
            JSON_MIME,
        )
    }
}

impl CapabilityHandler for CatalogResource {
    fn invoke(&self, _args: &Arguments) -> CapabilityResult<Payload> {
        let products = self.store.list_products()?;
        let text = to_json_text(&json!({ "products": products }))?;
        Ok(json_contents(CATALOG_URI, text))
    }
}

/// Current stock snapshot.
pub struct InventoryResource {
    store: Arc<dyn CatalogStore>,
}

impl InventoryResource {
    /// Creates the resource over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Returns the resource descriptor.
    #[must_use]
    pub fn descriptor() -> CapabilityDescriptor {
        CapabilityDescriptor::resource(
            INVENTORY_URI,
            "Inventory Status",
            "Current inventory levels and stock information",
            JSON_MIME,
        )
    }
}

impl CapabilityHandler for InventoryResource {
    fn invoke(&self, _args: &Arguments) -> CapabilityResult<Payload> {
        let snapshot = self.store.inventory_snapshot()?;
        let text = to_json_text(&snapshot)?;
        Ok(json_contents(INVENTORY_URI, text))
    }
}
