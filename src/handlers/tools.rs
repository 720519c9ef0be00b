//! Catalog tools: `search_products`, `check_inventory`, `update_product`.

use std::sync::Arc;

use serde_json::json;

use crate::catalog::{CatalogStore, ProductUpdate, SearchQuery, CATEGORIES, MUTABLE_FIELDS};
use crate::error::CapabilityResult;
use crate::mcp::envelope::{Payload, ToolCallResult};
use crate::mcp::registry::{CapabilityDescriptor, CapabilityHandler};
use crate::mcp::schema::{Arguments, ParamSpec, ParamType};

/// Searches the catalog by text, category and price.
pub struct SearchProductsTool {
    store: Arc<dyn CatalogStore>,
}

impl SearchProductsTool {
    /// Tool name.
    pub const NAME: &'static str = "search_products";

    /// Creates the tool over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Returns the tool descriptor.
    #[must_use]
    pub fn descriptor() -> CapabilityDescriptor {
        CapabilityDescriptor::tool(
            Self::NAME,
            "Search for products in the catalog by name, category, or other criteria. \
             The query is matched case-insensitively against product names and descriptions; \
             an empty query matches every product.",
            vec![
                ParamSpec::required("query", ParamType::String, "Search query for products"),
                ParamSpec::optional("category", ParamType::String, "Filter by product category")
                    .with_allowed(&CATEGORIES),
                ParamSpec::optional(
                    "max_price",
                    ParamType::Number,
                    "Maximum price filter (inclusive)",
                )
                .with_minimum(0.0),
            ],
        )
    }
}

impl CapabilityHandler for SearchProductsTool {
    fn invoke(&self, args: &Arguments) -> CapabilityResult<Payload> {
        let mut query = SearchQuery::new(args.require_str("query")?);
        if let Some(category) = args.get_str("category") {
            query = query.with_category(category);
        }
        if let Some(max_price) = args.get_f64("max_price") {
            query = query.with_max_price(max_price);
        }

        let products = self.store.search(&query)?;
        tracing::debug!(query = %query.query, matches = products.len(), "Catalog search");

        let result = json!({
            "query": query.query,
            "category": query.category,
            "max_price": query.max_price,
            "count": products.len(),
            "products": products,
        });
        ToolCallResult::json(&result).map(Payload::Tool)
    }
}

/// Returns the inventory record for one product.
pub struct CheckInventoryTool {
    store: Arc<dyn CatalogStore>,
}

impl CheckInventoryTool {
    /// Tool name.
    pub const NAME: &'static str = "check_inventory";

    /// Creates the tool over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Returns the tool descriptor.
    #[must_use]
    pub fn descriptor() -> CapabilityDescriptor {
        CapabilityDescriptor::tool(
            Self::NAME,
            "Check inventory levels for a specific product",
            vec![ParamSpec::required(
                "product_id",
                ParamType::String,
                "Product ID to check inventory for",
            )],
        )
    }
}

impl CapabilityHandler for CheckInventoryTool {
    fn invoke(&self, args: &Arguments) -> CapabilityResult<Payload> {
        let record = self.store.get_inventory(args.require_str("product_id")?)?;
        ToolCallResult::json(&record).map(Payload::Tool)
    }
}

/// Applies a partial update to a product.
pub struct UpdateProductTool {
    store: Arc<dyn CatalogStore>,
}

impl UpdateProductTool {
    /// Tool name.
    pub const NAME: &'static str = "update_product";

    /// Creates the tool over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Returns the tool descriptor.
    #[must_use]
    pub fn descriptor() -> CapabilityDescriptor {
        CapabilityDescriptor::tool(
            Self::NAME,
            &format!(
                "Update product information in the catalog. Only these fields may be \
                 changed: {}. Unknown fields are rejected.",
                MUTABLE_FIELDS.join(", ")
            ),
            vec![
                ParamSpec::required("product_id", ParamType::String, "Product ID to update"),
                ParamSpec::required("updates", ParamType::Object, "Fields to update")
                    .with_properties(MUTABLE_FIELDS.into_iter().map(mutable_field).collect()),
            ],
        )
    }
}

/// Schema of one member of the `updates` object.
fn mutable_field(field: &str) -> ParamSpec {
    match field {
        "price" => ParamSpec::optional(field, ParamType::Number, "New price").with_minimum(0.0),
        "category" => ParamSpec::optional(field, ParamType::String, "New category")
            .with_allowed(&CATEGORIES),
        "sizes" => ParamSpec::optional(field, ParamType::Array, "Available sizes"),
        "colors" => ParamSpec::optional(field, ParamType::Array, "Available colors"),
        "name" => ParamSpec::optional(field, ParamType::String, "New product name"),
        _ => ParamSpec::optional(field, ParamType::String, "New value"),
    }
}

impl CapabilityHandler for UpdateProductTool {
    fn invoke(&self, args: &Arguments) -> CapabilityResult<Payload> {
        let product_id = args.require_str("product_id")?;
        let update = ProductUpdate::from_fields(args.require_object("updates")?)?;

        let product = self.store.update_product(product_id, &update)?;
        tracing::info!(
            product_id,
            fields = ?update.changed_fields(),
            "Product updated via tool call"
        );

        let result = json!({
            "status": "updated",
            "updated_fields": update.changed_fields(),
            "product": product,
        });
        ToolCallResult::json(&result).map(Payload::Tool)
    }
}
