//! Prompt generators: `product_analysis` and `inventory_report`.

use std::fmt::Write as _;
use std::sync::Arc;

use serde_json::json;

use crate::catalog::{CatalogStore, InventoryRecord, Product};
use crate::error::CapabilityResult;
use crate::mcp::envelope::{Payload, PromptResult};
use crate::mcp::registry::{CapabilityDescriptor, CapabilityHandler};
use crate::mcp::schema::{Arguments, ParamSpec, ParamType};

const DEFAULT_TIMEFRAME: &str = "30 days";
const ALL_CATEGORIES: &str = "all categories";

/// Builds an analysis prompt for one product.
pub struct ProductAnalysisPrompt {
    store: Arc<dyn CatalogStore>,
}

impl ProductAnalysisPrompt {
    /// Prompt name.
    pub const NAME: &'static str = "product_analysis";

    /// Creates the prompt over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Returns the prompt descriptor.
    #[must_use]
    pub fn descriptor() -> CapabilityDescriptor {
        CapabilityDescriptor::prompt(
            Self::NAME,
            "Analyze product performance and provide insights",
            vec![
                ParamSpec::required("product_id", ParamType::String, "Product ID to analyze"),
                ParamSpec::optional(
                    "timeframe",
                    ParamType::String,
                    "Analysis timeframe (e.g., '30 days', '6 months')",
                )
                .with_default(json!(DEFAULT_TIMEFRAME)),
            ],
        )
    }

    fn render(product: &Product, timeframe: &str) -> String {
        format!(
            "Please analyze the performance of product {id} ({name}, {category}, ${price:.2}) \
             over the last {timeframe}.\n\
             \n\
             Consider the following aspects:\n\
             1. Sales performance and trends\n\
             2. Inventory turnover rates\n\
             3. Customer feedback and reviews\n\
             4. Competitive positioning\n\
             5. Recommendations for optimization\n\
             \n\
             Use the available product catalog and inventory data to provide specific insights.",
            id = product.id,
            name = product.name,
            category = product.category,
            price = product.price,
        )
    }
}

impl CapabilityHandler for ProductAnalysisPrompt {
    fn invoke(&self, args: &Arguments) -> CapabilityResult<Payload> {
        let product = self.store.get_product(args.require_str("product_id")?)?;
        let timeframe = args.get_str("timeframe").unwrap_or(DEFAULT_TIMEFRAME);

        Ok(Payload::Prompt(PromptResult::user_text(
            format!("Product analysis for {}", product.id),
            Self::render(&product, timeframe),
        )))
    }
}

/// Builds an inventory status report prompt, optionally scoped to a category.
pub struct InventoryReportPrompt {
    store: Arc<dyn CatalogStore>,
    low_stock_threshold: u32,
}

impl InventoryReportPrompt {
    /// Prompt name.
    pub const NAME: &'static str = "inventory_report";

    /// Creates the prompt over `store`, flagging products with fewer than
    /// `low_stock_threshold` available units.
    #[must_use]
    pub fn new(store: Arc<dyn CatalogStore>, low_stock_threshold: u32) -> Self {
        Self {
            store,
            low_stock_threshold,
        }
    }

    /// Returns the prompt descriptor.
    #[must_use]
    pub fn descriptor() -> CapabilityDescriptor {
        CapabilityDescriptor::prompt(
            Self::NAME,
            "Generate an inventory status report",
            vec![ParamSpec::optional(
                "category",
                ParamType::String,
                "Product category to focus on",
            )],
        )
    }

    fn render(&self, scope: &str, lines: &[(Product, Option<InventoryRecord>)]) -> String {
        let mut text = format!(
            "Generate a comprehensive inventory status report for {scope}.\n\
             \n\
             Include the following information:\n\
             1. Current stock levels for all products\n\
             2. Products with low stock warnings\n\
             3. Products with excess inventory\n\
             4. Recommended restocking actions\n\
             5. Seasonal trends and adjustments needed\n\
             \n\
             Current stock levels:\n"
        );

        if lines.is_empty() {
            let _ = writeln!(text, "- No products found in {scope}.");
        }

        let mut low_stock = Vec::new();
        for (product, record) in lines {
            match record {
                Some(r) => {
                    let _ = writeln!(
                        text,
                        "- {} {}: {} available / {} total ({} reserved)",
                        product.id, product.name, r.available, r.total_stock, r.reserved
                    );
                    if r.available < self.low_stock_threshold {
                        low_stock.push(product.id.as_str());
                    }
                }
                None => {
                    let _ = writeln!(text, "- {} {}: no inventory record", product.id, product.name);
                    low_stock.push(product.id.as_str());
                }
            }
        }

        let _ = write!(
            text,
            "\nLow stock (fewer than {} available): {}\n\
             \n\
             Use the inventory data and product catalog to create actionable insights.",
            self.low_stock_threshold,
            if low_stock.is_empty() {
                "none".to_string()
            } else {
                low_stock.join(", ")
            }
        );

        text
    }
}

impl CapabilityHandler for InventoryReportPrompt {
    fn invoke(&self, args: &Arguments) -> CapabilityResult<Payload> {
        let category = args.get_str("category");
        let scope = category.unwrap_or(ALL_CATEGORIES);

        let snapshot = self.store.inventory_snapshot()?;
        let lines: Vec<_> = self
            .store
            .list_products()?
            .into_iter()
            .filter(|p| category.map_or(true, |c| p.category == c))
            .map(|p| {
                let record = snapshot
                    .inventory
                    .iter()
                    .find(|r| r.product_id == p.id)
                    .cloned();
                (p, record)
            })
            .collect();

        Ok(Payload::Prompt(PromptResult::user_text(
            format!("Inventory report for {scope}"),
            self.render(scope, &lines),
        )))
    }
}
