//! Capability handler adapters.
//!
//! Each adapter binds one resource, tool or prompt to the [`CatalogStore`]:
//!
//! | Kind     | Key                   | Adapter                    |
//! |----------|-----------------------|----------------------------|
//! | resource | `product://catalog`   | [`CatalogResource`]        |
//! | resource | `product://inventory` | [`InventoryResource`]      |
//! | tool     | `search_products`     | [`SearchProductsTool`]     |
//! | tool     | `check_inventory`     | [`CheckInventoryTool`]     |
//! | tool     | `update_product`      | [`UpdateProductTool`]      |
//! | prompt   | `product_analysis`    | [`ProductAnalysisPrompt`]  |
//! | prompt   | `inventory_report`    | [`InventoryReportPrompt`]  |

pub mod prompts;
pub mod resources;
pub mod tools;

pub use prompts::{InventoryReportPrompt, ProductAnalysisPrompt};
pub use resources::{CatalogResource, InventoryResource, CATALOG_URI, INVENTORY_URI};
pub use tools::{CheckInventoryTool, SearchProductsTool, UpdateProductTool};

use std::sync::Arc;

use crate::catalog::CatalogStore;
use crate::config::CatalogConfig;
use crate::error::CapabilityResult;
use crate::mcp::registry::CapabilityRegistry;

/// Registers every catalog capability into `registry`.
///
/// # Errors
///
/// Returns [`crate::error::CapabilityError::DuplicateCapability`] if any key
/// is already registered.
pub fn register_all(
    registry: &mut CapabilityRegistry,
    store: &Arc<dyn CatalogStore>,
    settings: &CatalogConfig,
) -> CapabilityResult<()> {
    registry.register(CatalogResource::descriptor(), CatalogResource::new(Arc::clone(store)))?;
    registry.register(
        InventoryResource::descriptor(),
        InventoryResource::new(Arc::clone(store)),
    )?;

    registry.register(
        SearchProductsTool::descriptor(),
        SearchProductsTool::new(Arc::clone(store)),
    )?;
    registry.register(
        CheckInventoryTool::descriptor(),
        CheckInventoryTool::new(Arc::clone(store)),
    )?;
    registry.register(
        UpdateProductTool::descriptor(),
        UpdateProductTool::new(Arc::clone(store)),
    )?;

    registry.register(
        ProductAnalysisPrompt::descriptor(),
        ProductAnalysisPrompt::new(Arc::clone(store)),
    )?;
    registry.register(
        InventoryReportPrompt::descriptor(),
        InventoryReportPrompt::new(Arc::clone(store), settings.low_stock_threshold),
    )?;

    Ok(())
}

/// Builds a registry holding every catalog capability.
///
/// # Errors
///
/// Propagates registration conflicts from [`register_all`].
pub fn build_registry(
    store: Arc<dyn CatalogStore>,
    settings: &CatalogConfig,
) -> CapabilityResult<CapabilityRegistry> {
    let mut registry = CapabilityRegistry::new();
    register_all(&mut registry, &store, settings)?;
    tracing::info!(capabilities = registry.len(), "Capability registry built");
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;
    use crate::catalog::{
        DataError, DataResult, InMemoryStore, InventoryRecord, InventorySnapshot, Product,
        ProductUpdate, SearchQuery,
    };
    use crate::error::{CapabilityError, ErrorKind};
    use crate::mcp::envelope::{InvocationResponse, Payload, PromptContent};
    use crate::mcp::registry::CapabilityKind;
    use crate::mcp::router::Router;

    /// A store whose every call fails.
    struct OfflineStore;

    impl CatalogStore for OfflineStore {
        fn list_products(&self) -> DataResult<Vec<Product>> {
            Err(DataError::unavailable("offline"))
        }
        fn get_product(&self, _: &str) -> DataResult<Product> {
            Err(DataError::unavailable("offline"))
        }
        fn search(&self, _: &SearchQuery) -> DataResult<Vec<Product>> {
            Err(DataError::unavailable("offline"))
        }
        fn get_inventory(&self, _: &str) -> DataResult<InventoryRecord> {
            Err(DataError::unavailable("offline"))
        }
        fn inventory_snapshot(&self) -> DataResult<InventorySnapshot> {
            Err(DataError::unavailable("offline"))
        }
        fn update_product(&self, _: &str, _: &ProductUpdate) -> DataResult<Product> {
            Err(DataError::unavailable("offline"))
        }
    }

    fn router_over(store: Arc<dyn CatalogStore>, threshold: u32) -> Router {
        let settings = CatalogConfig {
            low_stock_threshold: threshold,
            ..CatalogConfig::default()
        };
        Router::new(Arc::new(build_registry(store, &settings).unwrap()))
    }

    fn sample_router() -> Router {
        router_over(Arc::new(InMemoryStore::sample()), 25)
    }

    fn tool_json(response: InvocationResponse) -> Value {
        match response {
            InvocationResponse::Success(Payload::Tool(result)) => {
                assert!(!result.is_error);
                serde_json::from_str(&result.text_content()).unwrap()
            }
            other => panic!("expected tool success, got {other:?}"),
        }
    }

    fn prompt_text(response: InvocationResponse) -> (String, String) {
        match response {
            InvocationResponse::Success(Payload::Prompt(result)) => {
                let PromptContent::Text { ref text } = result.messages[0].content;
                (result.description.clone(), text.clone())
            }
            other => panic!("expected prompt success, got {other:?}"),
        }
    }

    #[test]
    fn registers_every_capability_once() {
        let router = sample_router();
        let registry = router.registry();
        assert_eq!(registry.descriptors(CapabilityKind::Resource).count(), 2);
        assert_eq!(registry.descriptors(CapabilityKind::Tool).count(), 3);
        assert_eq!(registry.descriptors(CapabilityKind::Prompt).count(), 2);

        let store: Arc<dyn CatalogStore> = Arc::new(InMemoryStore::sample());
        let mut registry = CapabilityRegistry::new();
        register_all(&mut registry, &store, &CatalogConfig::default()).unwrap();
        let err = register_all(&mut registry, &store, &CatalogConfig::default()).unwrap_err();
        assert!(matches!(err, CapabilityError::DuplicateCapability { .. }));
    }

    #[test]
    fn catalog_resource_lists_products() {
        let response = sample_router().dispatch(CapabilityKind::Resource, CATALOG_URI, None);
        let InvocationResponse::Success(Payload::Resource(contents)) = response else {
            panic!("expected resource");
        };
        assert_eq!(contents.uri, CATALOG_URI);
        assert_eq!(contents.mime_type, "application/json");
        let body: Value = serde_json::from_str(&contents.text).unwrap();
        assert_eq!(body["products"].as_array().unwrap().len(), 3);
        assert_eq!(body["products"][0]["id"], "AAG001");
    }

    #[test]
    fn inventory_resource_has_timestamp() {
        let response = sample_router().dispatch(CapabilityKind::Resource, INVENTORY_URI, None);
        let InvocationResponse::Success(Payload::Resource(contents)) = response else {
            panic!("expected resource");
        };
        let body: Value = serde_json::from_str(&contents.text).unwrap();
        assert_eq!(body["inventory"][1]["product_id"], "AAG002");
        assert_eq!(body["last_updated"], "2024-01-15T10:30:00Z");
    }

    #[test]
    fn resources_reject_arguments() {
        let response = sample_router().dispatch(
            CapabilityKind::Resource,
            CATALOG_URI,
            Some(&json!({"page": 2})),
        );
        assert_eq!(response.error_kind(), Some(ErrorKind::ValidationError));
    }

    #[test]
    fn search_by_text_and_price() {
        let router = sample_router();
        let body = tool_json(router.dispatch(
            CapabilityKind::Tool,
            SearchProductsTool::NAME,
            Some(&json!({"query": "shirt", "max_price": 50})),
        ));
        assert_eq!(body["count"], 1);
        assert_eq!(body["products"][0]["name"], "Performance Athletic Shirt");
    }

    #[test]
    fn search_max_price_zero_filters_everything() {
        let body = tool_json(sample_router().dispatch(
            CapabilityKind::Tool,
            SearchProductsTool::NAME,
            Some(&json!({"query": "", "max_price": 0})),
        ));
        assert_eq!(body["count"], 0);
    }

    #[test]
    fn search_negative_price_is_validation_error() {
        let response = sample_router().dispatch(
            CapabilityKind::Tool,
            SearchProductsTool::NAME,
            Some(&json!({"query": "shirt", "max_price": -1})),
        );
        assert_eq!(response.error_kind(), Some(ErrorKind::ValidationError));
    }

    #[test]
    fn check_inventory_known_and_unknown() {
        let router = sample_router();
        let body = tool_json(router.dispatch(
            CapabilityKind::Tool,
            CheckInventoryTool::NAME,
            Some(&json!({"product_id": "AAG001"})),
        ));
        assert_eq!(body["available"], 120);
        assert_eq!(body["reserved"], 30);

        let response = router.dispatch(
            CapabilityKind::Tool,
            CheckInventoryTool::NAME,
            Some(&json!({"product_id": "AAG404"})),
        );
        assert_eq!(response.error_kind(), Some(ErrorKind::NotFound));
    }

    #[test]
    fn update_product_reports_changed_fields() {
        let body = tool_json(sample_router().dispatch(
            CapabilityKind::Tool,
            UpdateProductTool::NAME,
            Some(&json!({"product_id": "AAG003", "updates": {"price": 34.99}})),
        ));
        assert_eq!(body["status"], "updated");
        assert_eq!(body["updated_fields"], json!(["price"]));
        assert_eq!(body["product"]["price"], 34.99);
        assert_eq!(body["product"]["name"], "Running Shorts");
    }

    #[test]
    fn update_product_unknown_id() {
        let response = sample_router().dispatch(
            CapabilityKind::Tool,
            UpdateProductTool::NAME,
            Some(&json!({"product_id": "AAG404", "updates": {"name": "Ghost"}})),
        );
        assert_eq!(response.error_kind(), Some(ErrorKind::NotFound));
    }

    #[test]
    fn product_analysis_mentions_product_and_timeframe() {
        let router = sample_router();
        let (description, text) = prompt_text(router.dispatch(
            CapabilityKind::Prompt,
            ProductAnalysisPrompt::NAME,
            Some(&json!({"product_id": "AAG002", "timeframe": "6 months"})),
        ));
        assert_eq!(description, "Product analysis for AAG002");
        assert!(text.contains("Yoga Leggings"));
        assert!(text.contains("over the last 6 months"));

        let (_, text) = prompt_text(router.dispatch(
            CapabilityKind::Prompt,
            ProductAnalysisPrompt::NAME,
            Some(&json!({"product_id": "AAG002"})),
        ));
        assert!(text.contains("over the last 30 days"));
    }

    #[test]
    fn product_analysis_unknown_product() {
        let response = sample_router().dispatch(
            CapabilityKind::Prompt,
            ProductAnalysisPrompt::NAME,
            Some(&json!({"product_id": "AAG404"})),
        );
        assert_eq!(response.error_kind(), Some(ErrorKind::NotFound));
    }

    #[test]
    fn inventory_report_flags_low_stock() {
        let router = router_over(Arc::new(InMemoryStore::sample()), 100);
        let (description, text) =
            prompt_text(router.dispatch(CapabilityKind::Prompt, InventoryReportPrompt::NAME, None));
        assert_eq!(description, "Inventory report for all categories");
        assert!(text.contains("AAG001 Performance Athletic Shirt: 120 available / 150 total (30 reserved)"));
        assert!(text.contains("Low stock (fewer than 100 available): AAG002"));
    }

    #[test]
    fn inventory_report_scoped_to_empty_category() {
        let (description, text) = prompt_text(sample_router().dispatch(
            CapabilityKind::Prompt,
            InventoryReportPrompt::NAME,
            Some(&json!({"category": "Outerwear"})),
        ));
        assert_eq!(description, "Inventory report for Outerwear");
        assert!(text.contains("No products found in Outerwear."));
        assert!(text.contains("Low stock (fewer than 25 available): none"));
    }

    #[test]
    fn offline_store_is_data_unavailable() {
        let router = router_over(Arc::new(OfflineStore), 25);
        let cases = [
            (CapabilityKind::Resource, CATALOG_URI, None),
            (CapabilityKind::Resource, INVENTORY_URI, None),
            (
                CapabilityKind::Tool,
                SearchProductsTool::NAME,
                Some(json!({"query": "x"})),
            ),
            (
                CapabilityKind::Tool,
                CheckInventoryTool::NAME,
                Some(json!({"product_id": "AAG001"})),
            ),
            (CapabilityKind::Prompt, InventoryReportPrompt::NAME, None),
        ];

        for (kind, key, args) in cases {
            let response = router.dispatch(kind, key, args.as_ref());
            assert_eq!(
                response.error_kind(),
                Some(ErrorKind::DataUnavailable),
                "{kind} {key}"
            );
        }
    }
}
