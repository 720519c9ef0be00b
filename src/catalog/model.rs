//! Catalog domain types.
//!
//! Products and inventory records are owned by the data-access layer; the
//! capability handlers only ever see clones of them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CapabilityError, CapabilityResult};

/// Product categories accepted by search filters and updates.
pub const CATEGORIES: [&str; 3] = ["Activewear", "Casual", "Outerwear"];

/// Product fields that `update_product` may change.
pub const MUTABLE_FIELDS: [&str; 6] = ["name", "description", "price", "category", "sizes", "colors"];

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Product {
    /// Unique product identifier (e.g. `AAG001`).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Product category.
    pub category: String,
    /// Unit price.
    pub price: f64,
    /// Marketing description.
    pub description: String,
    /// Available sizes.
    #[serde(default)]
    pub sizes: Vec<String>,
    /// Available colours.
    #[serde(default)]
    pub colors: Vec<String>,
}

impl Product {
    /// Applies a validated partial update. Fields absent from `update` are left untouched.
    pub fn apply(&mut self, update: &ProductUpdate) {
        if let Some(ref name) = update.name {
            self.name.clone_from(name);
        }
        if let Some(ref description) = update.description {
            self.description.clone_from(description);
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(ref category) = update.category {
            self.category.clone_from(category);
        }
        if let Some(ref sizes) = update.sizes {
            self.sizes.clone_from(sizes);
        }
        if let Some(ref colors) = update.colors {
            self.colors.clone_from(colors);
        }
    }
}

/// Stock levels for one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InventoryRecord {
    /// The product this record belongs to.
    pub product_id: String,
    /// Units on hand.
    pub total_stock: u32,
    /// Units that can still be sold.
    pub available: u32,
    /// Units held for open orders.
    pub reserved: u32,
    /// When the record last changed.
    pub last_updated: DateTime<Utc>,
}

impl InventoryRecord {
    /// Returns `true` if available plus reserved stock accounts for the total.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        u64::from(self.available) + u64::from(self.reserved) == u64::from(self.total_stock)
    }
}

/// A point-in-time view of every inventory record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventorySnapshot {
    /// Records in catalog order.
    pub inventory: Vec<InventoryRecord>,
    /// Most recent `last_updated` across the records.
    pub last_updated: Option<DateTime<Utc>>,
}

impl InventorySnapshot {
    /// Builds a snapshot, deriving the overall timestamp from the records.
    #[must_use]
    pub fn new(inventory: Vec<InventoryRecord>) -> Self {
        let last_updated = inventory.iter().map(|r| r.last_updated).max();
        Self {
            inventory,
            last_updated,
        }
    }
}

/// Filters for a catalog search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchQuery {
    /// Case-insensitive substring matched against name and description.
    pub query: String,
    /// Exact category filter.
    pub category: Option<String>,
    /// Inclusive upper price bound.
    pub max_price: Option<f64>,
}

impl SearchQuery {
    /// Creates a query with no filters.
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    /// Restricts results to `category`.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Restricts results to products priced at or below `max_price`.
    #[must_use]
    pub const fn with_max_price(mut self, max_price: f64) -> Self {
        self.max_price = Some(max_price);
        self
    }

    /// Returns `true` if `product` satisfies every filter.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        let needle = self.query.to_lowercase();
        let text_match = product.name.to_lowercase().contains(&needle)
            || product.description.to_lowercase().contains(&needle);
        if !text_match {
            return false;
        }

        if let Some(ref category) = self.category {
            if &product.category != category {
                return false;
            }
        }

        self.max_price.map_or(true, |max| product.price <= max)
    }
}

/// A validated partial product update.
///
/// Built from the open-ended `updates` object of the `update_product` tool.
/// Only [`MUTABLE_FIELDS`] are accepted; anything else is rejected rather than
/// passed through.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductUpdate {
    /// New display name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New price (>= 0).
    pub price: Option<f64>,
    /// New category (one of [`CATEGORIES`]).
    pub category: Option<String>,
    /// Replacement size list.
    pub sizes: Option<Vec<String>>,
    /// Replacement colour list.
    pub colors: Option<Vec<String>>,
}

impl ProductUpdate {
    /// Parses and validates an `updates` mapping.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::ValidationError`] naming the field for unknown
    /// or immutable fields, ill-typed values, negative prices, unknown
    /// categories, or an empty mapping.
    pub fn from_fields(fields: &Map<String, Value>) -> CapabilityResult<Self> {
        if fields.is_empty() {
            return Err(CapabilityError::validation(
                "updates",
                "must contain at least one field",
            ));
        }

        let mut update = Self::default();

        for (field, value) in fields {
            let param = format!("updates.{field}");
            match field.as_str() {
                "name" => update.name = Some(non_empty_string(&param, value)?),
                "description" => update.description = Some(string(&param, value)?),
                "price" => {
                    let price = value
                        .as_f64()
                        .ok_or_else(|| CapabilityError::validation(&param, "expected number"))?;
                    if !price.is_finite() || price < 0.0 {
                        return Err(CapabilityError::validation(&param, "must be >= 0"));
                    }
                    update.price = Some(price);
                }
                "category" => {
                    let category = string(&param, value)?;
                    if !CATEGORIES.contains(&category.as_str()) {
                        return Err(CapabilityError::validation(
                            &param,
                            format!("must be one of: {}", CATEGORIES.join(", ")),
                        ));
                    }
                    update.category = Some(category);
                }
                "sizes" => update.sizes = Some(string_list(&param, value)?),
                "colors" => update.colors = Some(string_list(&param, value)?),
                "id" => {
                    return Err(CapabilityError::validation(&param, "field is not mutable"));
                }
                _ => {
                    return Err(CapabilityError::validation(
                        &param,
                        format!(
                            "unknown field; mutable fields are: {}",
                            MUTABLE_FIELDS.join(", ")
                        ),
                    ));
                }
            }
        }

        Ok(update)
    }

    /// Names of the fields this update changes, in [`MUTABLE_FIELDS`] order.
    #[must_use]
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let present = [
            self.name.is_some(),
            self.description.is_some(),
            self.price.is_some(),
            self.category.is_some(),
            self.sizes.is_some(),
            self.colors.is_some(),
        ];
        MUTABLE_FIELDS
            .iter()
            .zip(present)
            .filter_map(|(name, set)| set.then_some(*name))
            .collect()
    }
}

fn string(param: &str, value: &Value) -> CapabilityResult<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| CapabilityError::validation(param, "expected string"))
}

fn non_empty_string(param: &str, value: &Value) -> CapabilityResult<String> {
    let s = string(param, value)?;
    if s.trim().is_empty() {
        return Err(CapabilityError::validation(param, "must not be empty"));
    }
    Ok(s)
}

fn string_list(param: &str, value: &Value) -> CapabilityResult<Vec<String>> {
    let items = value
        .as_array()
        .ok_or_else(|| CapabilityError::validation(param, "expected array of strings"))?;
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| CapabilityError::validation(param, "expected array of strings"))
        })
        .collect()
}
