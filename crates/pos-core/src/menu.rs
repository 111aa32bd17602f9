//! # Menu Types
//!
//! Menu catalog as served by the backend's `getMenu` action.

use crate::error::{PosError, PosResult};
use crate::money::Amount;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A dish or drink on the menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    /// Unique item identifier (e.g., "adobo-rice")
    pub id: String,

    /// Display name
    pub name: String,

    pub price: Amount,

    /// Grouping on the menu board (e.g., "meals", "drinks")
    #[serde(default)]
    pub category: String,
}

impl MenuItem {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        price: Amount,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            category: category.into(),
        }
    }

    /// Admin-side checks before an item is sent to the backend
    pub fn validate(&self) -> PosResult<()> {
        if self.id.trim().is_empty() {
            return Err(PosError::InvalidRequest("menu item id is required".to_string()));
        }
        if self.name.trim().is_empty() {
            return Err(PosError::InvalidRequest(format!(
                "menu item {} needs a name",
                self.id
            )));
        }
        if self.price.is_negative() {
            return Err(PosError::InvalidRequest(format!(
                "menu item {} has a negative price",
                self.id
            )));
        }
        Ok(())
    }
}

/// Menu catalog (as loaded from the backend)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MenuCatalog {
    pub items: Vec<MenuItem>,
}

impl MenuCatalog {
    pub fn new(items: Vec<MenuItem>) -> Self {
        Self { items }
    }

    /// Find an item by ID
    pub fn get(&self, id: &str) -> Option<&MenuItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Find an item by ID or fail with `ItemNotFound`
    pub fn require(&self, id: &str) -> PosResult<&MenuItem> {
        self.get(id).ok_or_else(|| PosError::ItemNotFound {
            item_id: id.to_string(),
        })
    }

    /// Distinct categories in sorted order
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = self.items.iter().map(|i| i.category.as_str()).collect();
        categories.sort_unstable();
        categories.dedup();
        categories
    }

    /// Items grouped by category, preserving catalog order within a group
    pub fn by_category(&self) -> BTreeMap<&str, Vec<&MenuItem>> {
        let mut groups: BTreeMap<&str, Vec<&MenuItem>> = BTreeMap::new();
        for item in &self.items {
            groups.entry(item.category.as_str()).or_default().push(item);
        }
        groups
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
