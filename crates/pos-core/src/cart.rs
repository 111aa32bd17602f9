//! # Cart Ledger
//!
//! The in-memory order a cashier is building. Repeated adds of the same catalog
//! id bump the quantity of the existing row; rows keep insertion order for display.
//!
//! A ledger may be bound to a [`CartStore`] slot, in which case its full state is
//! written after every mutation and read back by [`CartLedger::restore`].

use crate::money::Amount;
use crate::order::OrderLine;
use crate::store::BoxedCartStore;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// One catalog entry plus its quantity within a ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Catalog id (aggregation key)
    pub id: String,

    /// Display label
    pub name: String,

    /// Price snapshot taken when the item was first added
    #[serde(rename = "price")]
    pub unit_price: Amount,

    #[serde(rename = "qty")]
    pub quantity: u32,
}

impl LineItem {
    /// A fresh row with quantity 1
    pub fn new(id: impl Into<String>, name: impl Into<String>, unit_price: Amount) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            unit_price,
            quantity: 1,
        }
    }

    pub fn line_total(&self) -> Amount {
        self.unit_price * self.quantity
    }
}

/// Persisted document shape: `{"items":[{"id","name","price","qty"}]}`
#[derive(Debug, Default, Serialize, Deserialize)]
struct CartDocument {
    #[serde(default)]
    items: Vec<LineItem>,
}

/// A ledger shared between request handlers and its submitter
pub type SharedLedger = Arc<Mutex<CartLedger>>;

/// In-memory collection of line items for the current, unsubmitted order
#[derive(Default)]
pub struct CartLedger {
    items: Vec<LineItem>,
    store: Option<BoxedCartStore>,
}

impl fmt::Debug for CartLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartLedger")
            .field("items", &self.items)
            .field("slot", &self.store.as_ref().map(|s| s.slot().to_string()))
            .finish()
    }
}

impl CartLedger {
    /// Empty ledger with no persistence
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a ledger from its slot and keep writing to it.
    ///
    /// An absent, unreadable or corrupt slot yields an empty ledger; this never fails.
    pub fn restore(store: BoxedCartStore) -> Self {
        let items = match store.load() {
            Ok(Some(document)) => match parse_document(&document) {
                Some(items) => {
                    debug!("Restored {} cart rows from slot {}", items.len(), store.slot());
                    items
                }
                None => {
                    warn!("Discarding corrupt cart in slot {}", store.slot());
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Failed to read cart slot {}: {}", store.slot(), e);
                Vec::new()
            }
        };

        Self {
            items,
            store: Some(store),
        }
    }

    /// Wrap into the shared handle used by the API and the submitter
    pub fn into_shared(self) -> SharedLedger {
        Arc::new(Mutex::new(self))
    }

    /// Add one unit of `id`. An existing row gets its quantity bumped; otherwise a
    /// new row is appended. The price is the caller's snapshot and is not re-checked.
    pub fn add(&mut self, id: impl Into<String>, name: impl Into<String>, unit_price: Amount) -> &LineItem {
        let id = id.into();
        let index = match self.items.iter().position(|item| item.id == id) {
            Some(index) => {
                let item = &mut self.items[index];
                item.quantity = item.quantity.saturating_add(1);
                debug!("Cart: {} x{}", item.id, item.quantity);
                index
            }
            None => {
                debug!("Cart: new row {}", id);
                self.items.push(LineItem::new(id, name, unit_price));
                self.items.len() - 1
            }
        };
        self.persist();
        &self.items[index]
    }

    /// Remove the row for `id`. Removing an id that is not in the cart is a no-op.
    /// Returns the removed row, if any.
    pub fn remove(&mut self, id: &str) -> Option<LineItem> {
        let index = self.items.iter().position(|item| item.id == id)?;
        let removed = self.items.remove(index);
        debug!("Cart: removed {}", removed.id);
        self.persist();
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.items.clear();
        debug!("Cart: cleared");
        self.persist();
    }

    /// Take the units of an accepted order off the ledger. Rows added or bumped
    /// after `ordered` was snapshotted keep their extra units.
    pub fn settle(&mut self, ordered: &[OrderLine]) {
        for line in ordered {
            if let Some(item) = self.items.iter_mut().find(|item| item.id == line.id) {
                item.quantity = item.quantity.saturating_sub(line.qty);
            }
        }
        self.items.retain(|item| item.quantity > 0);
        debug!("Cart: settled {} ordered rows, {} left", ordered.len(), self.items.len());
        self.persist();
    }

    /// Sum of line totals; zero for an empty ledger
    pub fn subtotal(&self) -> Amount {
        self.items.iter().map(LineItem::line_total).sum()
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Number of distinct rows
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total units across all rows
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// `{id, qty}` per row, in display order
    pub fn snapshot(&self) -> Vec<OrderLine> {
        self.items
            .iter()
            .map(|item| OrderLine {
                id: item.id.clone(),
                qty: item.quantity,
            })
            .collect()
    }

    /// Display state for the cart panel
    pub fn view(&self) -> CartView {
        CartView {
            lines: self
                .items
                .iter()
                .map(|item| CartLine {
                    id: item.id.clone(),
                    name: item.name.clone(),
                    unit_price: item.unit_price,
                    quantity: item.quantity,
                    line_total: item.line_total(),
                })
                .collect(),
            subtotal: self.subtotal(),
            item_count: self.item_count(),
            is_empty: self.is_empty(),
        }
    }

    fn persist(&self) {
        let Some(store) = &self.store else {
            return;
        };

        let document = CartDocument {
            items: self.items.clone(),
        };
        let result = serde_json::to_string(&document)
            .map_err(crate::error::PosError::from)
            .and_then(|json| store.save(&json));

        if let Err(e) = result {
            warn!("Failed to persist cart to slot {}: {}", store.slot(), e);
        }
    }
}

/// Rows that break the ledger invariants (duplicate ids, zero quantity) mark the
/// document as corrupt.
fn parse_document(document: &str) -> Option<Vec<LineItem>> {
    let parsed: CartDocument = serde_json::from_str(document).ok()?;

    let valid = {
        let mut seen = HashSet::new();
        parsed
            .items
            .iter()
            .all(|item| item.quantity > 0 && seen.insert(item.id.as_str()))
    };

    valid.then_some(parsed.items)
}

/// One rendered cart row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLine {
    pub id: String,
    pub name: String,
    pub unit_price: Amount,
    pub quantity: u32,
    pub line_total: Amount,
}

/// Derived display state, recomputed after every mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartView {
    pub lines: Vec<CartLine>,
    pub subtotal: Amount,
    pub item_count: u32,
    pub is_empty: bool,
}
