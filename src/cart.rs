use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Upper bound on the quantity accepted by a single add or update.
/// Repeated adds may accumulate past this; the per-request bound matches
/// the order form's quantity selector.
pub const MAX_LINE_QUANTITY: u32 = 10;

/// One selected catalog item. Name and unit price are snapshotted at
/// add-time so a mid-session price edit does not change what the
/// customer saw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub food_item_id: i64,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
}

impl CartLine {
    pub fn subtotal(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Ephemeral selection state for one browsing session. Never persisted;
/// destroyed on successful order placement or explicit clear.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    lines: BTreeMap<i64, CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a line or increments an existing one. A zero quantity is
    /// ignored so the map never holds zero-quantity entries.
    pub fn add_line(&mut self, food_item_id: i64, name: String, unit_price: Decimal, quantity: u32) {
        if quantity == 0 {
            return;
        }
        self.lines
            .entry(food_item_id)
            .and_modify(|line| line.quantity += quantity)
            .or_insert(CartLine {
                food_item_id,
                name,
                unit_price,
                quantity,
            });
    }

    /// Overwrites a line's quantity; zero removes the line. Returns false
    /// when the item is not in the cart.
    pub fn set_quantity(&mut self, food_item_id: i64, quantity: u32) -> bool {
        if quantity == 0 {
            return self.lines.remove(&food_item_id).is_some();
        }
        match self.lines.get_mut(&food_item_id) {
            Some(line) => {
                line.quantity = quantity;
                true
            }
            None => false,
        }
    }

    /// Removes a line if present; no-op otherwise.
    pub fn remove(&mut self, food_item_id: i64) -> Option<CartLine> {
        self.lines.remove(&food_item_id)
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of unit price * quantity over all lines.
    pub fn total(&self) -> Decimal {
        self.lines.values().map(CartLine::subtotal).sum()
    }

    /// Sum of quantities over all lines.
    pub fn count(&self) -> u32 {
        self.lines.values().map(|line| line.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn get(&self, food_item_id: i64) -> Option<&CartLine> {
        self.lines.get(&food_item_id)
    }

    pub fn lines(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.values()
    }
}

/// Per-session cart storage keyed by session id. DashMap's per-entry
/// locking serializes mutations for a given session, so two requests from
/// the same session cannot lose updates.
#[derive(Debug, Default)]
pub struct SessionCartStore {
    carts: DashMap<String, Cart>,
}

impl SessionCartStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` against the session's cart with exclusive access,
    /// creating an empty cart on first touch. Empty carts are dropped
    /// from the map on the way out.
    pub fn with_cart<R>(&self, session_id: &str, f: impl FnOnce(&mut Cart) -> R) -> R {
        let mut entry = self.carts.entry(session_id.to_string()).or_default();
        let result = f(entry.value_mut());
        let now_empty = entry.value().is_empty();
        drop(entry);
        if now_empty {
            self.carts.remove_if(session_id, |_, cart| cart.is_empty());
        }
        result
    }

    /// Returns a snapshot of the session's cart (empty if none exists).
    pub fn snapshot(&self, session_id: &str) -> Cart {
        self.carts
            .get(session_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Removes and returns the session's cart, if any.
    pub fn take(&self, session_id: &str) -> Option<Cart> {
        self.carts.remove(session_id).map(|(_, cart)| cart)
    }

    pub fn clear(&self, session_id: &str) {
        self.carts.remove(session_id);
    }
}
