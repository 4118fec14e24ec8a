//! # Cart
//!
//! The buyer's working set of listing references.
//!
//! ## What a Cart Is (and Isn't)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Cart Semantics                                  │
//! │                                                                         │
//! │  A cart IS:                          A cart is NOT:                     │
//! │  ─────────────────────────────       ─────────────────────────────      │
//! │  • An ordered set of listing ids     • A reservation                    │
//! │  • Scoped to one buyer               • An inventory hold                │
//! │  • Insertion order preserved         • A price guarantee                │
//! │  • Duplicate-free                    • Authoritative in any way         │
//! │                                                                         │
//! │  The checkout engine re-validates every cart entry under row locks.     │
//! │  A listing may be in many carts; only one buyer can ever purchase it.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is deliberately no process-global cart: a `Cart` is an explicit
//! value owned by whatever session/request context holds it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::ListingId;
use crate::MAX_CART_ITEMS;

/// An ordered, duplicate-suppressing set of listing ids.
///
/// ## Invariants
/// - Each listing id appears at most once
/// - Insertion order is preserved; re-adding an id keeps its original slot
/// - At most [`MAX_CART_ITEMS`] entries
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Listing ids in insertion order.
    ids: Vec<ListingId>,

    /// When the cart was created/last cleared.
    pub created_at: DateTime<Utc>,
}

impl Default for Cart {
    fn default() -> Self {
        Cart::new()
    }
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart {
            ids: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Adds a listing id to the cart.
    ///
    /// ## Behavior
    /// Idempotent: adding an id that is already present is a no-op and does
    /// not change the insertion order of the existing entry.
    pub fn add(&mut self, id: ListingId) -> Result<(), CoreError> {
        if self.ids.iter().any(|existing| *existing == id) {
            return Ok(());
        }
        if self.ids.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }
        self.ids.push(id);
        Ok(())
    }

    /// Removes a listing id. Returns true if it was present.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.ids.len();
        self.ids.retain(|existing| existing != id);
        before != self.ids.len()
    }

    /// Returns the listing ids in insertion order.
    pub fn ids(&self) -> &[ListingId] {
        &self.ids
    }

    /// Checks whether a listing id is in the cart.
    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|existing| existing == id)
    }

    /// Number of listings in the cart.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Checks whether the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Empties the cart.
    ///
    /// Called after a successful checkout, or on explicit clear.
    pub fn clear(&mut self) {
        self.ids.clear();
        self.created_at = Utc::now();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_preserves_insertion_order() {
        let mut cart = Cart::new();
        cart.add("a".to_string()).unwrap();
        cart.add("b".to_string()).unwrap();
        cart.add("c".to_string()).unwrap();
        assert_eq!(cart.ids(), ["a", "b", "c"]);
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut cart = Cart::new();
        cart.add("a".to_string()).unwrap();
        cart.add("b".to_string()).unwrap();

        // Re-adding "a" must not move it or duplicate it
        cart.add("a".to_string()).unwrap();
        assert_eq!(cart.ids(), ["a", "b"]);
        assert_eq!(cart.len(), 2);
    }

    #[test]
    fn test_remove() {
        let mut cart = Cart::new();
        cart.add("a".to_string()).unwrap();
        cart.add("b".to_string()).unwrap();

        assert!(cart.remove("a"));
        assert!(!cart.remove("a"));
        assert_eq!(cart.ids(), ["b"]);
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add("a".to_string()).unwrap();
        cart.clear();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_max_items_enforced() {
        let mut cart = Cart::new();
        for i in 0..MAX_CART_ITEMS {
            cart.add(format!("listing-{i}")).unwrap();
        }
        let err = cart.add("one-too-many".to_string()).unwrap_err();
        assert!(matches!(err, CoreError::CartTooLarge { .. }));

        // Re-adding an existing entry is still fine at capacity
        cart.add("listing-0".to_string()).unwrap();
        assert_eq!(cart.len(), MAX_CART_ITEMS);
    }
}
