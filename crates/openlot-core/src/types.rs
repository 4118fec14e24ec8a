//! # Domain Types
//!
//! Core domain types used throughout Openlot.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Listing      │   │    Purchase     │   │  PurchaseItem   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  purchase_id    │       │
//! │  │  seller_id      │   │  total_cents    │   │  listing_id     │       │
//! │  │  price_cents    │   │  payment_ref    │   │  price (frozen) │       │
//! │  │  status         │   │  created_at     │   │  title (frozen) │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │ ListingStatus   │   │  PaymentCard    │                             │
//! │  │  ─────────────  │   │  ─────────────  │                             │
//! │  │  Active         │   │  number, expiry │                             │
//! │  │  Sold           │   │  cvc (redacted  │                             │
//! │  │  (one-way!)     │   │   in Debug)     │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Status Transition Invariant
//! `Active → Sold` happens exactly once, and only through the checkout
//! engine's commit path or the seller's mark-sold action. Both run under the
//! same row-locking discipline; nothing ever transitions a listing back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::Money;

/// Identifier for a listing (UUID v4 string).
pub type ListingId = String;

// =============================================================================
// Listing Status
// =============================================================================

/// The sale status of a listing.
///
/// Stored as `'ACTIVE'` / `'SOLD'` text in the database, with a CHECK
/// constraint backing up this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
pub enum ListingStatus {
    /// Visible to buyers and purchasable.
    Active,
    /// Sold exactly once; terminal state.
    Sold,
}

impl Default for ListingStatus {
    fn default() -> Self {
        ListingStatus::Active
    }
}

// =============================================================================
// Listing
// =============================================================================

/// A car listed for sale.
///
/// The descriptive attributes (make, model, year, mileage, location,
/// description) are opaque to the checkout core; only `price_cents` and
/// `status` drive correctness.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Listing {
    /// Unique identifier (UUID v4).
    pub id: ListingId,

    /// Seller who owns this listing.
    pub seller_id: String,

    /// Display title shown to buyers.
    pub title: String,

    /// Manufacturer (e.g. "Toyota").
    pub make: String,

    /// Model (e.g. "Corolla").
    pub model: String,

    /// Model year.
    pub year: i64,

    /// Odometer reading in miles.
    pub mileage: i64,

    /// Price in cents (smallest currency unit). Always positive.
    pub price_cents: i64,

    /// ISO currency code ("USD").
    pub currency: String,

    /// Free-text location.
    pub location: String,

    /// Seller-provided description.
    pub description: String,

    /// Current sale status.
    pub status: ListingStatus,

    /// When the listing was created.
    pub created_at: DateTime<Utc>,

    /// When the listing was last updated (edits, mark-sold, checkout).
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks whether this listing can still be purchased.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == ListingStatus::Active
    }
}

// =============================================================================
// Purchase
// =============================================================================

/// A completed, paid purchase covering one or more listings.
///
/// Immutable once created. Created atomically with its [`PurchaseItem`]s
/// inside the checkout transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Purchase {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// When the purchase was committed.
    pub created_at: DateTime<Utc>,

    /// Sum of the items' prices at sale time, in cents.
    pub total_amount_cents: i64,

    /// Opaque reference token from the payment gateway.
    pub payment_ref: String,
}

// =============================================================================
// Purchase Item
// =============================================================================

/// A line of a purchase, linking it to a listing.
///
/// ## Snapshot Pattern
/// `price_cents` and `title_snapshot` are frozen copies captured under the
/// checkout row lock. They never change, regardless of anything that happens
/// to the listing row afterwards. The database enforces that each listing
/// appears in at most one purchase item, ever.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PurchaseItem {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Purchase this line belongs to.
    pub purchase_id: String,

    /// Listing that was sold.
    pub listing_id: ListingId,

    /// Title at the moment of sale (frozen).
    pub title_snapshot: String,

    /// Price in cents at the moment of sale (frozen).
    pub price_cents: i64,
}

// =============================================================================
// Payment Card
// =============================================================================

/// A payment instrument as entered by the buyer.
///
/// Opaque to the core; passed through to the payment gateway unmodified.
#[derive(Clone, Serialize, Deserialize)]
pub struct PaymentCard {
    /// Card number (digits, spacing tolerated).
    pub number: String,
    /// Expiry month, "01".."12".
    pub exp_month: String,
    /// Expiry year, two or four digits.
    pub exp_year: String,
    /// Security code.
    pub cvc: String,
}

impl fmt::Debug for PaymentCard {
    /// Redacts the card number and security code so instruments never leak
    /// into logs via `{:?}`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let last4: String = self
            .number
            .chars()
            .filter(|c| c.is_ascii_digit())
            .collect::<Vec<_>>()
            .iter()
            .rev()
            .take(4)
            .rev()
            .collect();
        f.debug_struct("PaymentCard")
            .field("number", &format!("****{}", last4))
            .field("exp_month", &self.exp_month)
            .field("exp_year", &self.exp_year)
            .field("cvc", &"***")
            .finish()
    }
}

// =============================================================================
// Purchase Receipt
// =============================================================================

/// One line of a [`PurchaseReceipt`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptLine {
    /// The listing that was sold.
    pub listing_id: ListingId,
    /// Title at sale time.
    pub title: String,
    /// Price charged, in cents (frozen at sale time).
    pub price_cents: i64,
}

/// What a successful checkout returns to the caller.
///
/// Line order follows the cart's insertion order; it is display-only and has
/// no bearing on correctness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseReceipt {
    /// The committed purchase.
    pub purchase_id: String,
    /// Total charged, in cents.
    pub total_amount_cents: i64,
    /// One line per listing sold.
    pub items: Vec<ReceiptLine>,
}

// =============================================================================
// User
// =============================================================================

/// A registered user (both buyers and sellers).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Login email (unique).
    pub email: String,

    /// argon2 password hash. Never serialized to clients.
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_status_default() {
        assert_eq!(ListingStatus::default(), ListingStatus::Active);
    }

    #[test]
    fn test_status_serializes_uppercase() {
        let json = serde_json::to_string(&ListingStatus::Sold).unwrap();
        assert_eq!(json, "\"SOLD\"");
    }

    #[test]
    fn test_payment_card_debug_is_redacted() {
        let card = PaymentCard {
            number: "4242 4242 4242 4242".to_string(),
            exp_month: "12".to_string(),
            exp_year: "2030".to_string(),
            cvc: "123".to_string(),
        };
        let debug = format!("{:?}", card);
        assert!(debug.contains("****4242"));
        assert!(!debug.contains("4242 4242"));
        assert!(!debug.contains("123"));
    }
}
