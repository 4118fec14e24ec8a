//! # openlot-core: Pure Business Logic for Openlot
//!
//! This crate is the **heart** of the Openlot marketplace. It contains all
//! business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Openlot Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Web API (axum)                               │   │
//! │  │    browse ──► cart ──► checkout ──► receipt                     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ openlot-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │   flags   │  │   │
//! │  │   │  Listing  │  │   Money   │  │   Cart    │  │ FlagPolicy│  │   │
//! │  │   │ Purchase  │  │  parsing  │  │ id set    │  │ defaults  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              openlot-db / openlot-checkout                      │   │
//! │  │      SQLite repositories, row locking, reservation protocol     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Listing, Purchase, PurchaseItem, PaymentCard)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - The buyer's working set of listing ids
//! - [`flags`] - Capability flag contract and default policy
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! Note that the cart carries no authority over inventory: its contents are
//! only a hint, re-validated in full by the checkout engine under row locks.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod flags;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use openlot_core::Money` instead of
// `use openlot_core::money::Money`

pub use cart::Cart;
pub use error::{CoreError, ValidationError};
pub use flags::{Capability, FlagPolicy, FlagProvider, FlagUnavailable};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum listings allowed in a single cart.
///
/// ## Business Reason
/// Cars are not groceries. A cart of more than 50 vehicles is either a bug
/// or abuse, and bounding the set also bounds the checkout lock footprint.
pub const MAX_CART_ITEMS: usize = 50;

/// Default currency code for listings.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Upper bound on a listing price, in cents (500 million dollars).
///
/// ## Business Reason
/// Catches fat-finger prices before they reach the database.
pub const MAX_PRICE_CENTS: i64 = 500_000_000 * 100;
