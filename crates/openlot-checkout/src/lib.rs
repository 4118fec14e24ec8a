//! # openlot-checkout: The Reservation Protocol
//!
//! Converts a buyer's cart of listing ids into a durable, all-or-nothing
//! purchase, guaranteeing no listing is ever sold twice - even when many
//! buyers race for the same car.
//!
//! ## The Protocol
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     attempt_purchase(ids, card)                         │
//! │                                                                         │
//! │  1. empty cart?  ──────────────────────────────► Err(CartEmpty)        │
//! │  2. BEGIN transaction                                                   │
//! │  3. lock_for_update(all ids)   ◄── ONE batched lock step               │
//! │  4. every id present + ACTIVE? ── no ──► ROLLBACK, Err(ItemUnavailable)│
//! │  5. total = Σ price read under lock                                    │
//! │  6. authorize(card) within payment_timeout                             │
//! │         declined ── ► ROLLBACK, Err(PaymentDeclined)                   │
//! │         timed out ──► ROLLBACK, Err(Infrastructure)                    │
//! │  7. INSERT purchase + items (frozen prices), mark_sold(all ids)        │
//! │  8. COMMIT ── only now is anything visible                             │
//! │                                                                         │
//! │  The net effect of any set of concurrent calls is equivalent to some   │
//! │  serial order: for each listing, at most one caller ever reaches       │
//! │  step 8 with it.                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`engine`] - [`CheckoutEngine`] and `attempt_purchase`
//! - [`gateway`] - [`PaymentGateway`] contract and the dummy gateway
//! - [`error`] - the checkout failure taxonomy

pub mod engine;
pub mod error;
pub mod gateway;

pub use engine::CheckoutEngine;
pub use error::{CheckoutError, InfrastructureError};
pub use gateway::{DeclineReason, DummyGateway, PaymentGateway, PaymentRef};
