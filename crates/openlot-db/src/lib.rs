//! # openlot-db: Database Layer for Openlot
//!
//! This crate provides database access for the Openlot marketplace.
//! It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Openlot Data Flow                                │
//! │                                                                         │
//! │  Web handler / checkout engine                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     openlot-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ listing.rs    │    │  (embedded)  │  │   │
//! │  │   │               │    │ purchase.rs   │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ user.rs       │    │ 001_init.sql │  │   │
//! │  │   │ WAL + busy    │    │               │    │              │  │   │
//! │  │   │ timeout       │    │ row locking ★ │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │                     SQLite database file                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (listing, purchase, user)
//!
//! The checkout-critical piece lives in
//! [`repository::listing::ListingRepository::lock_for_update`]: one batched
//! lock step over the whole cart's rows, inside the caller's transaction.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::listing::ListingRepository;
pub use repository::purchase::PurchaseRepository;
pub use repository::user::UserRepository;
