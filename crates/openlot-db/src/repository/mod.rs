//! # Repository Module
//!
//! Repository pattern implementations for database access.
//!
//! ## Design
//! Each repository owns a clone of the pool and encapsulates the SQL for one
//! aggregate. Methods that must run inside the checkout transaction take a
//! `&mut SqliteConnection` instead, so the caller controls the transaction
//! boundary.

pub mod listing;
pub mod purchase;
pub mod user;

pub use listing::ListingRepository;
pub use purchase::PurchaseRepository;
pub use user::UserRepository;
