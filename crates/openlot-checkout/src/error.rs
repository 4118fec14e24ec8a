//! # Checkout Error Taxonomy
//!
//! Every way `attempt_purchase` can fail, as a discriminated result. The
//! engine never panics past its boundary and never lets a business-rule
//! failure look like an infrastructure one.
//!
//! ## Recovery Guide
//! ```text
//! CartEmpty          user-recoverable  re-show the cart
//! ItemUnavailable    user-recoverable  refresh the cart; nothing was charged
//! PaymentDeclined    user-recoverable  show the reason; inventory untouched
//! Infrastructure     retry-safe        nothing was committed
//! ```

use std::time::Duration;

use thiserror::Error;

use crate::gateway::DeclineReason;
use openlot_db::DbError;

/// Failure modes of [`crate::CheckoutEngine::attempt_purchase`].
///
/// All variants guarantee the same thing: the transaction was fully aborted
/// and no partial state (charge, SOLD transition, purchase row) is visible.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// No items to purchase.
    #[error("cart is empty")]
    CartEmpty,

    /// One or more listings no longer exist or are no longer ACTIVE.
    ///
    /// The whole cart either proceeds or none of it does - there is no
    /// partial reservation.
    #[error("one or more listings are no longer available")]
    ItemUnavailable,

    /// The payment gateway rejected the instrument.
    ///
    /// The authorize call happens before any durable mutation, so a decline
    /// never needs inventory rollback.
    #[error("payment declined: {0}")]
    PaymentDeclined(DeclineReason),

    /// The transaction could not complete for reasons unrelated to business
    /// rules. Retry is safe: nothing was committed.
    #[error("checkout infrastructure failure: {0}")]
    Infrastructure(#[from] InfrastructureError),
}

/// The non-business reasons a checkout can fail.
#[derive(Debug, Error)]
pub enum InfrastructureError {
    /// Storage error, including lock-wait timeout on contended rows.
    #[error(transparent)]
    Database(#[from] DbError),

    /// The payment gateway did not answer within the configured bound.
    ///
    /// Surfaced as infrastructure (not a decline) and never retried
    /// automatically: the caller decides whether to try again.
    #[error("payment gateway did not respond within {waited:?}")]
    PaymentTimeout { waited: Duration },
}

impl From<DbError> for CheckoutError {
    fn from(err: DbError) -> Self {
        CheckoutError::Infrastructure(InfrastructureError::Database(err))
    }
}
