//! # Checkout Engine
//!
//! [`CheckoutEngine::attempt_purchase`] runs the reservation protocol: one
//! transaction that locks the cart's listings, validates them, authorizes
//! payment, freezes the sale, and commits - or aborts leaving nothing behind.
//!
//! ## Ordering of hazards
//! Payment authorization happens while the rows are locked but before any
//! durable write. A decline therefore never needs inventory rollback, and a
//! successful charge is always followed by the commit that records it. The
//! only window where a charge could exist without a purchase row is a crash
//! between authorize and commit; the dummy gateway makes that window
//! harmless, and a real integration would close it with capture-on-commit.

use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::error::{CheckoutError, InfrastructureError};
use crate::gateway::PaymentGateway;
use openlot_core::{
    Listing, ListingId, PaymentCard, Purchase, PurchaseItem, PurchaseReceipt, ReceiptLine,
};
use openlot_db::repository::purchase::{generate_purchase_id, generate_purchase_item_id};
use openlot_db::{Database, DbError, ListingRepository, PurchaseRepository};

/// How long we wait for the payment gateway before treating the attempt as
/// an infrastructure failure. The rows stay locked while waiting, so this
/// also bounds how long a checkout can stall competing buyers.
pub const DEFAULT_PAYMENT_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs the checkout/reservation protocol.
///
/// Generic over the gateway so tests can inject slow or rigged processors.
/// Cheap to clone when the gateway is.
#[derive(Debug, Clone)]
pub struct CheckoutEngine<G> {
    db: Database,
    gateway: G,
    payment_timeout: Duration,
}

impl<G: PaymentGateway> CheckoutEngine<G> {
    /// Creates an engine with [`DEFAULT_PAYMENT_TIMEOUT`].
    pub fn new(db: Database, gateway: G) -> Self {
        CheckoutEngine {
            db,
            gateway,
            payment_timeout: DEFAULT_PAYMENT_TIMEOUT,
        }
    }

    /// Overrides the payment timeout.
    pub fn with_payment_timeout(mut self, timeout: Duration) -> Self {
        self.payment_timeout = timeout;
        self
    }

    /// Attempts to purchase the given listings as one atomic unit.
    ///
    /// Duplicate ids are collapsed (first occurrence wins the position), so a
    /// listing can never be charged twice within one attempt. On success the
    /// receipt lines follow the cart order.
    ///
    /// ## Failure contract
    /// Every `Err` means the transaction was aborted: no listing changed
    /// status, no purchase row exists, and (for errors before the authorize
    /// step resolves) no charge was made.
    pub async fn attempt_purchase(
        &self,
        ids: &[ListingId],
        card: &PaymentCard,
    ) -> Result<PurchaseReceipt, CheckoutError> {
        let ids = dedup_preserving_order(ids);
        if ids.is_empty() {
            return Err(CheckoutError::CartEmpty);
        }

        debug!(items = ids.len(), "Starting checkout attempt");

        let mut tx = self.db.begin().await?;

        // Single batched lock step; must stay the first statement of the tx
        let mut snapshots = ListingRepository::lock_for_update(&mut tx, &ids).await?;

        let mut locked: Vec<Listing> = Vec::with_capacity(ids.len());
        for id in &ids {
            match snapshots.remove(id) {
                Some(listing) if listing.is_active() => locked.push(listing),
                Some(listing) => {
                    debug!(id = %listing.id, status = ?listing.status, "Listing not active");
                    tx.rollback().await.map_err(DbError::from)?;
                    return Err(CheckoutError::ItemUnavailable);
                }
                None => {
                    debug!(id = %id, "Listing not found during checkout");
                    tx.rollback().await.map_err(DbError::from)?;
                    return Err(CheckoutError::ItemUnavailable);
                }
            }
        }

        // Total from the locked snapshots, not from whatever the cart showed
        let total_amount_cents: i64 = locked.iter().map(|l| l.price_cents).sum();

        let authorization = tokio::time::timeout(
            self.payment_timeout,
            self.gateway.authorize(card, total_amount_cents),
        )
        .await;

        let payment_ref = match authorization {
            Ok(Ok(reference)) => reference,
            Ok(Err(reason)) => {
                debug!(%reason, "Payment declined, aborting checkout");
                tx.rollback().await.map_err(DbError::from)?;
                return Err(CheckoutError::PaymentDeclined(reason));
            }
            Err(_elapsed) => {
                warn!(timeout = ?self.payment_timeout, "Payment gateway timed out");
                tx.rollback().await.map_err(DbError::from)?;
                return Err(CheckoutError::Infrastructure(
                    InfrastructureError::PaymentTimeout {
                        waited: self.payment_timeout,
                    },
                ));
            }
        };

        let now = Utc::now();
        let purchase = Purchase {
            id: generate_purchase_id(),
            created_at: now,
            total_amount_cents,
            payment_ref,
        };
        let items: Vec<PurchaseItem> = locked
            .iter()
            .map(|listing| PurchaseItem {
                id: generate_purchase_item_id(),
                purchase_id: purchase.id.clone(),
                listing_id: listing.id.clone(),
                title_snapshot: listing.title.clone(),
                price_cents: listing.price_cents,
            })
            .collect();

        PurchaseRepository::insert(&mut tx, &purchase, &items).await?;
        ListingRepository::mark_sold(&mut tx, &ids, now).await?;

        tx.commit().await.map_err(DbError::from)?;

        info!(
            purchase_id = %purchase.id,
            total_amount_cents,
            items = items.len(),
            "Checkout committed"
        );

        Ok(PurchaseReceipt {
            purchase_id: purchase.id,
            total_amount_cents,
            items: items
                .into_iter()
                .map(|item| ReceiptLine {
                    listing_id: item.listing_id,
                    title: item.title_snapshot,
                    price_cents: item.price_cents,
                })
                .collect(),
        })
    }
}

/// Collapses duplicate ids, keeping the first occurrence's position.
fn dedup_preserving_order(ids: &[ListingId]) -> Vec<ListingId> {
    let mut seen = std::collections::HashSet::new();
    ids.iter()
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_preserves_first_occurrence_order() {
        let ids = vec![
            "b".to_string(),
            "a".to_string(),
            "b".to_string(),
            "c".to_string(),
            "a".to_string(),
        ];
        assert_eq!(dedup_preserving_order(&ids), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_dedup_empty() {
        assert!(dedup_preserving_order(&[]).is_empty());
    }
}
