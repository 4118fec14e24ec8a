//! # Purchase Repository
//!
//! Database operations for purchases and their items.
//!
//! ## Write Path
//! Purchases are only ever written from inside the checkout transaction,
//! together with their items and the listings' SOLD transition - hence the
//! insert takes a `&mut SqliteConnection` rather than using the pool.
//! Purchases and purchase items are never mutated afterwards.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use openlot_core::{Purchase, PurchaseItem, PurchaseReceipt, ReceiptLine};

/// Repository for purchase database operations.
#[derive(Debug, Clone)]
pub struct PurchaseRepository {
    pool: SqlitePool,
}

impl PurchaseRepository {
    /// Creates a new PurchaseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PurchaseRepository { pool }
    }

    /// Inserts a purchase and its items inside the caller's transaction.
    ///
    /// The UNIQUE constraint on `purchase_items.listing_id` is the last line
    /// of defense against a double sale: even a bug that bypassed the row
    /// locks could not record the same listing in two purchases.
    pub async fn insert(
        conn: &mut SqliteConnection,
        purchase: &Purchase,
        items: &[PurchaseItem],
    ) -> DbResult<()> {
        debug!(
            id = %purchase.id,
            total = purchase.total_amount_cents,
            items = items.len(),
            "Inserting purchase"
        );

        sqlx::query(
            "INSERT INTO purchases (id, created_at, total_amount_cents, payment_ref) \
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&purchase.id)
        .bind(purchase.created_at)
        .bind(purchase.total_amount_cents)
        .bind(&purchase.payment_ref)
        .execute(&mut *conn)
        .await?;

        for item in items {
            sqlx::query(
                "INSERT INTO purchase_items \
                 (id, purchase_id, listing_id, title_snapshot, price_cents) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .bind(&item.id)
            .bind(&item.purchase_id)
            .bind(&item.listing_id)
            .bind(&item.title_snapshot)
            .bind(item.price_cents)
            .execute(&mut *conn)
            .await?;
        }

        Ok(())
    }

    /// Gets a purchase by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Purchase>> {
        let purchase = sqlx::query_as::<_, Purchase>(
            "SELECT id, created_at, total_amount_cents, payment_ref \
             FROM purchases WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(purchase)
    }

    /// Gets all items of a purchase.
    pub async fn get_items(&self, purchase_id: &str) -> DbResult<Vec<PurchaseItem>> {
        let items = sqlx::query_as::<_, PurchaseItem>(
            "SELECT id, purchase_id, listing_id, title_snapshot, price_cents \
             FROM purchase_items WHERE purchase_id = ?1",
        )
        .bind(purchase_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Reconstructs a receipt from the stored purchase and its frozen lines.
    ///
    /// Built entirely from the snapshots - later listing edits (impossible
    /// once SOLD, but still) can never change what a receipt shows.
    pub async fn get_receipt(&self, purchase_id: &str) -> DbResult<Option<PurchaseReceipt>> {
        let Some(purchase) = self.get_by_id(purchase_id).await? else {
            return Ok(None);
        };

        let items = self.get_items(purchase_id).await?;

        Ok(Some(PurchaseReceipt {
            purchase_id: purchase.id,
            total_amount_cents: purchase.total_amount_cents,
            items: items
                .into_iter()
                .map(|item| ReceiptLine {
                    listing_id: item.listing_id,
                    title: item.title_snapshot,
                    price_cents: item.price_cents,
                })
                .collect(),
        }))
    }
}

/// Generates a new purchase ID.
pub fn generate_purchase_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generates a new purchase item ID.
pub fn generate_purchase_item_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
