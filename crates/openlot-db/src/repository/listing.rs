//! # Listing Repository
//!
//! Database operations for listings, including the row-locking primitives
//! the checkout engine depends on.
//!
//! ## The Locking Discipline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              How Two Checkouts Race (and One Loses)                     │
//! │                                                                         │
//! │  Buyer A: BEGIN ─► lock_for_update([X]) ─► sees ACTIVE ─► ... COMMIT   │
//! │                        │ (write statement takes SQLite's single        │
//! │                        │  writer lock for the transaction)             │
//! │  Buyer B: BEGIN ─► lock_for_update([X]) ─ blocks here ─────────────┐   │
//! │                                                                    │   │
//! │                    after A commits, B's lock step proceeds ◄───────┘   │
//! │                    and B's snapshot now reads status = SOLD            │
//! │                    ─► checkout aborts with ItemUnavailable             │
//! │                                                                         │
//! │  One batched lock step for the whole id set. Never per-row loops,      │
//! │  never lock acquisition outside a transaction: SQLite has a single     │
//! │  writer, so batched acquisition is trivially deadlock-free.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The seller's mark-sold path uses the same discipline: one conditional
//! UPDATE guarded by `status = 'ACTIVE'`, executed under the same writer
//! lock, so it can never race the checkout commit into a double transition.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use openlot_core::{Listing, ListingId, ListingStatus};

/// All columns of a listing row, in struct order.
const LISTING_COLUMNS: &str = "id, seller_id, title, make, model, year, mileage, \
     price_cents, currency, location, description, status, created_at, updated_at";

/// Search filters for browsing active listings.
///
/// All filters are optional and combine with AND.
#[derive(Debug, Clone, Default)]
pub struct ListingSearch {
    /// Free-text term matched against title, description, make, model,
    /// location (LIKE, case-insensitive per SQLite default).
    pub query: Option<String>,
    /// Manufacturer filter.
    pub make: Option<String>,
    /// Minimum model year.
    pub min_year: Option<i64>,
    /// Maximum price in cents.
    pub max_price_cents: Option<i64>,
}

/// Repository for listing database operations.
#[derive(Debug, Clone)]
pub struct ListingRepository {
    pool: SqlitePool,
}

impl ListingRepository {
    /// Creates a new ListingRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ListingRepository { pool }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Gets a listing by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Listing>> {
        let listing = sqlx::query_as::<_, Listing>(&format!(
            "SELECT {LISTING_COLUMNS} FROM listings WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(listing)
    }

    /// Gets many listings by ID, preserving the input order.
    ///
    /// Missing ids are silently skipped - used for cart display, where the
    /// cart may reference listings that were deleted since.
    pub async fn get_many(&self, ids: &[ListingId]) -> DbResult<Vec<Listing>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {LISTING_COLUMNS} FROM listings WHERE id IN ("
        ));
        push_id_set(&mut qb, ids);

        let rows: Vec<Listing> = qb.build_query_as().fetch_all(&self.pool).await?;

        // Reorder to match the requested sequence
        let mut by_id: HashMap<String, Listing> =
            rows.into_iter().map(|l| (l.id.clone(), l)).collect();
        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    /// Searches active listings, newest first.
    pub async fn search(&self, filters: &ListingSearch, limit: u32) -> DbResult<Vec<Listing>> {
        debug!(?filters, limit, "Searching listings");

        let mut qb = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {LISTING_COLUMNS} FROM listings WHERE status = 'ACTIVE'"
        ));

        if let Some(term) = filters.query.as_deref().map(str::trim) {
            if !term.is_empty() {
                let like = format!("%{}%", term);
                qb.push(" AND (title LIKE ");
                qb.push_bind(like.clone());
                qb.push(" OR description LIKE ");
                qb.push_bind(like.clone());
                qb.push(" OR make LIKE ");
                qb.push_bind(like.clone());
                qb.push(" OR model LIKE ");
                qb.push_bind(like.clone());
                qb.push(" OR location LIKE ");
                qb.push_bind(like);
                qb.push(")");
            }
        }

        if let Some(make) = filters.make.as_deref().map(str::trim) {
            if !make.is_empty() {
                qb.push(" AND make LIKE ");
                qb.push_bind(format!("%{}%", make));
            }
        }

        if let Some(min_year) = filters.min_year {
            qb.push(" AND year >= ");
            qb.push_bind(min_year);
        }

        if let Some(max_price) = filters.max_price_cents {
            qb.push(" AND price_cents <= ");
            qb.push_bind(max_price);
        }

        qb.push(" ORDER BY created_at DESC LIMIT ");
        qb.push_bind(limit as i64);

        Ok(qb.build_query_as().fetch_all(&self.pool).await?)
    }

    /// Lists all of one seller's listings, newest first (any status).
    pub async fn list_by_seller(&self, seller_id: &str) -> DbResult<Vec<Listing>> {
        let listings = sqlx::query_as::<_, Listing>(&format!(
            "SELECT {LISTING_COLUMNS} FROM listings \
             WHERE seller_id = ?1 ORDER BY created_at DESC"
        ))
        .bind(seller_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(listings)
    }

    // =========================================================================
    // Seller Mutations
    // =========================================================================

    /// Inserts a new listing.
    pub async fn insert(&self, listing: &Listing) -> DbResult<()> {
        debug!(id = %listing.id, seller_id = %listing.seller_id, "Inserting listing");

        sqlx::query(
            "INSERT INTO listings (\
                id, seller_id, title, make, model, year, mileage, \
                price_cents, currency, location, description, status, \
                created_at, updated_at\
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        )
        .bind(&listing.id)
        .bind(&listing.seller_id)
        .bind(&listing.title)
        .bind(&listing.make)
        .bind(&listing.model)
        .bind(listing.year)
        .bind(listing.mileage)
        .bind(listing.price_cents)
        .bind(&listing.currency)
        .bind(&listing.location)
        .bind(&listing.description)
        .bind(listing.status)
        .bind(listing.created_at)
        .bind(listing.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates the editable fields of a listing the seller owns.
    ///
    /// Sold listings are immutable: the guard on `status = 'ACTIVE'` means a
    /// sold or foreign listing comes back as NotFound.
    pub async fn update_owned(
        &self,
        id: &str,
        seller_id: &str,
        title: &str,
        price_cents: i64,
        location: &str,
        description: &str,
    ) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE listings \
             SET title = ?3, price_cents = ?4, location = ?5, description = ?6, updated_at = ?7 \
             WHERE id = ?1 AND seller_id = ?2 AND status = 'ACTIVE'",
        )
        .bind(id)
        .bind(seller_id)
        .bind(title)
        .bind(price_cents)
        .bind(location)
        .bind(description)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Listing (active, owned)", id));
        }

        Ok(())
    }

    /// Seller-initiated ACTIVE → SOLD transition.
    ///
    /// Returns `true` if the transition happened, `false` if the listing was
    /// already sold, missing, or not owned by `seller_id`. One conditional
    /// UPDATE under the writer lock - the same discipline the checkout
    /// commit uses, so the two paths cannot both win.
    pub async fn mark_sold_single(&self, id: &str, seller_id: &str) -> DbResult<bool> {
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE listings SET status = 'SOLD', updated_at = ?3 \
             WHERE id = ?1 AND seller_id = ?2 AND status = 'ACTIVE'",
        )
        .bind(id)
        .bind(seller_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let transitioned = result.rows_affected() > 0;
        if transitioned {
            debug!(id = %id, "Listing marked sold by seller");
        }
        Ok(transitioned)
    }

    /// Deletes a listing the seller owns.
    ///
    /// A listing referenced by a purchase item is protected by ON DELETE
    /// RESTRICT; the attempt surfaces as [`DbError::ForeignKeyViolation`].
    pub async fn delete_owned(&self, id: &str, seller_id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM listings WHERE id = ?1 AND seller_id = ?2")
            .bind(id)
            .bind(seller_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Listing (owned)", id));
        }

        Ok(())
    }

    // =========================================================================
    // Checkout Primitives (transaction-scoped)
    // =========================================================================

    /// Acquires exclusive access to the given rows for the duration of the
    /// enclosing transaction and returns their current snapshots.
    ///
    /// ## Contract
    /// - Must be the FIRST statement of the transaction
    /// - One call for the whole id set, never per-row loops
    /// - Ids that don't exist are simply absent from the returned map;
    ///   the caller must treat "requested but absent" as a failure
    ///
    /// ## How the lock works
    /// The no-op rewrite of the rows is a write statement, which takes
    /// SQLite's single writer lock and pins this transaction's snapshot at
    /// that moment. A concurrent checkout touching any listing blocks here
    /// until this transaction commits or rolls back (bounded by
    /// busy_timeout), then observes the post-commit status.
    pub async fn lock_for_update(
        conn: &mut SqliteConnection,
        ids: &[ListingId],
    ) -> DbResult<HashMap<ListingId, Listing>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut lock = QueryBuilder::<Sqlite>::new(
            "UPDATE listings SET updated_at = updated_at WHERE id IN (",
        );
        push_id_set(&mut lock, ids);
        lock.build().execute(&mut *conn).await?;

        let mut select = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {LISTING_COLUMNS} FROM listings WHERE id IN ("
        ));
        push_id_set(&mut select, ids);

        let rows: Vec<Listing> = select.build_query_as().fetch_all(&mut *conn).await?;

        debug!(requested = ids.len(), found = rows.len(), "Locked listing rows");

        Ok(rows.into_iter().map(|l| (l.id.clone(), l)).collect())
    }

    /// Sets status to SOLD for exactly the given ids.
    ///
    /// Must be invoked only while holding the exclusive access from
    /// [`lock_for_update`] in the same transaction, after validating that
    /// every id is ACTIVE. The `status = 'ACTIVE'` guard is belt-and-braces:
    /// an affected-row mismatch means the validation was violated and the
    /// transaction must not commit.
    pub async fn mark_sold(
        conn: &mut SqliteConnection,
        ids: &[ListingId],
        now: DateTime<Utc>,
    ) -> DbResult<()> {
        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE listings SET status = 'SOLD', updated_at = ");
        qb.push_bind(now);
        qb.push(" WHERE status = 'ACTIVE' AND id IN (");
        push_id_set(&mut qb, ids);

        let result = qb.build().execute(&mut *conn).await?;

        if result.rows_affected() != ids.len() as u64 {
            return Err(DbError::Internal(format!(
                "mark_sold affected {} of {} rows",
                result.rows_affected(),
                ids.len()
            )));
        }

        Ok(())
    }
}

/// Appends `?, ?, ?)` style bindings for an id set and closes the paren.
fn push_id_set(qb: &mut QueryBuilder<'_, Sqlite>, ids: &[ListingId]) {
    let mut separated = qb.separated(", ");
    for id in ids {
        separated.push_bind(id.clone());
    }
    separated.push_unseparated(")");
}

/// Generates a new listing ID.
pub fn generate_listing_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
