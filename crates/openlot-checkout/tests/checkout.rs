//! End-to-end tests of the reservation protocol, including the concurrency
//! guarantee: two buyers racing for the same car, exactly one wins.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use openlot_checkout::{
    CheckoutEngine, CheckoutError, DeclineReason, DummyGateway, InfrastructureError,
    PaymentGateway, PaymentRef,
};
use openlot_core::{Listing, ListingStatus, PaymentCard, User};
use openlot_db::repository::listing::generate_listing_id;
use openlot_db::repository::user::generate_user_id;
use openlot_db::{Database, DbConfig};

const GOOD_CARD: &str = "4242424242424242";
const BAD_CARD: &str = "4000000000000002";

fn card(number: &str) -> PaymentCard {
    PaymentCard {
        number: number.to_string(),
        exp_month: "12".to_string(),
        exp_year: "2030".to_string(),
        cvc: "123".to_string(),
    }
}

async fn seed_seller(db: &Database) -> String {
    let user = User {
        id: generate_user_id(),
        name: "Seller".to_string(),
        email: format!("{}@example.com", Uuid::new_v4()),
        password_hash: "hash".to_string(),
        created_at: Utc::now(),
    };
    db.users().insert(&user).await.unwrap();
    user.id
}

async fn seed_listing(db: &Database, seller_id: &str, title: &str, price_cents: i64) -> Listing {
    let now = Utc::now();
    let listing = Listing {
        id: generate_listing_id(),
        seller_id: seller_id.to_string(),
        title: title.to_string(),
        make: "Toyota".to_string(),
        model: "Corolla".to_string(),
        year: 2015,
        mileage: 65_000,
        price_cents,
        currency: "USD".to_string(),
        location: "Austin, TX".to_string(),
        description: "One owner, clean title, recently serviced.".to_string(),
        status: ListingStatus::Active,
        created_at: now,
        updated_at: now,
    };
    db.listings().insert(&listing).await.unwrap();
    listing
}

async fn test_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

fn engine(db: &Database) -> CheckoutEngine<DummyGateway> {
    CheckoutEngine::new(db.clone(), DummyGateway::default())
}

#[tokio::test]
async fn successful_checkout_sells_both_cars() {
    let db = test_db().await;
    let seller = seed_seller(&db).await;
    let a = seed_listing(&db, &seller, "2015 Toyota Corolla LE", 10_000).await;
    let b = seed_listing(&db, &seller, "2012 Honda Civic EX", 5_000).await;

    let receipt = engine(&db)
        .attempt_purchase(&[a.id.clone(), b.id.clone()], &card(GOOD_CARD))
        .await
        .unwrap();

    assert_eq!(receipt.total_amount_cents, 15_000);
    assert_eq!(receipt.items.len(), 2);
    // Receipt lines follow the cart order
    assert_eq!(receipt.items[0].listing_id, a.id);
    assert_eq!(receipt.items[1].listing_id, b.id);

    for id in [&a.id, &b.id] {
        let listing = db.listings().get_by_id(id).await.unwrap().unwrap();
        assert_eq!(listing.status, ListingStatus::Sold);
    }

    // The purchase row is durable and reconstructable
    let stored = db
        .purchases()
        .get_receipt(&receipt.purchase_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.total_amount_cents, 15_000);
    assert_eq!(stored.items.len(), 2);
}

#[tokio::test]
async fn sold_listing_aborts_whole_cart() {
    let db = test_db().await;
    let seller = seed_seller(&db).await;
    let available = seed_listing(&db, &seller, "2015 Toyota Corolla LE", 10_000).await;
    let gone = seed_listing(&db, &seller, "2012 Honda Civic EX", 5_000).await;
    assert!(db.listings().mark_sold_single(&gone.id, &seller).await.unwrap());

    let err = engine(&db)
        .attempt_purchase(&[available.id.clone(), gone.id.clone()], &card(GOOD_CARD))
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::ItemUnavailable));

    // All-or-nothing: the available car was not reserved either
    let listing = db.listings().get_by_id(&available.id).await.unwrap().unwrap();
    assert_eq!(listing.status, ListingStatus::Active);
    assert_eq!(count_purchases(&db).await, 0);
}

#[tokio::test]
async fn missing_listing_aborts_whole_cart() {
    let db = test_db().await;
    let seller = seed_seller(&db).await;
    let existing = seed_listing(&db, &seller, "2015 Toyota Corolla LE", 10_000).await;

    let err = engine(&db)
        .attempt_purchase(
            &[existing.id.clone(), "no-such-listing".to_string()],
            &card(GOOD_CARD),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::ItemUnavailable));
}

#[tokio::test]
async fn declined_payment_leaves_inventory_untouched() {
    let db = test_db().await;
    let seller = seed_seller(&db).await;
    let listing = seed_listing(&db, &seller, "2015 Toyota Corolla LE", 10_000).await;

    let err = engine(&db)
        .attempt_purchase(&[listing.id.clone()], &card(BAD_CARD))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CheckoutError::PaymentDeclined(DeclineReason::CardDeclined)
    ));

    let loaded = db.listings().get_by_id(&listing.id).await.unwrap().unwrap();
    assert_eq!(loaded.status, ListingStatus::Active);
    assert_eq!(count_purchases(&db).await, 0);
}

#[tokio::test]
async fn empty_cart_is_rejected_before_any_work() {
    let db = test_db().await;
    let err = engine(&db)
        .attempt_purchase(&[], &card(GOOD_CARD))
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::CartEmpty));
}

#[tokio::test]
async fn duplicate_ids_are_charged_once() {
    let db = test_db().await;
    let seller = seed_seller(&db).await;
    let listing = seed_listing(&db, &seller, "2015 Toyota Corolla LE", 10_000).await;

    let receipt = engine(&db)
        .attempt_purchase(
            &[listing.id.clone(), listing.id.clone(), listing.id.clone()],
            &card(GOOD_CARD),
        )
        .await
        .unwrap();

    assert_eq!(receipt.total_amount_cents, 10_000);
    assert_eq!(receipt.items.len(), 1);
}

#[tokio::test]
async fn receipt_freezes_title_and_price_at_sale_time() {
    let db = test_db().await;
    let seller = seed_seller(&db).await;
    let listing = seed_listing(&db, &seller, "2015 Toyota Corolla LE", 10_000).await;

    // Seller reprices before checkout: the buyer pays what the row says at
    // lock time, and the receipt records exactly that
    db.listings()
        .update_owned(
            &listing.id,
            &seller,
            "2015 Toyota Corolla LE (price drop!)",
            9_000,
            &listing.location,
            &listing.description,
        )
        .await
        .unwrap();

    let receipt = engine(&db)
        .attempt_purchase(&[listing.id.clone()], &card(GOOD_CARD))
        .await
        .unwrap();

    assert_eq!(receipt.total_amount_cents, 9_000);
    assert_eq!(receipt.items[0].price_cents, 9_000);
    assert_eq!(receipt.items[0].title, "2015 Toyota Corolla LE (price drop!)");

    let stored = db
        .purchases()
        .get_receipt(&receipt.purchase_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.items[0].price_cents, 9_000);
    assert_eq!(stored.items[0].title, "2015 Toyota Corolla LE (price drop!)");
}

/// Gateway that never answers within any reasonable bound.
struct StalledGateway;

#[async_trait]
impl PaymentGateway for StalledGateway {
    async fn authorize(
        &self,
        _card: &PaymentCard,
        _amount_cents: i64,
    ) -> Result<PaymentRef, DeclineReason> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok("UNREACHABLE".to_string())
    }
}

#[tokio::test]
async fn stalled_gateway_times_out_and_releases_inventory() {
    let db = test_db().await;
    let seller = seed_seller(&db).await;
    let listing = seed_listing(&db, &seller, "2015 Toyota Corolla LE", 10_000).await;

    let engine = CheckoutEngine::new(db.clone(), StalledGateway)
        .with_payment_timeout(Duration::from_millis(50));

    let err = engine
        .attempt_purchase(&[listing.id.clone()], &card(GOOD_CARD))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CheckoutError::Infrastructure(InfrastructureError::PaymentTimeout { .. })
    ));

    let loaded = db.listings().get_by_id(&listing.id).await.unwrap().unwrap();
    assert_eq!(loaded.status, ListingStatus::Active);
    assert_eq!(count_purchases(&db).await, 0);
}

#[tokio::test]
async fn concurrent_buyers_cannot_both_win() {
    // The race needs two real connections, so use a file-backed database
    let dir = tempfile::tempdir().unwrap();
    let config = DbConfig::new(dir.path().join("race.db")).busy_timeout(Duration::from_secs(10));
    let db = Database::new(config).await.unwrap();

    let seller = seed_seller(&db).await;
    let listing = seed_listing(&db, &seller, "2015 Toyota Corolla LE", 10_000).await;

    let engine_a = engine(&db);
    let engine_b = engine(&db);
    let id_a = listing.id.clone();
    let id_b = listing.id.clone();

    let task_a = tokio::spawn(async move {
        engine_a.attempt_purchase(&[id_a], &card(GOOD_CARD)).await
    });
    let task_b = tokio::spawn(async move {
        engine_b.attempt_purchase(&[id_b], &card(GOOD_CARD)).await
    });

    let result_a = task_a.await.unwrap();
    let result_b = task_b.await.unwrap();

    let wins = [&result_a, &result_b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(wins, 1, "exactly one of the racing buyers must win");

    let loser = if result_a.is_ok() { result_b } else { result_a };
    assert!(matches!(
        loser.unwrap_err(),
        CheckoutError::ItemUnavailable
    ));

    let loaded = db.listings().get_by_id(&listing.id).await.unwrap().unwrap();
    assert_eq!(loaded.status, ListingStatus::Sold);
    assert_eq!(count_purchases(&db).await, 1);
}

async fn count_purchases(db: &Database) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM purchases")
        .fetch_one(db.pool())
        .await
        .unwrap()
}
