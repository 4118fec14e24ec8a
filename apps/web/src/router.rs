//! Route table for the JSON API.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{accounts, cart, checkout, health, listings, purchases};
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health::health))
        // Accounts
        .route("/register", post(accounts::register))
        .route("/login", post(accounts::login))
        // Listings
        .route("/listings", get(listings::browse).post(listings::create))
        .route(
            "/listings/{id}",
            get(listings::detail)
                .put(listings::update)
                .delete(listings::remove),
        )
        .route("/listings/{id}/mark-sold", post(listings::mark_sold))
        .route("/me/listings", get(listings::my_listings))
        // Cart (flag-gated inside the handlers)
        .route("/cart", get(cart::get_cart).delete(cart::clear_cart))
        .route(
            "/cart/items/{id}",
            post(cart::add_item).delete(cart::remove_item),
        )
        // Checkout
        .route("/checkout", post(checkout::checkout))
        .route("/purchases/{id}", get(purchases::get_purchase));

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use tower::ServiceExt;

    use openlot_core::flags::StaticFlagProvider;
    use openlot_db::{Database, DbConfig};

    use crate::config::AppConfig;

    async fn app_with_flags(cart: bool, checkout: bool) -> Router {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let config = AppConfig {
            http_port: 0,
            database_path: ":memory:".to_string(),
            jwt_secret: "test-secret".to_string(),
            jwt_lifetime_secs: 3600,
            payment_timeout_secs: 10,
            busy_timeout_secs: 1,
        };
        let state = AppState::new(db, &config).with_flags(Arc::new(StaticFlagProvider {
            cart,
            checkout,
            dummy_payments: true,
        }));
        create_router(state)
    }

    async fn status_of(app: Router, method: Method, uri: &str) -> StatusCode {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::empty())
            .unwrap();
        app.oneshot(request).await.unwrap().status()
    }

    // A disabled surface must look nonexistent to everyone, including
    // callers with no token: the gate runs before bearer extraction

    #[tokio::test]
    async fn test_disabled_cart_is_not_found_without_token() {
        let app = app_with_flags(false, true).await;
        assert_eq!(
            status_of(app.clone(), Method::GET, "/api/cart").await,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(app.clone(), Method::POST, "/api/cart/items/some-id").await,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(app, Method::DELETE, "/api/cart").await,
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn test_disabled_checkout_is_not_found_without_token() {
        let app = app_with_flags(true, false).await;
        assert_eq!(
            status_of(app, Method::POST, "/api/checkout").await,
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn test_enabled_cart_still_requires_token() {
        let app = app_with_flags(true, true).await;
        assert_eq!(
            status_of(app, Method::GET, "/api/cart").await,
            StatusCode::UNAUTHORIZED
        );
    }
}
