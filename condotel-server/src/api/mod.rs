//! API routes for condotel-server

pub mod bookings;
pub mod health;
pub mod packages;
pub mod payments;
pub mod payouts;
pub mod refunds;

use axum::routing::{get, post};
use axum::{Router, middleware};

use crate::auth::{auth_middleware, require_admin};
use crate::state::AppState;

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    // Customer/host routes (JWT authenticated)
    let authed = Router::new()
        .route("/api/bookings", post(bookings::create))
        .route("/api/bookings/{id}", get(bookings::get).put(bookings::update))
        .route("/api/bookings/{id}/cancel", post(bookings::cancel))
        .route(
            "/api/bookings/{id}/cancel-payment",
            post(bookings::cancel_payment),
        )
        .route("/api/bookings/{id}/checkout", post(bookings::checkout))
        .route(
            "/api/bookings/{id}/refund",
            post(bookings::request_refund).get(bookings::get_refund),
        )
        .route("/api/packages/{id}/checkout", post(packages::checkout))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Admin routes (JWT + admin role)
    let admin = Router::new()
        .route("/api/admin/refunds/{id}/settle", post(refunds::settle))
        .route(
            "/api/admin/refunds/{id}/confirm-manual",
            post(refunds::confirm_manual),
        )
        .route("/api/admin/refunds/{id}/reject", post(refunds::reject))
        .route("/api/admin/payouts/run", post(payouts::run_batch))
        .route("/api/admin/payouts/{id}", post(payouts::run_single))
        .route("/api/admin/payouts/{id}/reject", post(payouts::reject))
        .route(
            "/api/admin/payouts/{id}/account-error",
            post(payouts::account_error),
        )
        .layer(middleware::from_fn(require_admin))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Provider callbacks (signature-verified webhook, best-effort redirect)
    let provider = Router::new()
        .route("/api/payments/webhook", post(payments::webhook))
        .route("/api/payments/return", get(payments::payment_return));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(authed)
        .merge(admin)
        .merge(provider)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}
