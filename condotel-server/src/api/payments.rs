//! Payment provider callback endpoints
//!
//! Two transports for the same transaction: the webhook POST is
//! authoritative (signature-verified, journaled), the return-URL GET is the
//! customer's browser coming back from checkout (best-effort, redirects to
//! the frontend result page).

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use shared::error::ApiResponse;

use crate::payment::{self, Outcome};
use crate::payos::{ReturnParams, WebhookBody};
use crate::state::AppState;

/// Handle the provider webhook. Raw body so the payload the signature covers
/// is exactly the payload we parse.
pub async fn webhook(State(state): State<AppState>, body: Bytes) -> Response {
    let parsed: WebhookBody = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, "Unparseable webhook body");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    match payment::reconcile_webhook(&state, &parsed).await {
        Ok(outcome) => {
            tracing::info!(order_code = parsed.data.order_code, ?outcome, "Webhook reconciled");
            axum::Json(ApiResponse::ok()).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Handle the browser redirect back from checkout, then forward the customer
/// to the frontend result page. Reconciliation failures here are logged but
/// never shown as a server error — the webhook remains authoritative.
pub async fn payment_return(
    State(state): State<AppState>,
    Query(params): Query<ReturnParams>,
) -> Redirect {
    let (status, message) = match payment::reconcile_return(&state, &params).await {
        Ok(Outcome::BookingConfirmed)
        | Ok(Outcome::RefundSettled)
        | Ok(Outcome::PackageActivated)
        | Ok(Outcome::PackageRefunded)
        | Ok(Outcome::AlreadySettled) => ("success", "Payment processed".to_string()),
        Ok(Outcome::BookingConflictCancelled) => (
            "conflict",
            "The stay was no longer available; a refund has been opened".to_string(),
        ),
        Ok(Outcome::PaymentFailed) => ("failed", "The payment was not completed".to_string()),
        Err(e) => {
            tracing::warn!(
                order_code = params.order_code,
                code = ?e.code(),
                "Return-url reconciliation failed"
            );
            ("error", e.public_message().to_string())
        }
    };

    Redirect::to(&result_url(
        &state.payment_result_url,
        params.order_code,
        status,
        &message,
    ))
}

/// Build the frontend result-page URL, query-encoded
fn result_url(base: &str, order_code: i64, status: &str, message: &str) -> String {
    let query = serde_urlencoded::to_string([
        ("orderCode", order_code.to_string().as_str()),
        ("status", status),
        ("message", message),
    ])
    .unwrap_or_default();
    format!("{base}?{query}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_url_carries_message() {
        let url = result_url(
            "http://localhost:3000/payment/result",
            2_000_001,
            "conflict",
            "The stay was no longer available; a refund has been opened",
        );
        assert!(url.starts_with("http://localhost:3000/payment/result?"));
        assert!(url.contains("orderCode=2000001"));
        assert!(url.contains("status=conflict"));
        // Spaces and punctuation survive encoding
        assert!(url.contains("message=The+stay+was+no+longer+available%3B"));
    }
}
