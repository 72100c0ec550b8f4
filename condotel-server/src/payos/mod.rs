//! Payment provider integration via REST API (no SDK dependency)
//!
//! Hosted checkout: we create a payment link, the customer pays on the
//! provider's page, and the provider reports the outcome twice — an
//! authoritative webhook POST and a best-effort browser redirect to the
//! return URL. Both carry the order code that ties the transaction back to a
//! domain entity (see `payment::order_code`).

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Provider credentials and endpoints
#[derive(Debug, Clone)]
pub struct PayosConfig {
    /// REST API base, e.g. https://api-merchant.payos.vn
    pub api_base: String,
    pub client_id: String,
    pub api_key: String,
    /// Shared secret for request signing and webhook verification
    pub checksum_key: String,
}

// ==================== Webhook wire types ====================

/// Webhook POST body (provider-authoritative transport)
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookBody {
    /// Top-level result code; "00" means success
    pub code: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub success: bool,
    pub data: WebhookData,
    /// HMAC over the canonical status string
    pub signature: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookData {
    #[serde(rename = "orderCode")]
    pub order_code: i64,
    pub amount: i64,
    /// Transaction-level result code; "00" or "PAID" means paid
    pub code: String,
    #[serde(rename = "transactionDateTime", default)]
    pub transaction_date_time: String,
    #[serde(default)]
    pub currency: String,
}

/// Return-URL query parameters (best-effort browser redirect)
#[derive(Debug, Clone, Deserialize)]
pub struct ReturnParams {
    pub code: String,
    /// Payment-link id
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub cancel: bool,
    /// PAID | PENDING | PROCESSING | CANCELLED
    pub status: String,
    #[serde(rename = "orderCode")]
    pub order_code: i64,
}

/// Success decision for a webhook body.
///
/// Both the top-level and the transaction-level result must agree:
/// `(code == "00" OR success) AND data.code in {"00", "PAID"}`.
pub fn is_success(body: &WebhookBody) -> bool {
    (body.code == "00" || body.success) && matches!(body.data.code.as_str(), "00" | "PAID")
}

/// Success decision for a return-URL redirect. Must agree with [`is_success`]
/// so the two transports can never diverge in outcome.
pub fn is_return_success(params: &ReturnParams) -> bool {
    !params.cancel && params.code == "00" && params.status == "PAID"
}

// ==================== Signature ====================

/// Canonical field-ordered string the webhook signature covers
fn canonical_webhook_string(body: &WebhookBody) -> String {
    format!(
        "{}|{}|{}|{}|{}",
        body.code,
        body.data.order_code,
        body.data.amount,
        body.data.transaction_date_time,
        body.data.currency
    )
}

/// Compute the hex HMAC-SHA256 signature for a webhook body
pub fn sign_webhook(body: &WebhookBody, checksum_key: &str) -> Result<String, &'static str> {
    let mut mac = Hmac::<Sha256>::new_from_slice(checksum_key.as_bytes())
        .map_err(|_| "HMAC key error")?;
    mac.update(canonical_webhook_string(body).as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Verify a webhook body's signature (constant-time comparison)
pub fn verify_webhook_signature(body: &WebhookBody, checksum_key: &str) -> Result<(), &'static str> {
    let mut mac = Hmac::<Sha256>::new_from_slice(checksum_key.as_bytes())
        .map_err(|_| "HMAC key error")?;
    mac.update(canonical_webhook_string(body).as_bytes());

    let sig_bytes = hex::decode(&body.signature).map_err(|_| "Invalid signature hex")?;
    mac.verify_slice(&sig_bytes)
        .map_err(|_| "Webhook signature mismatch")
}

/// Signature for an outbound payment-link request (key-sorted query form)
fn sign_payment_request(
    checksum_key: &str,
    amount: i64,
    cancel_url: &str,
    description: &str,
    order_code: i64,
    return_url: &str,
) -> Result<String, &'static str> {
    let canonical = format!(
        "amount={amount}&cancelUrl={cancel_url}&description={description}&orderCode={order_code}&returnUrl={return_url}"
    );
    let mut mac = Hmac::<Sha256>::new_from_slice(checksum_key.as_bytes())
        .map_err(|_| "HMAC key error")?;
    mac.update(canonical.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

// ==================== REST calls ====================

/// Create a hosted checkout payment link; returns the checkout URL
pub async fn create_payment_link(
    config: &PayosConfig,
    order_code: i64,
    amount: i64,
    description: &str,
    return_url: &str,
    cancel_url: &str,
) -> Result<String, BoxError> {
    let signature = sign_payment_request(
        &config.checksum_key,
        amount,
        cancel_url,
        description,
        order_code,
        return_url,
    )?;

    let client = reqwest::Client::new();
    let resp: serde_json::Value = client
        .post(format!("{}/v2/payment-requests", config.api_base))
        .header("x-client-id", &config.client_id)
        .header("x-api-key", &config.api_key)
        .json(&serde_json::json!({
            "orderCode": order_code,
            "amount": amount,
            "description": description,
            "returnUrl": return_url,
            "cancelUrl": cancel_url,
            "signature": signature,
        }))
        .send()
        .await?
        .json()
        .await?;

    resp["data"]["checkoutUrl"]
        .as_str()
        .map(String::from)
        .ok_or_else(|| format!("payment link creation failed: {resp}").into())
}

/// Attempt an automatic refund payout through the provider.
///
/// Callers treat a failure as "leave the request pending for manual
/// resolution", never as a settled or failed refund.
pub async fn create_payout(
    config: &PayosConfig,
    order_code: i64,
    amount: i64,
    bank_name: &str,
    account_number: &str,
    account_holder: &str,
) -> Result<(), BoxError> {
    let client = reqwest::Client::new();
    let resp: serde_json::Value = client
        .post(format!("{}/v1/payouts", config.api_base))
        .header("x-client-id", &config.client_id)
        .header("x-api-key", &config.api_key)
        .json(&serde_json::json!({
            "referenceId": order_code,
            "amount": amount,
            "toBin": bank_name,
            "toAccountNumber": account_number,
            "toAccountName": account_holder,
        }))
        .send()
        .await?
        .json()
        .await?;

    match resp["code"].as_str() {
        Some("00") => Ok(()),
        _ => Err(format!("payout request rejected: {resp}").into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_body(signature: &str) -> WebhookBody {
        WebhookBody {
            code: "00".to_string(),
            desc: "success".to_string(),
            success: true,
            data: WebhookData {
                order_code: 42_123_456,
                amount: 3_000_000,
                code: "00".to_string(),
                transaction_date_time: "2026-08-30 10:00:00".to_string(),
                currency: "VND".to_string(),
            },
            signature: signature.to_string(),
        }
    }

    #[test]
    fn test_signature_roundtrip() {
        let key = "test-checksum-key";
        let mut body = sample_body("");
        body.signature = sign_webhook(&body, key).unwrap();
        assert!(verify_webhook_signature(&body, key).is_ok());
    }

    #[test]
    fn test_signature_rejects_tampered_amount() {
        let key = "test-checksum-key";
        let mut body = sample_body("");
        body.signature = sign_webhook(&body, key).unwrap();
        body.data.amount += 1;
        assert!(verify_webhook_signature(&body, key).is_err());
    }

    #[test]
    fn test_signature_rejects_wrong_key() {
        let mut body = sample_body("");
        body.signature = sign_webhook(&body, "key-a").unwrap();
        assert!(verify_webhook_signature(&body, "key-b").is_err());
    }

    #[test]
    fn test_success_predicate() {
        let body = sample_body("x");
        assert!(is_success(&body));

        let mut failed = sample_body("x");
        failed.code = "01".to_string();
        failed.success = false;
        assert!(!is_success(&failed));

        // Top-level ok but transaction not paid
        let mut pending = sample_body("x");
        pending.data.code = "PENDING".to_string();
        assert!(!is_success(&pending));

        // success flag alone is enough at the top level
        let mut flag_only = sample_body("x");
        flag_only.code = "99".to_string();
        flag_only.success = true;
        flag_only.data.code = "PAID".to_string();
        assert!(is_success(&flag_only));
    }

    #[test]
    fn test_return_predicate_matches_webhook_semantics() {
        let params = ReturnParams {
            code: "00".to_string(),
            id: "link-1".to_string(),
            cancel: false,
            status: "PAID".to_string(),
            order_code: 42_123_456,
        };
        assert!(is_return_success(&params));

        let cancelled = ReturnParams {
            cancel: true,
            status: "CANCELLED".to_string(),
            ..params.clone()
        };
        assert!(!is_return_success(&cancelled));

        let processing = ReturnParams {
            status: "PROCESSING".to_string(),
            ..params
        };
        assert!(!is_return_success(&processing));
    }
}
