use std::collections::HashMap;

use anyhow::Result;
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;
use tracing::error;

type HmacSha256 = Hmac<Sha256>;

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

/// Stripe's own libraries reject signatures older than five minutes.
pub const WEBHOOK_TOLERANCE_SECS: i64 = 300;

/// Minimal Stripe Connect client built on reqwest.
pub struct StripeClient {
    http: reqwest::Client,
    secret_key: String,
    webhook_secret: String,
}

#[derive(Debug, Deserialize)]
pub struct StripeEvent {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub type_: String,
    pub created: Option<i64>,
    pub livemode: Option<bool>,
    pub data: StripeEventData,
}

#[derive(Debug, Deserialize)]
pub struct StripeEventData {
    pub object: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct StripePaymentIntent {
    pub id: String,
    pub client_secret: Option<String>,
    pub status: Option<String>,
}

/// Destination charge: the company pays `amount`, the artist's connected
/// account receives `destination_amount`, the platform keeps the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntentRequest {
    pub amount: i64,
    pub currency: String,
    pub destination_account_id: String,
    pub destination_amount: i64,
    pub metadata: HashMap<String, String>,
    pub idempotency_key: String,
}

#[derive(Debug, Error)]
pub enum WebhookVerificationError {
    #[error("malformed stripe-signature header: {0}")]
    MalformedHeader(&'static str),
    #[error("webhook timestamp outside tolerance")]
    StaleTimestamp,
    #[error("webhook secret rejected by hmac")]
    InvalidSecret,
    #[error("no matching v1 signature")]
    SignatureMismatch,
    #[error("invalid webhook payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct StripeErrorEnvelope {
    error: StripeErrorDetails,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetails {
    #[serde(rename = "type")]
    type_: Option<String>,
    code: Option<String>,
    message: Option<String>,
    param: Option<String>,
}

impl StripeClient {
    pub fn new(secret_key: String, webhook_secret: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            secret_key,
            webhook_secret,
        }
    }

    async fn ensure_success(
        resp: reqwest::Response,
        context: &str,
    ) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let request_id = resp
            .headers()
            .get("request-id")
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let body = match resp.text().await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => "<empty response body>".to_string(),
            Err(err) => format!("<failed to read response body: {err}>"),
        };

        let details = serde_json::from_str::<StripeErrorEnvelope>(&body)
            .ok()
            .map(|envelope| envelope.error);

        error!(
            status = %status,
            stripe_request_id = ?request_id,
            stripe_error_type = ?details.as_ref().and_then(|d| d.type_.as_deref()),
            stripe_error_code = ?details.as_ref().and_then(|d| d.code.as_deref()),
            stripe_error_param = ?details.as_ref().and_then(|d| d.param.as_deref()),
            response_body = %body,
            context = %context,
            "stripe api request failed"
        );

        let message = details
            .and_then(|d| d.message)
            .unwrap_or_else(|| format!("status {status}"));

        anyhow::bail!("Stripe {context} failed: {message}");
    }

    async fn post_form<T>(
        &self,
        path: &str,
        body: &[(String, String)],
        idempotency_key: Option<&str>,
        context: &str,
    ) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let mut request = self
            .http
            .post(format!("{STRIPE_API_BASE}{path}"))
            .header(AUTHORIZATION, format!("Bearer {}", self.secret_key))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded");

        if let Some(key) = idempotency_key {
            request = request.header("Idempotency-Key", key);
        }

        let resp = request.form(body).send().await?;
        let resp = Self::ensure_success(resp, context).await?;
        Ok(resp.json::<T>().await?)
    }

    /// Creates an Express connected account for an artist payout destination.
    pub async fn create_connected_account(&self, email: &str, country: &str) -> Result<String> {
        // https://stripe.com/docs/api/accounts/create
        let body = vec![
            ("type".to_string(), "express".to_string()),
            ("email".to_string(), email.to_string()),
            ("country".to_string(), country.to_string()),
            (
                "capabilities[card_payments][requested]".to_string(),
                "true".to_string(),
            ),
            (
                "capabilities[transfers][requested]".to_string(),
                "true".to_string(),
            ),
        ];

        #[derive(Deserialize)]
        struct AccountResp {
            id: String,
        }

        let parsed: AccountResp = self
            .post_form("/accounts", &body, None, "create connected account")
            .await?;
        Ok(parsed.id)
    }

    /// Creates a hosted onboarding link and returns its URL.
    pub async fn create_onboarding_link(
        &self,
        account_id: &str,
        refresh_url: &str,
        return_url: &str,
    ) -> Result<String> {
        // https://stripe.com/docs/api/account_links/create
        let body = vec![
            ("account".to_string(), account_id.to_string()),
            ("refresh_url".to_string(), refresh_url.to_string()),
            ("return_url".to_string(), return_url.to_string()),
            ("type".to_string(), "account_onboarding".to_string()),
        ];

        #[derive(Deserialize)]
        struct AccountLinkResp {
            url: String,
        }

        let parsed: AccountLinkResp = self
            .post_form("/account_links", &body, None, "create onboarding link")
            .await?;
        Ok(parsed.url)
    }

    pub async fn create_payment_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> Result<StripePaymentIntent> {
        // https://stripe.com/docs/connect/destination-charges
        let mut body: Vec<(String, String)> = vec![
            ("amount".to_string(), request.amount.to_string()),
            ("currency".to_string(), request.currency.clone()),
            (
                "transfer_data[destination]".to_string(),
                request.destination_account_id.clone(),
            ),
            (
                "transfer_data[amount]".to_string(),
                request.destination_amount.to_string(),
            ),
            (
                "automatic_payment_methods[enabled]".to_string(),
                "true".to_string(),
            ),
        ];

        for (key, value) in &request.metadata {
            body.push((format!("metadata[{}]", key), value.clone()));
        }

        self.post_form(
            "/payment_intents",
            &body,
            Some(&request.idempotency_key),
            "create payment intent",
        )
        .await
    }

    pub async fn retrieve_payment_intent(&self, intent_id: &str) -> Result<StripePaymentIntent> {
        // https://stripe.com/docs/api/payment_intents/retrieve
        let resp = self
            .http
            .get(format!("{STRIPE_API_BASE}/payment_intents/{intent_id}"))
            .header(AUTHORIZATION, format!("Bearer {}", self.secret_key))
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "retrieve payment intent").await?;

        Ok(resp.json::<StripePaymentIntent>().await?)
    }

    /// Verifies the webhook signature. https://stripe.com/docs/webhooks/signatures
    pub fn verify_webhook_signature(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> std::result::Result<StripeEvent, WebhookVerificationError> {
        verify_signature_at(
            &self.webhook_secret,
            payload,
            signature_header,
            Utc::now().timestamp(),
        )
    }
}

fn signature_mac(
    secret: &str,
    timestamp: &str,
    payload: &[u8],
) -> std::result::Result<HmacSha256, hmac::digest::InvalidLength> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

/// Builds a `Stripe-Signature` header value for `payload`, as the provider
/// (or the Stripe CLI) would send it.
pub fn sign_payload(secret: &str, timestamp: i64, payload: &[u8]) -> Result<String> {
    let timestamp = timestamp.to_string();
    let digest = signature_mac(secret, &timestamp, payload)
        .map_err(|_| anyhow::anyhow!("webhook secret rejected by hmac"))?
        .finalize()
        .into_bytes();
    Ok(format!("t={},v1={}", timestamp, hex::encode(digest)))
}

pub fn verify_signature_at(
    secret: &str,
    payload: &[u8],
    signature_header: &str,
    now: i64,
) -> std::result::Result<StripeEvent, WebhookVerificationError> {
    let mut timestamp: Option<&str> = None;
    let mut signatures: Vec<&str> = Vec::new();

    for part in signature_header.split(',') {
        let part = part.trim();
        if let Some(rest) = part.strip_prefix("t=") {
            timestamp = Some(rest);
        } else if let Some(rest) = part.strip_prefix("v1=") {
            signatures.push(rest);
        }
    }

    let timestamp =
        timestamp.ok_or(WebhookVerificationError::MalformedHeader("missing timestamp"))?;
    if signatures.is_empty() {
        return Err(WebhookVerificationError::MalformedHeader("missing v1"));
    }

    let issued_at: i64 = timestamp
        .parse()
        .map_err(|_| WebhookVerificationError::MalformedHeader("non-numeric timestamp"))?;
    if now - issued_at > WEBHOOK_TOLERANCE_SECS {
        return Err(WebhookVerificationError::StaleTimestamp);
    }

    let mac = signature_mac(secret, timestamp, payload)
        .map_err(|_| WebhookVerificationError::InvalidSecret)?;
    let matched = signatures
        .iter()
        .filter_map(|candidate| hex::decode(candidate).ok())
        .any(|provided| mac.clone().verify_slice(&provided).is_ok());

    if !matched {
        return Err(WebhookVerificationError::SignatureMismatch);
    }

    Ok(serde_json::from_slice(payload)?)
}
