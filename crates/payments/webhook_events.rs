use std::collections::HashMap;

use serde::Deserialize;
use uuid::Uuid;

use super::stripe_client::StripeEvent;

pub const BOOKING_ID_METADATA_KEY: &str = "booking_id";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PaymentIntentObject {
    pub id: String,
    pub amount: i64,
    pub amount_received: Option<i64>,
    pub currency: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    pub last_payment_error: Option<PaymentErrorObject>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PaymentErrorObject {
    pub code: Option<String>,
    pub message: Option<String>,
}

impl PaymentIntentObject {
    /// Booking the intent was created for, if the metadata carries one.
    pub fn booking_id(&self) -> Option<Uuid> {
        self.metadata
            .get(BOOKING_ID_METADATA_KEY)
            .and_then(|raw| Uuid::parse_str(raw).ok())
    }

    pub fn failure_message(&self) -> Option<&str> {
        self.last_payment_error
            .as_ref()
            .and_then(|err| err.message.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ConnectedAccountObject {
    pub id: String,
    #[serde(default)]
    pub charges_enabled: bool,
}

/// Provider events the platform reacts to. Everything else is acknowledged
/// and ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEvent {
    PaymentIntentSucceeded(PaymentIntentObject),
    PaymentIntentFailed(PaymentIntentObject),
    AccountUpdated(ConnectedAccountObject),
    Unrecognized(String),
}

impl WebhookEvent {
    pub fn from_stripe_event(event: StripeEvent) -> Result<Self, serde_json::Error> {
        let parsed = match event.type_.as_str() {
            "payment_intent.succeeded" => {
                WebhookEvent::PaymentIntentSucceeded(serde_json::from_value(event.data.object)?)
            }
            "payment_intent.payment_failed" => {
                WebhookEvent::PaymentIntentFailed(serde_json::from_value(event.data.object)?)
            }
            "account.updated" => {
                WebhookEvent::AccountUpdated(serde_json::from_value(event.data.object)?)
            }
            _ => WebhookEvent::Unrecognized(event.type_),
        };

        Ok(parsed)
    }

    pub fn kind(&self) -> &str {
        match self {
            WebhookEvent::PaymentIntentSucceeded(_) => "payment_intent.succeeded",
            WebhookEvent::PaymentIntentFailed(_) => "payment_intent.payment_failed",
            WebhookEvent::AccountUpdated(_) => "account.updated",
            WebhookEvent::Unrecognized(kind) => kind,
        }
    }
}
