use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePaymentIntentModel {
    pub booking_id: Uuid,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PaymentIntentDto {
    pub payment_intent_id: String,
    pub client_secret: String,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct WebhookAckDto {
    pub received: bool,
}
