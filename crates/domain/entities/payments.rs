use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::payments;

pub const PAYMENT_PROVIDER_STRIPE: &str = "stripe";
pub const PAYMENT_RECORD_SUCCEEDED: &str = "succeeded";

/// Audit row written together with the `accepted -> paid` transition.
#[derive(Debug, Clone, PartialEq, Eq, Insertable)]
#[diesel(table_name = payments)]
pub struct InsertPaymentEntity {
    pub booking_id: Uuid,
    pub provider: String,
    pub provider_payment_id: String,
    pub provider_event_id: Option<String>,
    pub amount_minor: i64,
    pub currency: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}
