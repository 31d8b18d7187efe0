use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::{
    domain::value_objects::{
        commission::BookingFinancials,
        enums::{booking_statuses::BookingStatus, payment_statuses::PaymentStatus},
    },
    infra::db::postgres::schema::bookings,
};

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = bookings)]
pub struct BookingEntity {
    pub id: Uuid,
    pub reference: String,
    pub artist_id: Uuid,
    pub company_id: Uuid,
    pub event_date: NaiveDate,
    pub event_duration_hours: i32,
    pub event_location: String,
    pub event_description: Option<String>,
    pub artist_price: i64,
    pub company_fee: i64,
    pub artist_fee: i64,
    pub total_company_pays: i64,
    pub artist_receives: i64,
    pub platform_gross: i64,
    pub referral_commission: i64,
    pub platform_net: i64,
    pub referral_id: Option<Uuid>,
    pub stripe_payment_intent: Option<String>,
    pub payment_status: String,
    pub status: String,
    pub refused_reason: Option<String>,
    pub cancelled_reason: Option<String>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BookingEntity {
    pub fn booking_status(&self) -> Option<BookingStatus> {
        BookingStatus::from_str(&self.status)
    }

    pub fn payment_status(&self) -> Option<PaymentStatus> {
        PaymentStatus::from_str(&self.payment_status)
    }

    pub fn financials(&self) -> BookingFinancials {
        BookingFinancials {
            artist_price: self.artist_price,
            company_fee: self.company_fee,
            artist_fee: self.artist_fee,
            total_company_pays: self.total_company_pays,
            artist_receives: self.artist_receives,
            platform_gross: self.platform_gross,
            referral_commission: self.referral_commission,
            platform_net: self.platform_net,
        }
    }

    /// Latest lifecycle timestamp reached so far.
    pub fn latest_timestamp(&self) -> DateTime<Utc> {
        [self.accepted_at, self.paid_at, self.completed_at]
            .into_iter()
            .flatten()
            .fold(self.created_at, |latest, ts| latest.max(ts))
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = bookings)]
pub struct InsertBookingEntity {
    pub id: Uuid,
    pub reference: String,
    pub artist_id: Uuid,
    pub company_id: Uuid,
    pub event_date: NaiveDate,
    pub event_duration_hours: i32,
    pub event_location: String,
    pub event_description: Option<String>,
    pub artist_price: i64,
    pub company_fee: i64,
    pub artist_fee: i64,
    pub total_company_pays: i64,
    pub artist_receives: i64,
    pub platform_gross: i64,
    pub referral_commission: i64,
    pub platform_net: i64,
    pub referral_id: Option<Uuid>,
    pub payment_status: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Columns written by a status transition. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, AsChangeset)]
#[diesel(table_name = bookings)]
pub struct UpdateBookingStatusEntity {
    pub status: String,
    pub payment_status: Option<String>,
    pub refused_reason: Option<String>,
    pub cancelled_reason: Option<String>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl UpdateBookingStatusEntity {
    pub fn to_status(status: BookingStatus, now: DateTime<Utc>) -> Self {
        Self {
            status: status.to_string(),
            updated_at: now,
            ..Default::default()
        }
    }
}
