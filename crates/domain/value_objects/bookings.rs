use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::{
        bookings::BookingEntity, disputes::InsertDisputeEntity, payments::InsertPaymentEntity,
    },
    value_objects::{
        commission::{BookingFinancials, CommissionLabels},
        enums::{booking_statuses::BookingStatus, payment_statuses::PaymentStatus},
    },
};

#[derive(Debug, Clone, Deserialize)]
pub struct InsertBookingModel {
    pub artist_id: Uuid,
    pub event_date: NaiveDate,
    pub event_duration_hours: i32,
    pub event_location: String,
    pub event_description: Option<String>,
    /// Minor currency units.
    pub artist_price: i64,
    pub referral_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefuseBookingModel {
    pub reason: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CancelBookingModel {
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenDisputeModel {
    pub reason: String,
}

/// Referral payout owed when a booking completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferralCredit {
    pub referral_id: Uuid,
    pub amount: i64,
}

impl ReferralCredit {
    pub fn for_booking(booking: &BookingEntity) -> Option<Self> {
        match booking.referral_id {
            Some(referral_id) if booking.referral_commission > 0 => Some(Self {
                referral_id,
                amount: booking.referral_commission,
            }),
            _ => None,
        }
    }
}

/// Extra write performed in the same transaction as a status transition,
/// only when the transition applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionSideEffect {
    None,
    RecordPayment(InsertPaymentEntity),
    CreditReferral(ReferralCredit),
    OpenDispute(InsertDisputeEntity),
}

#[derive(Debug, Clone)]
pub enum TransitionOutcome {
    Applied(BookingEntity),
    NotFound,
    /// The row exists but its status was no longer the expected one.
    StatusMismatch(BookingStatus),
}

#[derive(Debug, Clone, Serialize)]
pub struct BookingDto {
    pub id: Uuid,
    pub reference: String,
    pub artist_id: Uuid,
    pub company_id: Uuid,
    pub event_date: NaiveDate,
    pub event_duration_hours: i32,
    pub event_location: String,
    pub event_description: Option<String>,
    #[serde(flatten)]
    pub financials: BookingFinancials,
    pub referral_id: Option<Uuid>,
    pub stripe_payment_intent: Option<String>,
    pub status: Option<BookingStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub refused_reason: Option<String>,
    pub cancelled_reason: Option<String>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub labels: CommissionLabels,
}

impl From<BookingEntity> for BookingDto {
    fn from(value: BookingEntity) -> Self {
        let financials = value.financials();
        let status = value.booking_status();
        let payment_status = value.payment_status();

        Self {
            id: value.id,
            reference: value.reference,
            artist_id: value.artist_id,
            company_id: value.company_id,
            event_date: value.event_date,
            event_duration_hours: value.event_duration_hours,
            event_location: value.event_location,
            event_description: value.event_description,
            financials,
            referral_id: value.referral_id,
            stripe_payment_intent: value.stripe_payment_intent,
            status,
            payment_status,
            refused_reason: value.refused_reason,
            cancelled_reason: value.cancelled_reason,
            accepted_at: value.accepted_at,
            paid_at: value.paid_at,
            completed_at: value.completed_at,
            created_at: value.created_at,
            labels: financials.breakdown().labels(),
        }
    }
}
