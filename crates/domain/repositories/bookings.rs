use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::{
    entities::bookings::{BookingEntity, InsertBookingEntity, UpdateBookingStatusEntity},
    value_objects::{
        bookings::{TransitionOutcome, TransitionSideEffect},
        enums::booking_statuses::BookingStatus,
    },
};

#[async_trait]
#[automock]
pub trait BookingRepository {
    async fn create(&self, booking: InsertBookingEntity) -> Result<BookingEntity>;

    async fn find_by_id(&self, booking_id: Uuid) -> Result<Option<BookingEntity>>;

    /// Compare-and-swap on `status`: the update (and its side effect) only
    /// happens while the row is still in `expected`.
    async fn transition_status(
        &self,
        booking_id: Uuid,
        expected: BookingStatus,
        changes: UpdateBookingStatusEntity,
        side_effect: TransitionSideEffect,
    ) -> Result<TransitionOutcome>;

    /// Stores the provider intent id once. Returns `false` when the booking
    /// is no longer `accepted` or already carries an intent.
    async fn attach_payment_intent(&self, booking_id: Uuid, intent_id: String) -> Result<bool>;
}
