use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use diesel::{Connection, PgConnection, RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::{
        postgres::{
            postgres_connection::PgPoolSquad,
            schema::{bookings, disputes, payments},
        },
        repositories::referrals::increment_total_earned,
    },
};
use domain::{
    entities::bookings::{BookingEntity, InsertBookingEntity, UpdateBookingStatusEntity},
    repositories::bookings::BookingRepository,
    value_objects::{
        bookings::{TransitionOutcome, TransitionSideEffect},
        enums::booking_statuses::BookingStatus,
    },
};

pub struct BookingPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl BookingPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

fn apply_side_effect(conn: &mut PgConnection, side_effect: &TransitionSideEffect) -> Result<()> {
    match side_effect {
        TransitionSideEffect::None => {}
        TransitionSideEffect::RecordPayment(payment) => {
            // Redelivered provider events hit the unique provider_event_id.
            insert_into(payments::table)
                .values(payment)
                .on_conflict_do_nothing()
                .execute(conn)?;
        }
        TransitionSideEffect::CreditReferral(credit) => {
            increment_total_earned(conn, credit.referral_id, credit.amount)?;
        }
        TransitionSideEffect::OpenDispute(dispute) => {
            insert_into(disputes::table).values(dispute).execute(conn)?;
        }
    }
    Ok(())
}

#[async_trait]
impl BookingRepository for BookingPostgres {
    async fn create(&self, booking: InsertBookingEntity) -> Result<BookingEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(bookings::table)
            .values(&booking)
            .returning(BookingEntity::as_returning())
            .get_result::<BookingEntity>(&mut conn)?;

        Ok(result)
    }

    async fn find_by_id(&self, booking_id: Uuid) -> Result<Option<BookingEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = bookings::table
            .find(booking_id)
            .select(BookingEntity::as_select())
            .first::<BookingEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn transition_status(
        &self,
        booking_id: Uuid,
        expected: BookingStatus,
        changes: UpdateBookingStatusEntity,
        side_effect: TransitionSideEffect,
    ) -> Result<TransitionOutcome> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        conn.transaction::<_, anyhow::Error, _>(|conn| {
            let updated = update(bookings::table)
                .filter(bookings::id.eq(booking_id))
                .filter(bookings::status.eq(expected.as_str()))
                .set(&changes)
                .returning(BookingEntity::as_returning())
                .get_result::<BookingEntity>(conn)
                .optional()?;

            let Some(booking) = updated else {
                let current = bookings::table
                    .find(booking_id)
                    .select(bookings::status)
                    .first::<String>(conn)
                    .optional()?;

                return match current {
                    None => Ok(TransitionOutcome::NotFound),
                    Some(raw) => BookingStatus::from_str(&raw)
                        .map(TransitionOutcome::StatusMismatch)
                        .ok_or_else(|| anyhow!("unknown booking status `{raw}`")),
                };
            };

            apply_side_effect(conn, &side_effect)?;

            Ok(TransitionOutcome::Applied(booking))
        })
    }

    async fn attach_payment_intent(&self, booking_id: Uuid, intent_id: String) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let updated = update(bookings::table)
            .filter(bookings::id.eq(booking_id))
            .filter(bookings::status.eq(BookingStatus::Accepted.as_str()))
            .filter(bookings::stripe_payment_intent.is_null())
            .set((
                bookings::stripe_payment_intent.eq(Some(intent_id)),
                bookings::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(updated == 1)
    }
}
