use chrono::{DateTime, Utc};
use crates::domain::{
    entities::bookings::{BookingEntity, UpdateBookingStatusEntity},
    repositories::bookings::BookingRepository,
    value_objects::{
        bookings::{TransitionOutcome, TransitionSideEffect},
        enums::booking_statuses::{BookingEvent, BookingStatus},
    },
};
use tracing::error;

use super::errors::{UseCaseError, UseCaseResult};

/// Result of running one event against a stored booking.
#[derive(Debug)]
pub enum TransitionResult {
    Applied {
        from: BookingStatus,
        to: BookingStatus,
        booking: BookingEntity,
    },
    /// The event is not allowed from the booking's current status.
    Rejected(BookingStatus),
    /// Another writer moved the booking away from `expected` first.
    Lost {
        expected: BookingStatus,
        actual: BookingStatus,
    },
    Vanished,
}

/// Lifecycle timestamps never go backwards, even with a skewed clock.
fn clamped_now(booking: &BookingEntity) -> DateTime<Utc> {
    Utc::now().max(booking.latest_timestamp())
}

/// Looks the event up in the transition table and, when allowed, swaps the
/// stored status. `build` receives the target status and the write time.
pub async fn run_transition<B, F>(
    booking_repo: &B,
    booking: &BookingEntity,
    event: BookingEvent,
    build: F,
) -> UseCaseResult<TransitionResult>
where
    B: BookingRepository + Send + Sync,
    F: FnOnce(
        &BookingEntity,
        BookingStatus,
        DateTime<Utc>,
    ) -> (UpdateBookingStatusEntity, TransitionSideEffect),
{
    let booking_id = booking.id;
    let current = booking.booking_status().ok_or_else(|| {
        error!(%booking_id, status = %booking.status, "bookings: unknown stored status");
        UseCaseError::Internal(anyhow::anyhow!(
            "unknown booking status `{}`",
            booking.status
        ))
    })?;

    let Some(next) = current.apply(event) else {
        return Ok(TransitionResult::Rejected(current));
    };

    let now = clamped_now(booking);
    let (changes, side_effect) = build(booking, next, now);

    let outcome = booking_repo
        .transition_status(booking_id, current, changes, side_effect)
        .await
        .map_err(|err| {
            error!(
                %booking_id,
                %current,
                %next,
                db_error = ?err,
                "bookings: failed to apply transition"
            );
            UseCaseError::Internal(err)
        })?;

    Ok(match outcome {
        TransitionOutcome::Applied(updated) => TransitionResult::Applied {
            from: current,
            to: next,
            booking: updated,
        },
        TransitionOutcome::NotFound => TransitionResult::Vanished,
        TransitionOutcome::StatusMismatch(actual) => TransitionResult::Lost {
            expected: current,
            actual,
        },
    })
}
