use chrono::{DateTime, Utc};
use crates::domain::{
    entities::{
        artists::ArtistEntity,
        bookings::{BookingEntity, InsertBookingEntity, UpdateBookingStatusEntity},
        disputes::{DISPUTE_STATUS_OPEN, InsertDisputeEntity},
    },
    repositories::{
        artists::ArtistRepository, bookings::BookingRepository, referrals::ReferralRepository,
    },
    value_objects::{
        bookings::{
            BookingDto, CancelBookingModel, InsertBookingModel, OpenDisputeModel,
            ReferralCredit, RefuseBookingModel, TransitionSideEffect,
        },
        commission::BookingFinancials,
        enums::{
            booking_statuses::{BookingEvent, BookingStatus},
            payment_statuses::PaymentStatus,
            user_roles::UserRole,
        },
    },
};
use rand::Rng;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::{
    booking_state_machine::{TransitionResult, run_transition},
    errors::{UseCaseError, UseCaseResult},
    referral_resolver::ReferralResolver,
};
use crate::auth::AuthUser;

const REFERENCE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const REFERENCE_SUFFIX_LEN: usize = 6;

/// Human-readable booking reference, e.g. `BK-20260412-7QK2ZD`.
pub fn generate_reference<G: Rng + ?Sized>(created_at: DateTime<Utc>, rng: &mut G) -> String {
    let suffix: String = (0..REFERENCE_SUFFIX_LEN)
        .map(|_| REFERENCE_CHARSET[rng.gen_range(0..REFERENCE_CHARSET.len())] as char)
        .collect();
    format!("BK-{}-{}", created_at.format("%Y%m%d"), suffix)
}

fn required_text(value: &str, field: &str) -> UseCaseResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(UseCaseError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

/// Side of the booking allowed to trigger an event. Admins act on any booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Party {
    Artist,
    Company,
    Either,
}

pub struct BookingUseCase<B, A, R>
where
    B: BookingRepository + Send + Sync + 'static,
    A: ArtistRepository + Send + Sync + 'static,
    R: ReferralRepository + Send + Sync + 'static,
{
    booking_repo: Arc<B>,
    artist_repo: Arc<A>,
    referral_resolver: ReferralResolver<A, R>,
}

impl<B, A, R> BookingUseCase<B, A, R>
where
    B: BookingRepository + Send + Sync + 'static,
    A: ArtistRepository + Send + Sync + 'static,
    R: ReferralRepository + Send + Sync + 'static,
{
    pub fn new(booking_repo: Arc<B>, artist_repo: Arc<A>, referral_repo: Arc<R>) -> Self {
        let referral_resolver = ReferralResolver::new(Arc::clone(&artist_repo), referral_repo);
        Self {
            booking_repo,
            artist_repo,
            referral_resolver,
        }
    }

    /// Books `model.artist_id` on behalf of the calling company.
    pub async fn create(
        &self,
        actor: &AuthUser,
        model: InsertBookingModel,
    ) -> UseCaseResult<BookingDto> {
        if model.artist_price <= 0 {
            warn!(
                artist_id = %model.artist_id,
                artist_price = model.artist_price,
                "bookings: rejected non-positive artist price"
            );
            return Err(UseCaseError::Validation(
                "artist_price must be greater than zero".to_string(),
            ));
        }
        if model.event_duration_hours <= 0 {
            return Err(UseCaseError::Validation(
                "event_duration_hours must be greater than zero".to_string(),
            ));
        }
        let event_location = required_text(&model.event_location, "event_location")?;
        let event_description = model
            .event_description
            .as_deref()
            .map(str::trim)
            .filter(|description| !description.is_empty())
            .map(str::to_string);

        let artist_id = model.artist_id;
        let company_id = actor.user_id;

        let artist = self.find_artist(artist_id).await?;
        if artist.is_none() {
            warn!(%artist_id, "bookings: artist not found");
            return Err(UseCaseError::NotFound("artist"));
        }

        let now = Utc::now();
        let referral = self
            .referral_resolver
            .resolve_for_booking(model.referral_code.as_deref(), artist_id, now)
            .await?;
        if let Some(rejection) = referral.rejection.filter(|_| model.referral_code.is_some()) {
            info!(%artist_id, ?rejection, "bookings: referral not applied");
        }

        let financials = BookingFinancials::compute(model.artist_price, referral.active)
            .ok_or_else(|| UseCaseError::Validation("artist_price is too large".to_string()))?;

        let reference = generate_reference(now, &mut rand::thread_rng());
        let insert = InsertBookingEntity {
            id: Uuid::new_v4(),
            reference,
            artist_id,
            company_id,
            event_date: model.event_date,
            event_duration_hours: model.event_duration_hours,
            event_location,
            event_description,
            artist_price: financials.artist_price,
            company_fee: financials.company_fee,
            artist_fee: financials.artist_fee,
            total_company_pays: financials.total_company_pays,
            artist_receives: financials.artist_receives,
            platform_gross: financials.platform_gross,
            referral_commission: financials.referral_commission,
            platform_net: financials.platform_net,
            referral_id: referral.referral_id,
            payment_status: PaymentStatus::Pending.to_string(),
            status: BookingStatus::Pending.to_string(),
            created_at: now,
            updated_at: now,
        };

        let booking = self.booking_repo.create(insert).await.map_err(|err| {
            error!(%artist_id, %company_id, db_error = ?err, "bookings: failed to create booking");
            UseCaseError::Internal(err)
        })?;

        info!(
            booking_id = %booking.id,
            reference = %booking.reference,
            %artist_id,
            %company_id,
            total_company_pays = booking.total_company_pays,
            referral_commission = booking.referral_commission,
            "bookings: booking created"
        );

        Ok(booking.into())
    }

    pub async fn get(&self, actor: &AuthUser, booking_id: Uuid) -> UseCaseResult<BookingDto> {
        let booking = self.load(booking_id).await?;
        self.authorize(actor, &booking, Party::Either).await?;
        Ok(booking.into())
    }

    pub async fn accept(&self, actor: &AuthUser, booking_id: Uuid) -> UseCaseResult<BookingDto> {
        self.transition(
            actor,
            booking_id,
            BookingEvent::Accept,
            Party::Artist,
            |_, next, now| {
                let changes = UpdateBookingStatusEntity {
                    accepted_at: Some(now),
                    ..UpdateBookingStatusEntity::to_status(next, now)
                };
                (changes, TransitionSideEffect::None)
            },
        )
        .await
    }

    pub async fn refuse(
        &self,
        actor: &AuthUser,
        booking_id: Uuid,
        model: RefuseBookingModel,
    ) -> UseCaseResult<BookingDto> {
        let reason = required_text(&model.reason, "reason")?;

        self.transition(
            actor,
            booking_id,
            BookingEvent::Refuse,
            Party::Artist,
            move |_, next, now| {
                let changes = UpdateBookingStatusEntity {
                    refused_reason: Some(reason),
                    ..UpdateBookingStatusEntity::to_status(next, now)
                };
                (changes, TransitionSideEffect::None)
            },
        )
        .await
    }

    /// Credits the referrer exactly once, in the same transaction as the
    /// `paid -> completed` swap.
    pub async fn complete(
        &self,
        actor: &AuthUser,
        booking_id: Uuid,
    ) -> UseCaseResult<BookingDto> {
        self.transition(
            actor,
            booking_id,
            BookingEvent::Complete,
            Party::Company,
            |booking, next, now| {
                let changes = UpdateBookingStatusEntity {
                    completed_at: Some(now),
                    ..UpdateBookingStatusEntity::to_status(next, now)
                };
                let side_effect = match ReferralCredit::for_booking(booking) {
                    Some(credit) => TransitionSideEffect::CreditReferral(credit),
                    None => TransitionSideEffect::None,
                };
                (changes, side_effect)
            },
        )
        .await
    }

    pub async fn cancel(
        &self,
        actor: &AuthUser,
        booking_id: Uuid,
        model: CancelBookingModel,
    ) -> UseCaseResult<BookingDto> {
        let reason = model
            .reason
            .as_deref()
            .map(str::trim)
            .filter(|reason| !reason.is_empty())
            .map(str::to_string);

        self.transition(
            actor,
            booking_id,
            BookingEvent::Cancel,
            Party::Either,
            move |_, next, now| {
                let changes = UpdateBookingStatusEntity {
                    cancelled_reason: reason,
                    ..UpdateBookingStatusEntity::to_status(next, now)
                };
                (changes, TransitionSideEffect::None)
            },
        )
        .await
    }

    pub async fn open_dispute(
        &self,
        actor: &AuthUser,
        booking_id: Uuid,
        model: OpenDisputeModel,
    ) -> UseCaseResult<BookingDto> {
        let reason = required_text(&model.reason, "reason")?;
        let opened_by = actor.user_id;

        self.transition(
            actor,
            booking_id,
            BookingEvent::OpenDispute,
            Party::Either,
            move |_, next, now| {
                let dispute = InsertDisputeEntity {
                    booking_id,
                    opened_by,
                    reason,
                    status: DISPUTE_STATUS_OPEN.to_string(),
                    created_at: now,
                };
                (
                    UpdateBookingStatusEntity::to_status(next, now),
                    TransitionSideEffect::OpenDispute(dispute),
                )
            },
        )
        .await
    }

    async fn find_artist(&self, artist_id: Uuid) -> UseCaseResult<Option<ArtistEntity>> {
        self.artist_repo.find_by_id(artist_id).await.map_err(|err| {
            error!(%artist_id, db_error = ?err, "bookings: failed to load artist");
            UseCaseError::Internal(err)
        })
    }

    async fn load(&self, booking_id: Uuid) -> UseCaseResult<BookingEntity> {
        let booking = self
            .booking_repo
            .find_by_id(booking_id)
            .await
            .map_err(|err| {
                error!(%booking_id, db_error = ?err, "bookings: failed to load booking");
                UseCaseError::Internal(err)
            })?;

        booking.ok_or_else(|| {
            warn!(%booking_id, "bookings: booking not found");
            UseCaseError::NotFound("booking")
        })
    }

    async fn is_booked_artist(
        &self,
        actor: &AuthUser,
        booking: &BookingEntity,
    ) -> UseCaseResult<bool> {
        let artist = self.find_artist(booking.artist_id).await?;
        Ok(artist.is_some_and(|artist| artist.profile_id == actor.user_id))
    }

    async fn authorize(
        &self,
        actor: &AuthUser,
        booking: &BookingEntity,
        party: Party,
    ) -> UseCaseResult<()> {
        if actor.has_role(&[UserRole::Admin]) {
            return Ok(());
        }

        let is_company = booking.company_id == actor.user_id;
        let allowed = match party {
            Party::Company => is_company,
            Party::Artist => self.is_booked_artist(actor, booking).await?,
            Party::Either => is_company || self.is_booked_artist(actor, booking).await?,
        };

        if allowed {
            return Ok(());
        }

        warn!(
            booking_id = %booking.id,
            user_id = %actor.user_id,
            ?party,
            "bookings: caller is not a party to this booking"
        );
        Err(UseCaseError::Forbidden(
            "You can only act on your own bookings".to_string(),
        ))
    }

    async fn transition<F>(
        &self,
        actor: &AuthUser,
        booking_id: Uuid,
        event: BookingEvent,
        party: Party,
        build: F,
    ) -> UseCaseResult<BookingDto>
    where
        F: FnOnce(
            &BookingEntity,
            BookingStatus,
            DateTime<Utc>,
        ) -> (UpdateBookingStatusEntity, TransitionSideEffect),
    {
        let booking = self.load(booking_id).await?;
        self.authorize(actor, &booking, party).await?;

        match run_transition(self.booking_repo.as_ref(), &booking, event, build).await? {
            TransitionResult::Applied { from, to, booking } => {
                info!(
                    %booking_id,
                    %from,
                    %to,
                    user_id = %actor.user_id,
                    "bookings: transition applied"
                );
                Ok(booking.into())
            }
            TransitionResult::Rejected(current) => {
                warn!(%booking_id, %current, %event, "bookings: transition not allowed");
                Err(UseCaseError::PreconditionFailed(format!(
                    "cannot {event} a booking that is {current}"
                )))
            }
            TransitionResult::Vanished => {
                warn!(%booking_id, "bookings: booking vanished during transition");
                Err(UseCaseError::NotFound("booking"))
            }
            TransitionResult::Lost { expected, actual } => {
                warn!(
                    %booking_id,
                    %expected,
                    %actual,
                    %event,
                    "bookings: lost concurrent transition"
                );
                Err(UseCaseError::Conflict(format!(
                    "booking changed concurrently and is now {actual}"
                )))
            }
        }
    }
}
