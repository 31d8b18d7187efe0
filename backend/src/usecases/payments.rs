use crates::{
    domain::{
        entities::{
            bookings::{BookingEntity, UpdateBookingStatusEntity},
            payments::{InsertPaymentEntity, PAYMENT_PROVIDER_STRIPE, PAYMENT_RECORD_SUCCEEDED},
        },
        repositories::{artists::ArtistRepository, bookings::BookingRepository},
        value_objects::{
            bookings::TransitionSideEffect,
            enums::{
                booking_statuses::{BookingEvent, BookingStatus},
                payment_statuses::PaymentStatus,
            },
            payments::{PaymentIntentDto, WebhookAckDto},
        },
    },
    payments::{
        stripe_client::{PaymentIntentRequest, StripePaymentIntent, WebhookVerificationError},
        webhook_events::{
            BOOKING_ID_METADATA_KEY, ConnectedAccountObject, PaymentIntentObject, WebhookEvent,
        },
    },
};
use std::{collections::HashMap, sync::Arc};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::{
    booking_state_machine::{TransitionResult, run_transition},
    errors::{UseCaseError, UseCaseResult},
    stripe_gateway::StripeGateway,
};

pub fn idempotency_key_for(booking_id: Uuid) -> String {
    format!("booking-{booking_id}")
}

pub struct PaymentUseCase<B, A, S>
where
    B: BookingRepository + Send + Sync + 'static,
    A: ArtistRepository + Send + Sync + 'static,
    S: StripeGateway + Send + Sync + 'static,
{
    booking_repo: Arc<B>,
    artist_repo: Arc<A>,
    stripe_client: Arc<S>,
    currency: String,
}

impl<B, A, S> PaymentUseCase<B, A, S>
where
    B: BookingRepository + Send + Sync + 'static,
    A: ArtistRepository + Send + Sync + 'static,
    S: StripeGateway + Send + Sync + 'static,
{
    pub fn new(
        booking_repo: Arc<B>,
        artist_repo: Arc<A>,
        stripe_client: Arc<S>,
        currency: String,
    ) -> Self {
        Self {
            booking_repo,
            artist_repo,
            stripe_client,
            currency,
        }
    }

    /// Returns a client secret for the booking's destination charge. A booking
    /// gets at most one intent; later calls hand back the stored one.
    pub async fn create_payment_intent(&self, booking_id: Uuid) -> UseCaseResult<PaymentIntentDto> {
        let booking = self.load_booking(booking_id).await?;

        if booking.booking_status() != Some(BookingStatus::Accepted) {
            warn!(
                %booking_id,
                status = %booking.status,
                "payments: intent requested for non-accepted booking"
            );
            return Err(UseCaseError::PreconditionFailed(
                "booking must be accepted before payment".to_string(),
            ));
        }

        let artist_id = booking.artist_id;
        let artist = self
            .artist_repo
            .find_by_id(artist_id)
            .await
            .map_err(|err| {
                error!(%booking_id, %artist_id, db_error = ?err, "payments: failed to load artist");
                UseCaseError::Internal(err)
            })?
            .ok_or(UseCaseError::NotFound("artist"))?;

        let Some(destination) = artist.payout_account().map(str::to_string) else {
            warn!(%booking_id, %artist_id, "payments: artist payout account not onboarded");
            return Err(UseCaseError::PreconditionFailed(
                "artist has not completed payout onboarding".to_string(),
            ));
        };

        if let Some(intent_id) = booking.stripe_payment_intent.as_deref() {
            info!(%booking_id, %intent_id, "payments: reusing existing payment intent");
            let intent = self.retrieve_intent(booking_id, intent_id).await?;
            return Self::to_dto(booking_id, intent);
        }

        let request = self.intent_request(&booking, destination);
        let intent = self
            .stripe_client
            .create_payment_intent(request)
            .await
            .map_err(|err| {
                error!(%booking_id, error = ?err, "payments: failed to create payment intent");
                UseCaseError::ExternalProvider(err.to_string())
            })?;

        let attached = self
            .booking_repo
            .attach_payment_intent(booking_id, intent.id.clone())
            .await
            .map_err(|err| {
                error!(
                    %booking_id,
                    intent_id = %intent.id,
                    db_error = ?err,
                    "payments: failed to attach payment intent"
                );
                UseCaseError::Internal(err)
            })?;

        if !attached {
            // The idempotency key makes a concurrent request receive the same intent.
            let current = self.load_booking(booking_id).await?;
            if current.stripe_payment_intent.as_deref() != Some(intent.id.as_str()) {
                warn!(
                    %booking_id,
                    intent_id = %intent.id,
                    status = %current.status,
                    stored_intent = ?current.stripe_payment_intent,
                    "payments: booking changed while creating intent"
                );
                return Err(UseCaseError::Conflict(
                    "booking changed while creating the payment intent".to_string(),
                ));
            }
        }

        info!(
            %booking_id,
            intent_id = %intent.id,
            amount = booking.total_company_pays,
            destination_amount = booking.artist_receives,
            "payments: payment intent created"
        );

        Self::to_dto(booking_id, intent)
    }

    /// Verifies and applies one provider event. Business mismatches are
    /// acknowledged; only store failures surface so the provider redelivers.
    pub async fn handle_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> UseCaseResult<WebhookAckDto> {
        let event = self
            .stripe_client
            .verify_webhook_signature(payload, signature)
            .map_err(|err| match err {
                WebhookVerificationError::InvalidPayload(parse_err) => {
                    warn!(error = %parse_err, "payments: signed webhook payload is not an event");
                    UseCaseError::InvalidWebhook(parse_err.to_string())
                }
                other => {
                    warn!(reason = %other, "payments: webhook signature rejected");
                    UseCaseError::SignatureVerification
                }
            })?;

        let event_id = event.id.clone();
        let event = WebhookEvent::from_stripe_event(event).map_err(|err| {
            warn!(event_id = ?event_id, error = %err, "payments: unparseable webhook object");
            UseCaseError::InvalidWebhook(err.to_string())
        })?;

        info!(event_id = ?event_id, kind = %event.kind(), "payments: webhook received");

        match event {
            WebhookEvent::PaymentIntentSucceeded(intent) => {
                self.settle_payment(intent, event_id).await?;
            }
            WebhookEvent::PaymentIntentFailed(intent) => {
                warn!(
                    intent_id = %intent.id,
                    booking_id = ?intent.booking_id(),
                    failure = ?intent.failure_message(),
                    "payments: payment failed, booking stays accepted"
                );
            }
            WebhookEvent::AccountUpdated(account) => {
                self.sync_account(account).await?;
            }
            WebhookEvent::Unrecognized(kind) => {
                debug!(%kind, "payments: ignoring unhandled webhook event");
            }
        }

        Ok(WebhookAckDto { received: true })
    }

    async fn settle_payment(
        &self,
        intent: PaymentIntentObject,
        event_id: Option<String>,
    ) -> UseCaseResult<()> {
        let Some(booking_id) = intent.booking_id() else {
            warn!(intent_id = %intent.id, "payments: succeeded intent without booking metadata");
            return Ok(());
        };

        let Some(booking) = self.find_booking(booking_id).await? else {
            warn!(
                %booking_id,
                intent_id = %intent.id,
                "payments: succeeded intent for unknown booking"
            );
            return Ok(());
        };

        let amount = intent.amount_received.unwrap_or(intent.amount);
        if amount != booking.total_company_pays {
            warn!(
                %booking_id,
                intent_id = %intent.id,
                amount,
                expected = booking.total_company_pays,
                "payments: captured amount differs from booking total"
            );
        }

        let intent_id = intent.id.clone();
        let currency = intent
            .currency
            .clone()
            .unwrap_or_else(|| self.currency.clone());

        let result = run_transition(
            self.booking_repo.as_ref(),
            &booking,
            BookingEvent::ConfirmPayment,
            move |_, next, now| {
                let changes = UpdateBookingStatusEntity {
                    payment_status: Some(PaymentStatus::Captured.to_string()),
                    paid_at: Some(now),
                    ..UpdateBookingStatusEntity::to_status(next, now)
                };
                let payment = InsertPaymentEntity {
                    booking_id,
                    provider: PAYMENT_PROVIDER_STRIPE.to_string(),
                    provider_payment_id: intent_id,
                    provider_event_id: event_id,
                    amount_minor: amount,
                    currency,
                    status: PAYMENT_RECORD_SUCCEEDED.to_string(),
                    created_at: now,
                };
                (changes, TransitionSideEffect::RecordPayment(payment))
            },
        )
        .await?;

        match result {
            TransitionResult::Applied { .. } => {
                info!(%booking_id, intent_id = %intent.id, amount, "payments: booking paid");
            }
            TransitionResult::Rejected(BookingStatus::Paid | BookingStatus::Completed) => {
                info!(
                    %booking_id,
                    intent_id = %intent.id,
                    "payments: replayed payment event, already settled"
                );
            }
            TransitionResult::Rejected(current) => {
                warn!(
                    %booking_id,
                    intent_id = %intent.id,
                    %current,
                    "payments: payment succeeded for booking not awaiting payment"
                );
            }
            TransitionResult::Vanished => {
                warn!(%booking_id, "payments: booking vanished while settling");
            }
            TransitionResult::Lost { actual, .. } => {
                info!(%booking_id, %actual, "payments: concurrent delivery already moved booking");
            }
        }

        Ok(())
    }

    async fn sync_account(&self, account: ConnectedAccountObject) -> UseCaseResult<()> {
        if !account.charges_enabled {
            debug!(account_id = %account.id, "payments: connected account not charge-capable yet");
            return Ok(());
        }

        let updated = self
            .artist_repo
            .set_onboarded_by_stripe_account(account.id.clone(), true)
            .await
            .map_err(|err| {
                error!(
                    account_id = %account.id,
                    db_error = ?err,
                    "payments: failed to mark artist onboarded"
                );
                UseCaseError::Internal(err)
            })?;

        if updated == 0 {
            warn!(account_id = %account.id, "payments: no artist owns connected account");
        } else {
            info!(account_id = %account.id, "payments: artist payout onboarding complete");
        }

        Ok(())
    }

    fn intent_request(&self, booking: &BookingEntity, destination: String) -> PaymentIntentRequest {
        let metadata = HashMap::from([
            (BOOKING_ID_METADATA_KEY.to_string(), booking.id.to_string()),
            ("booking_ref".to_string(), booking.reference.clone()),
            ("artist_id".to_string(), booking.artist_id.to_string()),
            ("company_id".to_string(), booking.company_id.to_string()),
        ]);

        PaymentIntentRequest {
            amount: booking.total_company_pays,
            currency: self.currency.clone(),
            destination_account_id: destination,
            destination_amount: booking.artist_receives,
            metadata,
            idempotency_key: idempotency_key_for(booking.id),
        }
    }

    async fn retrieve_intent(
        &self,
        booking_id: Uuid,
        intent_id: &str,
    ) -> UseCaseResult<StripePaymentIntent> {
        self.stripe_client
            .retrieve_payment_intent(intent_id)
            .await
            .map_err(|err| {
                error!(
                    %booking_id,
                    %intent_id,
                    error = ?err,
                    "payments: failed to retrieve payment intent"
                );
                UseCaseError::ExternalProvider(err.to_string())
            })
    }

    fn to_dto(booking_id: Uuid, intent: StripePaymentIntent) -> UseCaseResult<PaymentIntentDto> {
        let Some(client_secret) = intent.client_secret else {
            error!(
                %booking_id,
                intent_id = %intent.id,
                "payments: intent returned without client secret"
            );
            return Err(UseCaseError::ExternalProvider(
                "payment intent has no client secret".to_string(),
            ));
        };

        Ok(PaymentIntentDto {
            payment_intent_id: intent.id,
            client_secret,
        })
    }

    async fn find_booking(&self, booking_id: Uuid) -> UseCaseResult<Option<BookingEntity>> {
        self.booking_repo.find_by_id(booking_id).await.map_err(|err| {
            error!(%booking_id, db_error = ?err, "payments: failed to load booking");
            UseCaseError::Internal(err)
        })
    }

    async fn load_booking(&self, booking_id: Uuid) -> UseCaseResult<BookingEntity> {
        self.find_booking(booking_id).await?.ok_or_else(|| {
            warn!(%booking_id, "payments: booking not found");
            UseCaseError::NotFound("booking")
        })
    }
}
