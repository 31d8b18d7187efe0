use crate::{
    auth::AuthUser,
    config::config_model::DotEnvyConfig,
    usecases::{errors::UseCaseError, payments::PaymentUseCase, stripe_gateway::StripeGateway},
};
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
    routing::post,
};
use crates::{
    domain::{
        repositories::{artists::ArtistRepository, bookings::BookingRepository},
        value_objects::{enums::user_roles::UserRole, payments::CreatePaymentIntentModel},
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{artists::ArtistPostgres, bookings::BookingPostgres},
    },
    payments::stripe_client::StripeClient,
};
use std::sync::Arc;
use tracing::{info, warn};

pub fn routes(
    db_pool: Arc<PgPoolSquad>,
    stripe_client: Arc<StripeClient>,
    config: Arc<DotEnvyConfig>,
) -> Router {
    let booking_repository = BookingPostgres::new(Arc::clone(&db_pool));
    let artist_repository = ArtistPostgres::new(Arc::clone(&db_pool));

    let usecase = PaymentUseCase::new(
        Arc::new(booking_repository),
        Arc::new(artist_repository),
        stripe_client,
        config.stripe.currency.clone(),
    );

    Router::new()
        .route("/intent", post(create_payment_intent))
        .route("/webhook", post(webhook))
        .with_state(Arc::new(usecase))
}

pub async fn create_payment_intent<B, A, S>(
    State(usecase): State<Arc<PaymentUseCase<B, A, S>>>,
    auth: AuthUser,
    Json(model): Json<CreatePaymentIntentModel>,
) -> Result<impl IntoResponse, UseCaseError>
where
    B: BookingRepository + Send + Sync + 'static,
    A: ArtistRepository + Send + Sync + 'static,
    S: StripeGateway + Send + Sync + 'static,
{
    auth.require_role(&[UserRole::Company])?;
    info!(
        user_id = %auth.user_id,
        booking_id = %model.booking_id,
        "payments: intent request received"
    );

    Ok(Json(usecase.create_payment_intent(model.booking_id).await?))
}

pub async fn webhook<B, A, S>(
    State(usecase): State<Arc<PaymentUseCase<B, A, S>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, UseCaseError>
where
    B: BookingRepository + Send + Sync + 'static,
    A: ArtistRepository + Send + Sync + 'static,
    S: StripeGateway + Send + Sync + 'static,
{
    let Some(signature) = headers
        .get("stripe-signature")
        .and_then(|value| value.to_str().ok())
    else {
        warn!("payments: webhook without stripe-signature header");
        return Err(UseCaseError::SignatureVerification);
    };

    Ok(Json(usecase.handle_webhook(&body, signature).await?))
}
