use crate::{
    auth::AuthUser,
    config::config_model::DotEnvyConfig,
    usecases::{artists::ArtistUseCase, errors::UseCaseError, stripe_gateway::StripeGateway},
};
use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::post,
};
use crates::{
    domain::{
        repositories::artists::ArtistRepository,
        value_objects::{artists::StripeOnboardingModel, enums::user_roles::UserRole},
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad, repositories::artists::ArtistPostgres,
    },
    payments::stripe_client::StripeClient,
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

pub fn artist_usecase(
    db_pool: Arc<PgPoolSquad>,
    stripe_client: Arc<StripeClient>,
    config: &DotEnvyConfig,
) -> ArtistUseCase<ArtistPostgres, StripeClient> {
    ArtistUseCase::new(
        Arc::new(ArtistPostgres::new(db_pool)),
        stripe_client,
        config.app_url.clone(),
        config.stripe.connect_country.clone(),
    )
}

pub fn routes(
    db_pool: Arc<PgPoolSquad>,
    stripe_client: Arc<StripeClient>,
    config: Arc<DotEnvyConfig>,
) -> Router {
    let usecase = artist_usecase(db_pool, stripe_client, &config);

    Router::new()
        .route("/:artist_id/stripe-onboarding", post(start_stripe_onboarding))
        .with_state(Arc::new(usecase))
}

pub async fn start_stripe_onboarding<A, S>(
    State(usecase): State<Arc<ArtistUseCase<A, S>>>,
    auth: AuthUser,
    Path(artist_id): Path<Uuid>,
    model: Option<Json<StripeOnboardingModel>>,
) -> Result<impl IntoResponse, UseCaseError>
where
    A: ArtistRepository + Send + Sync + 'static,
    S: StripeGateway + Send + Sync + 'static,
{
    auth.require_role(&[UserRole::Artist])?;
    info!(user_id = %auth.user_id, %artist_id, "artists: stripe onboarding request received");

    let email = model
        .map(|Json(model)| model.email)
        .or_else(|| auth.email.clone())
        .unwrap_or_default();

    Ok(Json(
        usecase
            .start_stripe_onboarding(artist_id, auth.user_id, &email)
            .await?,
    ))
}
