use crate::{
    auth::AuthUser,
    usecases::{errors::UseCaseError, referrals::ReferralUseCase},
};
use axum::{
    Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post,
};
use crates::{
    domain::{
        repositories::{artists::ArtistRepository, referrals::ReferralRepository},
        value_objects::{
            enums::user_roles::UserRole,
            referrals::{RegisterReferralModel, ValidateReferralModel},
        },
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{artists::ArtistPostgres, referrals::ReferralPostgres},
    },
};
use std::sync::Arc;
use tracing::info;

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let artist_repository = ArtistPostgres::new(Arc::clone(&db_pool));
    let referral_repository = ReferralPostgres::new(Arc::clone(&db_pool));

    let usecase = ReferralUseCase::new(Arc::new(artist_repository), Arc::new(referral_repository));

    Router::new()
        .route("/", post(register))
        .route("/validate", post(validate))
        .with_state(Arc::new(usecase))
}

pub async fn validate<A, R>(
    State(usecase): State<Arc<ReferralUseCase<A, R>>>,
    Json(model): Json<ValidateReferralModel>,
) -> Result<impl IntoResponse, UseCaseError>
where
    A: ArtistRepository + Send + Sync + 'static,
    R: ReferralRepository + Send + Sync + 'static,
{
    Ok(Json(usecase.validate(model).await?))
}

pub async fn register<A, R>(
    State(usecase): State<Arc<ReferralUseCase<A, R>>>,
    auth: AuthUser,
    Json(model): Json<RegisterReferralModel>,
) -> Result<impl IntoResponse, UseCaseError>
where
    A: ArtistRepository + Send + Sync + 'static,
    R: ReferralRepository + Send + Sync + 'static,
{
    auth.require_role(&[UserRole::Artist])?;
    info!(
        user_id = %auth.user_id,
        referred_artist_id = %model.referred_artist_id,
        "referrals: registration request received"
    );

    let referral = usecase.register(model).await?;
    Ok((StatusCode::CREATED, Json(referral)))
}
