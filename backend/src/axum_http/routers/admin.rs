use crate::{
    auth::AuthUser,
    axum_http::routers::artists::artist_usecase,
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
        repositories::artists::ArtistRepository, value_objects::enums::user_roles::UserRole,
    },
    infra::db::postgres::postgres_connection::PgPoolSquad,
    payments::stripe_client::StripeClient,
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

pub fn routes(
    db_pool: Arc<PgPoolSquad>,
    stripe_client: Arc<StripeClient>,
    config: Arc<DotEnvyConfig>,
) -> Router {
    let usecase = artist_usecase(db_pool, stripe_client, &config);

    Router::new()
        .route("/artists/:artist_id/approve", post(approve_artist))
        .with_state(Arc::new(usecase))
}

pub async fn approve_artist<A, S>(
    State(usecase): State<Arc<ArtistUseCase<A, S>>>,
    auth: AuthUser,
    Path(artist_id): Path<Uuid>,
) -> Result<impl IntoResponse, UseCaseError>
where
    A: ArtistRepository + Send + Sync + 'static,
    S: StripeGateway + Send + Sync + 'static,
{
    auth.require_role(&[UserRole::Admin])?;
    info!(admin_id = %auth.user_id, %artist_id, "admin: approve artist request received");

    Ok(Json(usecase.approve(artist_id).await?))
}
