use crate::{
    auth::AuthUser,
    usecases::{bookings::BookingUseCase, errors::UseCaseError},
};
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use crates::{
    domain::{
        repositories::{
            artists::ArtistRepository, bookings::BookingRepository, referrals::ReferralRepository,
        },
        value_objects::{
            bookings::{
                CancelBookingModel, InsertBookingModel, OpenDisputeModel, RefuseBookingModel,
            },
            enums::user_roles::UserRole,
        },
    },
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{
            artists::ArtistPostgres, bookings::BookingPostgres, referrals::ReferralPostgres,
        },
    },
};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let booking_repository = BookingPostgres::new(Arc::clone(&db_pool));
    let artist_repository = ArtistPostgres::new(Arc::clone(&db_pool));
    let referral_repository = ReferralPostgres::new(Arc::clone(&db_pool));

    let usecase = BookingUseCase::new(
        Arc::new(booking_repository),
        Arc::new(artist_repository),
        Arc::new(referral_repository),
    );

    Router::new()
        .route("/", post(create))
        .route("/:booking_id", get(get_booking))
        .route("/:booking_id/accept", post(accept))
        .route("/:booking_id/refuse", post(refuse))
        .route("/:booking_id/cancel", post(cancel))
        .route("/:booking_id/complete", post(complete))
        .route("/:booking_id/dispute", post(open_dispute))
        .with_state(Arc::new(usecase))
}

pub async fn create<B, A, R>(
    State(usecase): State<Arc<BookingUseCase<B, A, R>>>,
    auth: AuthUser,
    Json(model): Json<InsertBookingModel>,
) -> Result<impl IntoResponse, UseCaseError>
where
    B: BookingRepository + Send + Sync + 'static,
    A: ArtistRepository + Send + Sync + 'static,
    R: ReferralRepository + Send + Sync + 'static,
{
    auth.require_role(&[UserRole::Company])?;
    info!(
        user_id = %auth.user_id,
        artist_id = %model.artist_id,
        "bookings: create request received"
    );

    let booking = usecase.create(&auth, model).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

pub async fn get_booking<B, A, R>(
    State(usecase): State<Arc<BookingUseCase<B, A, R>>>,
    auth: AuthUser,
    Path(booking_id): Path<Uuid>,
) -> Result<impl IntoResponse, UseCaseError>
where
    B: BookingRepository + Send + Sync + 'static,
    A: ArtistRepository + Send + Sync + 'static,
    R: ReferralRepository + Send + Sync + 'static,
{
    Ok(Json(usecase.get(&auth, booking_id).await?))
}

pub async fn accept<B, A, R>(
    State(usecase): State<Arc<BookingUseCase<B, A, R>>>,
    auth: AuthUser,
    Path(booking_id): Path<Uuid>,
) -> Result<impl IntoResponse, UseCaseError>
where
    B: BookingRepository + Send + Sync + 'static,
    A: ArtistRepository + Send + Sync + 'static,
    R: ReferralRepository + Send + Sync + 'static,
{
    auth.require_role(&[UserRole::Artist, UserRole::Admin])?;
    info!(user_id = %auth.user_id, %booking_id, "bookings: accept request received");

    Ok(Json(usecase.accept(&auth, booking_id).await?))
}

pub async fn refuse<B, A, R>(
    State(usecase): State<Arc<BookingUseCase<B, A, R>>>,
    auth: AuthUser,
    Path(booking_id): Path<Uuid>,
    Json(model): Json<RefuseBookingModel>,
) -> Result<impl IntoResponse, UseCaseError>
where
    B: BookingRepository + Send + Sync + 'static,
    A: ArtistRepository + Send + Sync + 'static,
    R: ReferralRepository + Send + Sync + 'static,
{
    auth.require_role(&[UserRole::Artist, UserRole::Admin])?;
    info!(user_id = %auth.user_id, %booking_id, "bookings: refuse request received");

    Ok(Json(usecase.refuse(&auth, booking_id, model).await?))
}

pub async fn cancel<B, A, R>(
    State(usecase): State<Arc<BookingUseCase<B, A, R>>>,
    auth: AuthUser,
    Path(booking_id): Path<Uuid>,
    body: Bytes,
) -> Result<impl IntoResponse, UseCaseError>
where
    B: BookingRepository + Send + Sync + 'static,
    A: ArtistRepository + Send + Sync + 'static,
    R: ReferralRepository + Send + Sync + 'static,
{
    auth.require_role(&[UserRole::Artist, UserRole::Company, UserRole::Admin])?;
    info!(user_id = %auth.user_id, %booking_id, "bookings: cancel request received");

    let model = parse_cancel_body(&body)?;
    Ok(Json(usecase.cancel(&auth, booking_id, model).await?))
}

/// The cancel body is optional; a body that is present must be valid JSON.
fn parse_cancel_body(body: &[u8]) -> Result<CancelBookingModel, UseCaseError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(CancelBookingModel::default());
    }

    serde_json::from_slice(body).map_err(|err| {
        warn!(error = %err, "bookings: malformed cancel body");
        UseCaseError::Validation(format!("invalid cancel body: {err}"))
    })
}

pub async fn complete<B, A, R>(
    State(usecase): State<Arc<BookingUseCase<B, A, R>>>,
    auth: AuthUser,
    Path(booking_id): Path<Uuid>,
) -> Result<impl IntoResponse, UseCaseError>
where
    B: BookingRepository + Send + Sync + 'static,
    A: ArtistRepository + Send + Sync + 'static,
    R: ReferralRepository + Send + Sync + 'static,
{
    auth.require_role(&[UserRole::Company, UserRole::Admin])?;
    info!(user_id = %auth.user_id, %booking_id, "bookings: complete request received");

    Ok(Json(usecase.complete(&auth, booking_id).await?))
}

pub async fn open_dispute<B, A, R>(
    State(usecase): State<Arc<BookingUseCase<B, A, R>>>,
    auth: AuthUser,
    Path(booking_id): Path<Uuid>,
    Json(model): Json<OpenDisputeModel>,
) -> Result<impl IntoResponse, UseCaseError>
where
    B: BookingRepository + Send + Sync + 'static,
    A: ArtistRepository + Send + Sync + 'static,
    R: ReferralRepository + Send + Sync + 'static,
{
    auth.require_role(&[UserRole::Company, UserRole::Artist])?;
    info!(user_id = %auth.user_id, %booking_id, "bookings: dispute request received");

    Ok(Json(usecase.open_dispute(&auth, booking_id, model).await?))
}
