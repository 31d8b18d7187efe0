use chrono::{Months, Utc};
use crates::domain::{
    entities::referrals::InsertReferralEntity,
    repositories::{
        artists::ArtistRepository, is_unique_violation, referrals::ReferralRepository,
    },
    value_objects::referrals::{
        REFERRAL_VALIDITY_MONTHS, ReferralDto, ReferralRejection, ReferralValidationDto,
        RegisterReferralModel, ValidateReferralModel, normalize_referral_code,
    },
};
use std::sync::Arc;
use tracing::{error, info, warn};

use super::{
    errors::{UseCaseError, UseCaseResult},
    referral_resolver::ReferralResolver,
};

fn already_linked() -> UseCaseError {
    UseCaseError::Conflict("artist is already referred by this referrer".to_string())
}

pub struct ReferralUseCase<A, R>
where
    A: ArtistRepository + Send + Sync + 'static,
    R: ReferralRepository + Send + Sync + 'static,
{
    artist_repo: Arc<A>,
    referral_repo: Arc<R>,
    resolver: ReferralResolver<A, R>,
}

impl<A, R> ReferralUseCase<A, R>
where
    A: ArtistRepository + Send + Sync + 'static,
    R: ReferralRepository + Send + Sync + 'static,
{
    pub fn new(artist_repo: Arc<A>, referral_repo: Arc<R>) -> Self {
        let resolver = ReferralResolver::new(Arc::clone(&artist_repo), Arc::clone(&referral_repo));
        Self {
            artist_repo,
            referral_repo,
            resolver,
        }
    }

    pub async fn validate(
        &self,
        model: ValidateReferralModel,
    ) -> UseCaseResult<ReferralValidationDto> {
        let resolution = self
            .resolver
            .resolve_referrer(model.code.as_deref(), model.artist_id)
            .await?;

        info!(
            artist_id = %model.artist_id,
            valid = resolution.active,
            rejection = ?resolution.rejection,
            "referrals: code validated"
        );

        Ok(resolution.into())
    }

    /// Links the referred artist to the owner of `code` for twelve months.
    pub async fn register(&self, model: RegisterReferralModel) -> UseCaseResult<ReferralDto> {
        let referred_id = model.referred_artist_id;
        let code = normalize_referral_code(Some(&model.code))
            .ok_or_else(|| UseCaseError::Validation(ReferralRejection::NoCode.to_string()))?;

        let referred = self
            .artist_repo
            .find_by_id(referred_id)
            .await
            .map_err(|err| {
                error!(%referred_id, db_error = ?err, "referrals: failed to load referred artist");
                UseCaseError::Internal(err)
            })?;
        if referred.is_none() {
            warn!(%referred_id, "referrals: referred artist not found");
            return Err(UseCaseError::NotFound("artist"));
        }

        let resolution = self
            .resolver
            .resolve_referrer(Some(&code), referred_id)
            .await?;

        let referrer_id = match (resolution.referrer_id, resolution.rejection) {
            (Some(referrer_id), None) => referrer_id,
            (_, rejection) => {
                let rejection = rejection.unwrap_or(ReferralRejection::UnknownCode);
                warn!(%referred_id, ?rejection, "referrals: registration rejected");
                return Err(UseCaseError::Validation(rejection.to_string()));
            }
        };

        let existing = self
            .referral_repo
            .find_link(referrer_id, referred_id)
            .await
            .map_err(|err| {
                error!(
                    %referrer_id,
                    %referred_id,
                    db_error = ?err,
                    "referrals: failed to check existing link"
                );
                UseCaseError::Internal(err)
            })?;
        if existing.is_some() {
            warn!(%referrer_id, %referred_id, "referrals: link already registered");
            return Err(already_linked());
        }

        let now = Utc::now();
        let expires_at = now
            .checked_add_months(Months::new(REFERRAL_VALIDITY_MONTHS))
            .ok_or_else(|| UseCaseError::Internal(anyhow::anyhow!("referral expiry overflow")))?;

        let link = self
            .referral_repo
            .create_link(InsertReferralEntity {
                referrer_id,
                referred_id,
                referral_code: code,
                is_active: true,
                expires_at,
                total_earned: 0,
                created_at: now,
            })
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    warn!(%referrer_id, %referred_id, "referrals: link registered concurrently");
                    return already_linked();
                }
                error!(
                    %referrer_id,
                    %referred_id,
                    db_error = ?err,
                    "referrals: failed to create link"
                );
                UseCaseError::Internal(err)
            })?;

        info!(
            referral_id = %link.id,
            %referrer_id,
            %referred_id,
            expires_at = %link.expires_at,
            "referrals: link registered"
        );

        Ok(link.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::referral_resolver::tests::{sample_artist, sample_link};
    use crates::domain::{
        entities::referrals::ReferralEntity,
        repositories::{
            UniqueViolation, artists::MockArtistRepository, referrals::MockReferralRepository,
        },
        value_objects::enums::artist_statuses::ArtistStatus,
    };
    use uuid::Uuid;

    fn usecase(
        artist_repo: MockArtistRepository,
        referral_repo: MockReferralRepository,
    ) -> ReferralUseCase<MockArtistRepository, MockReferralRepository> {
        ReferralUseCase::new(Arc::new(artist_repo), Arc::new(referral_repo))
    }

    #[tokio::test]
    async fn validate_reports_rejection_message() {
        let mut artist_repo = MockArtistRepository::new();
        artist_repo
            .expect_find_by_referral_code()
            .returning(|_| Box::pin(async { Ok(None) }));

        let dto = usecase(artist_repo, MockReferralRepository::new())
            .validate(ValidateReferralModel {
                code: Some("ghost".to_string()),
                artist_id: Uuid::new_v4(),
            })
            .await
            .unwrap();

        assert!(!dto.valid);
        assert_eq!(dto.error.as_deref(), Some("invalid referral code"));
    }

    #[tokio::test]
    async fn register_creates_twelve_month_link() {
        let referrer = sample_artist(ArtistStatus::Approved, Some("MARI0042"));
        let referrer_id = referrer.id;
        let referred = sample_artist(ArtistStatus::Pending, None);
        let referred_id = referred.id;

        let mut artist_repo = MockArtistRepository::new();
        artist_repo.expect_find_by_id().returning(move |_| {
            let referred = referred.clone();
            Box::pin(async move { Ok(Some(referred)) })
        });
        artist_repo.expect_find_by_referral_code().returning(move |_| {
            let referrer = referrer.clone();
            Box::pin(async move { Ok(Some(referrer)) })
        });

        let mut referral_repo = MockReferralRepository::new();
        referral_repo
            .expect_find_link()
            .returning(|_, _| Box::pin(async { Ok(None) }));
        referral_repo
            .expect_create_link()
            .withf(move |link: &InsertReferralEntity| {
                link.referrer_id == referrer_id
                    && link.referred_id == referred_id
                    && link.referral_code == "MARI0042"
                    && link.is_active
                    && link.total_earned == 0
                    && link.expires_at.signed_duration_since(link.created_at).num_days() >= 365
            })
            .times(1)
            .returning(|link| {
                Box::pin(async move {
                    Ok(ReferralEntity {
                        id: Uuid::new_v4(),
                        referrer_id: link.referrer_id,
                        referred_id: link.referred_id,
                        referral_code: link.referral_code,
                        is_active: link.is_active,
                        expires_at: link.expires_at,
                        total_earned: link.total_earned,
                        created_at: link.created_at,
                    })
                })
            });

        let dto = usecase(artist_repo, referral_repo)
            .register(RegisterReferralModel {
                code: "mari0042".to_string(),
                referred_artist_id: referred_id,
            })
            .await
            .unwrap();

        assert_eq!(dto.referrer_id, referrer_id);
        assert_eq!(dto.referred_id, referred_id);
    }

    #[tokio::test]
    async fn register_rejects_self_referral() {
        let artist = sample_artist(ArtistStatus::Approved, Some("MARI0042"));
        let artist_id = artist.id;
        let lookup = artist.clone();

        let mut artist_repo = MockArtistRepository::new();
        artist_repo.expect_find_by_id().returning(move |_| {
            let artist = artist.clone();
            Box::pin(async move { Ok(Some(artist)) })
        });
        artist_repo.expect_find_by_referral_code().returning(move |_| {
            let artist = lookup.clone();
            Box::pin(async move { Ok(Some(artist)) })
        });

        let mut referral_repo = MockReferralRepository::new();
        referral_repo.expect_create_link().never();

        let err = usecase(artist_repo, referral_repo)
            .register(RegisterReferralModel {
                code: "MARI0042".to_string(),
                referred_artist_id: artist_id,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, UseCaseError::Validation(_)));
    }

    #[tokio::test]
    async fn register_twice_is_a_conflict() {
        let referrer = sample_artist(ArtistStatus::Approved, Some("MARI0042"));
        let referrer_id = referrer.id;
        let referred = sample_artist(ArtistStatus::Pending, None);
        let referred_id = referred.id;
        let existing = sample_link(referrer_id, referred_id, Utc::now());

        let mut artist_repo = MockArtistRepository::new();
        artist_repo.expect_find_by_id().returning(move |_| {
            let referred = referred.clone();
            Box::pin(async move { Ok(Some(referred)) })
        });
        artist_repo.expect_find_by_referral_code().returning(move |_| {
            let referrer = referrer.clone();
            Box::pin(async move { Ok(Some(referrer)) })
        });

        let mut referral_repo = MockReferralRepository::new();
        referral_repo.expect_find_link().returning(move |_, _| {
            let existing = existing.clone();
            Box::pin(async move { Ok(Some(existing)) })
        });
        referral_repo.expect_create_link().never();

        let err = usecase(artist_repo, referral_repo)
            .register(RegisterReferralModel {
                code: "MARI0042".to_string(),
                referred_artist_id: referred_id,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, UseCaseError::Conflict(_)));
    }

    #[tokio::test]
    async fn register_without_code_touches_nothing() {
        let mut artist_repo = MockArtistRepository::new();
        artist_repo.expect_find_by_id().never();

        let err = usecase(artist_repo, MockReferralRepository::new())
            .register(RegisterReferralModel {
                code: "  ".to_string(),
                referred_artist_id: Uuid::new_v4(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, UseCaseError::Validation(_)));
    }

    #[tokio::test]
    async fn register_for_missing_artist_is_not_found() {
        let mut artist_repo = MockArtistRepository::new();
        artist_repo
            .expect_find_by_id()
            .returning(|_| Box::pin(async { Ok(None) }));
        artist_repo.expect_find_by_referral_code().never();

        let err = usecase(artist_repo, MockReferralRepository::new())
            .register(RegisterReferralModel {
                code: "MARI0042".to_string(),
                referred_artist_id: Uuid::new_v4(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, UseCaseError::NotFound("artist")));
    }

    #[tokio::test]
    async fn concurrent_registration_losing_the_insert_is_a_conflict() {
        let referrer = sample_artist(ArtistStatus::Approved, Some("MARI0042"));
        let referred = sample_artist(ArtistStatus::Pending, None);
        let referred_id = referred.id;

        let mut artist_repo = MockArtistRepository::new();
        artist_repo.expect_find_by_id().returning(move |_| {
            let referred = referred.clone();
            Box::pin(async move { Ok(Some(referred)) })
        });
        artist_repo.expect_find_by_referral_code().returning(move |_| {
            let referrer = referrer.clone();
            Box::pin(async move { Ok(Some(referrer)) })
        });

        let mut referral_repo = MockReferralRepository::new();
        referral_repo
            .expect_find_link()
            .returning(|_, _| Box::pin(async { Ok(None) }));
        referral_repo.expect_create_link().times(1).returning(|_| {
            Box::pin(async {
                Err(anyhow::Error::new(UniqueViolation {
                    constraint: "referrals_referrer_id_referred_id_key".to_string(),
                }))
            })
        });

        let err = usecase(artist_repo, referral_repo)
            .register(RegisterReferralModel {
                code: "MARI0042".to_string(),
                referred_artist_id: referred_id,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, UseCaseError::Conflict(_)));
        assert_eq!(err.status_code(), axum::http::StatusCode::CONFLICT);
    }
}
