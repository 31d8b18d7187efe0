use crates::domain::{
    repositories::{artists::ArtistRepository, is_unique_violation},
    value_objects::artists::{ArtistDto, OnboardingLinkDto, referral_code_for},
};
use rand::Rng;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::{
    errors::{UseCaseError, UseCaseResult},
    stripe_gateway::StripeGateway,
};

const REFERRAL_CODE_ATTEMPTS: u32 = 5;

pub struct ArtistUseCase<A, S>
where
    A: ArtistRepository + Send + Sync + 'static,
    S: StripeGateway + Send + Sync + 'static,
{
    artist_repo: Arc<A>,
    stripe_client: Arc<S>,
    app_url: String,
    connect_country: String,
}

impl<A, S> ArtistUseCase<A, S>
where
    A: ArtistRepository + Send + Sync + 'static,
    S: StripeGateway + Send + Sync + 'static,
{
    pub fn new(
        artist_repo: Arc<A>,
        stripe_client: Arc<S>,
        app_url: String,
        connect_country: String,
    ) -> Self {
        Self {
            artist_repo,
            stripe_client,
            app_url,
            connect_country,
        }
    }

    /// Ensures the artist has a connected account and returns a fresh
    /// hosted onboarding link for it.
    pub async fn start_stripe_onboarding(
        &self,
        artist_id: Uuid,
        requested_by: Uuid,
        email: &str,
    ) -> UseCaseResult<OnboardingLinkDto> {
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(UseCaseError::Validation("a valid email is required".to_string()));
        }

        let artist = self
            .artist_repo
            .find_by_id(artist_id)
            .await
            .map_err(|err| {
                error!(%artist_id, db_error = ?err, "artists: failed to load artist");
                UseCaseError::Internal(err)
            })?
            .ok_or(UseCaseError::NotFound("artist"))?;

        if artist.profile_id != requested_by {
            warn!(%artist_id, %requested_by, "artists: onboarding requested for another artist");
            return Err(UseCaseError::Forbidden(
                "You can only onboard your own artist profile".to_string(),
            ));
        }

        let account_id = match artist.stripe_account_id {
            Some(account_id) => account_id,
            None => {
                let account_id = self
                    .stripe_client
                    .create_connected_account(email, &self.connect_country)
                    .await
                    .map_err(|err| {
                        error!(
                            %artist_id,
                            error = ?err,
                            "artists: failed to create connected account"
                        );
                        UseCaseError::ExternalProvider(err.to_string())
                    })?;

                self.artist_repo
                    .set_stripe_account(artist_id, account_id.clone())
                    .await
                    .map_err(|err| {
                        error!(
                            %artist_id,
                            %account_id,
                            db_error = ?err,
                            "artists: failed to store connected account"
                        );
                        UseCaseError::Internal(err)
                    })?;

                info!(%artist_id, %account_id, "artists: connected account created");
                account_id
            }
        };

        let refresh_url = format!("{}/artist/dashboard?stripe=refresh", self.app_url);
        let return_url = format!("{}/artist/dashboard?stripe=success", self.app_url);

        let url = self
            .stripe_client
            .create_onboarding_link(&account_id, &refresh_url, &return_url)
            .await
            .map_err(|err| {
                error!(
                    %artist_id,
                    %account_id,
                    error = ?err,
                    "artists: failed to create onboarding link"
                );
                UseCaseError::ExternalProvider(err.to_string())
            })?;

        info!(%artist_id, %account_id, "artists: onboarding link issued");

        Ok(OnboardingLinkDto { url })
    }

    pub async fn approve(&self, artist_id: Uuid) -> UseCaseResult<ArtistDto> {
        let artist = self
            .artist_repo
            .find_by_id(artist_id)
            .await
            .map_err(|err| {
                error!(%artist_id, db_error = ?err, "artists: failed to load artist");
                UseCaseError::Internal(err)
            })?
            .ok_or(UseCaseError::NotFound("artist"))?;

        let mut attempt = 1;
        let approved = loop {
            let suffix = rand::thread_rng().gen_range(0..10_000);
            let candidate_code = referral_code_for(&artist.stage_name, suffix);

            match self.artist_repo.approve(artist_id, candidate_code.clone()).await {
                Ok(approved) => break approved.ok_or(UseCaseError::NotFound("artist"))?,
                Err(err) if is_unique_violation(&err) && attempt < REFERRAL_CODE_ATTEMPTS => {
                    warn!(
                        %artist_id,
                        referral_code = %candidate_code,
                        attempt,
                        "artists: referral code taken, retrying"
                    );
                    attempt += 1;
                }
                Err(err) => {
                    error!(%artist_id, db_error = ?err, "artists: failed to approve artist");
                    return Err(UseCaseError::Internal(err));
                }
            }
        };

        info!(
            %artist_id,
            referral_code = ?approved.referral_code,
            "artists: artist approved"
        );

        Ok(approved.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::{
        referral_resolver::tests::sample_artist, stripe_gateway::MockStripeGateway,
    };
    use crates::domain::{
        entities::artists::ArtistEntity,
        repositories::{UniqueViolation, artists::MockArtistRepository},
        value_objects::enums::artist_statuses::ArtistStatus,
    };
    use mockall::predicate::eq;

    fn usecase(
        artist_repo: MockArtistRepository,
        stripe: MockStripeGateway,
    ) -> ArtistUseCase<MockArtistRepository, MockStripeGateway> {
        ArtistUseCase::new(
            Arc::new(artist_repo),
            Arc::new(stripe),
            "https://app.example.com".to_string(),
            "FR".to_string(),
        )
    }

    fn expect_artist(repo: &mut MockArtistRepository, artist: ArtistEntity) {
        repo.expect_find_by_id()
            .with(eq(artist.id))
            .returning(move |_| {
                let artist = artist.clone();
                Box::pin(async move { Ok(Some(artist)) })
            });
    }

    #[tokio::test]
    async fn onboarding_creates_account_once_and_returns_link() {
        let artist = sample_artist(ArtistStatus::Approved, None);
        let artist_id = artist.id;
        let profile_id = artist.profile_id;

        let mut artist_repo = MockArtistRepository::new();
        expect_artist(&mut artist_repo, artist);
        artist_repo
            .expect_set_stripe_account()
            .with(eq(artist_id), eq("acct_new".to_string()))
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(()) }));

        let mut stripe = MockStripeGateway::new();
        stripe
            .expect_create_connected_account()
            .with(eq("marie@example.com"), eq("FR"))
            .times(1)
            .returning(|_, _| Ok("acct_new".to_string()));
        stripe
            .expect_create_onboarding_link()
            .withf(|account, refresh, ret| {
                account == "acct_new"
                    && refresh == "https://app.example.com/artist/dashboard?stripe=refresh"
                    && ret == "https://app.example.com/artist/dashboard?stripe=success"
            })
            .times(1)
            .returning(|_, _, _| Ok("https://connect.stripe.com/setup/e/acct_new".to_string()));

        let link = usecase(artist_repo, stripe)
            .start_stripe_onboarding(artist_id, profile_id, " marie@example.com ")
            .await
            .unwrap();

        assert_eq!(link.url, "https://connect.stripe.com/setup/e/acct_new");
    }

    #[tokio::test]
    async fn onboarding_reuses_existing_account() {
        let mut artist = sample_artist(ArtistStatus::Approved, None);
        artist.stripe_account_id = Some("acct_existing".to_string());
        let artist_id = artist.id;
        let profile_id = artist.profile_id;

        let mut artist_repo = MockArtistRepository::new();
        expect_artist(&mut artist_repo, artist);
        artist_repo.expect_set_stripe_account().never();

        let mut stripe = MockStripeGateway::new();
        stripe.expect_create_connected_account().never();
        stripe
            .expect_create_onboarding_link()
            .withf(|account, _, _| account == "acct_existing")
            .returning(|_, _, _| {
                Ok("https://connect.stripe.com/setup/e/acct_existing".to_string())
            });

        let link = usecase(artist_repo, stripe)
            .start_stripe_onboarding(artist_id, profile_id, "marie@example.com")
            .await
            .unwrap();

        assert!(link.url.ends_with("acct_existing"));
    }

    #[tokio::test]
    async fn onboarding_someone_else_is_forbidden() {
        let artist = sample_artist(ArtistStatus::Approved, None);
        let artist_id = artist.id;

        let mut artist_repo = MockArtistRepository::new();
        expect_artist(&mut artist_repo, artist);
        let mut stripe = MockStripeGateway::new();
        stripe.expect_create_connected_account().never();

        let err = usecase(artist_repo, stripe)
            .start_stripe_onboarding(artist_id, Uuid::new_v4(), "marie@example.com")
            .await
            .unwrap_err();

        assert!(matches!(err, UseCaseError::Forbidden(_)));
    }

    #[tokio::test]
    async fn provider_error_message_is_surfaced() {
        let artist = sample_artist(ArtistStatus::Approved, None);
        let artist_id = artist.id;
        let profile_id = artist.profile_id;

        let mut artist_repo = MockArtistRepository::new();
        expect_artist(&mut artist_repo, artist);
        artist_repo.expect_set_stripe_account().never();

        let mut stripe = MockStripeGateway::new();
        stripe.expect_create_connected_account().returning(|_, _| {
            Err(anyhow::anyhow!(
                "Stripe create connected account failed: Connect is not enabled"
            ))
        });

        let err = usecase(artist_repo, stripe)
            .start_stripe_onboarding(artist_id, profile_id, "marie@example.com")
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.public_message().contains("Connect is not enabled"));
    }

    #[tokio::test]
    async fn approve_assigns_code_from_stage_name() {
        let artist = sample_artist(ArtistStatus::Pending, None);
        let artist_id = artist.id;
        let approved_template = artist.clone();

        let mut artist_repo = MockArtistRepository::new();
        expect_artist(&mut artist_repo, artist);
        artist_repo
            .expect_approve()
            .withf(move |id, code| {
                *id == artist_id
                    && code.starts_with("MARI")
                    && code.len() == 8
                    && code[4..].chars().all(|c| c.is_ascii_digit())
            })
            .times(1)
            .returning(move |_, code| {
                let mut approved = approved_template.clone();
                approved.status = ArtistStatus::Approved.to_string();
                approved.referral_code = Some(code);
                Box::pin(async move { Ok(Some(approved)) })
            });

        let dto = usecase(artist_repo, MockStripeGateway::new())
            .approve(artist_id)
            .await
            .unwrap();

        assert_eq!(dto.status, ArtistStatus::Approved);
        assert!(dto.referral_code.is_some_and(|code| code.starts_with("MARI")));
    }

    #[tokio::test]
    async fn approve_missing_artist_is_not_found() {
        let mut artist_repo = MockArtistRepository::new();
        artist_repo
            .expect_find_by_id()
            .returning(|_| Box::pin(async { Ok(None) }));
        artist_repo.expect_approve().never();

        let err = usecase(artist_repo, MockStripeGateway::new())
            .approve(Uuid::new_v4())
            .await
            .unwrap_err();

        assert!(matches!(err, UseCaseError::NotFound("artist")));
    }

    #[tokio::test]
    async fn approve_retries_when_referral_code_is_taken() {
        let artist = sample_artist(ArtistStatus::Pending, None);
        let artist_id = artist.id;
        let approved_template = artist.clone();

        let mut artist_repo = MockArtistRepository::new();
        expect_artist(&mut artist_repo, artist);
        let mut seq = mockall::Sequence::new();
        artist_repo
            .expect_approve()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| {
                Box::pin(async {
                    Err(anyhow::Error::new(UniqueViolation {
                        constraint: "artists_referral_code_key".to_string(),
                    }))
                })
            });
        artist_repo
            .expect_approve()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_, code| {
                let mut approved = approved_template.clone();
                approved.status = ArtistStatus::Approved.to_string();
                approved.referral_code = Some(code);
                Box::pin(async move { Ok(Some(approved)) })
            });

        let dto = usecase(artist_repo, MockStripeGateway::new())
            .approve(artist_id)
            .await
            .unwrap();

        assert_eq!(dto.status, ArtistStatus::Approved);
    }

    #[tokio::test]
    async fn approve_gives_up_after_repeated_code_collisions() {
        let artist = sample_artist(ArtistStatus::Pending, None);
        let artist_id = artist.id;

        let mut artist_repo = MockArtistRepository::new();
        expect_artist(&mut artist_repo, artist);
        artist_repo
            .expect_approve()
            .times(REFERRAL_CODE_ATTEMPTS as usize)
            .returning(|_, _| {
                Box::pin(async {
                    Err(anyhow::Error::new(UniqueViolation {
                        constraint: "artists_referral_code_key".to_string(),
                    }))
                })
            });

        let err = usecase(artist_repo, MockStripeGateway::new())
            .approve(artist_id)
            .await
            .unwrap_err();

        assert!(matches!(err, UseCaseError::Internal(_)));
    }
}
