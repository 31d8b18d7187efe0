use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::artists::ArtistEntity;

#[async_trait]
#[automock]
pub trait ArtistRepository {
    async fn find_by_id(&self, artist_id: Uuid) -> Result<Option<ArtistEntity>>;

    /// `code` must already be normalized to upper-case.
    async fn find_by_referral_code(&self, code: String) -> Result<Option<ArtistEntity>>;

    async fn set_stripe_account(&self, artist_id: Uuid, stripe_account_id: String) -> Result<()>;

    /// Returns the number of artists updated.
    async fn set_onboarded_by_stripe_account(
        &self,
        stripe_account_id: String,
        onboarded: bool,
    ) -> Result<usize>;

    /// Marks the artist approved, assigning `referral_code` only when the
    /// artist has none yet. Fails with [`super::UniqueViolation`] when another
    /// artist already owns the code.
    async fn approve(&self, artist_id: Uuid, referral_code: String)
    -> Result<Option<ArtistEntity>>;
}
