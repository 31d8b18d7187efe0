use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::referrals::{InsertReferralEntity, ReferralEntity};

#[async_trait]
#[automock]
pub trait ReferralRepository {
    /// Link that is active and not expired at `as_of`.
    async fn find_active_link(
        &self,
        referrer_id: Uuid,
        referred_id: Uuid,
        as_of: DateTime<Utc>,
    ) -> Result<Option<ReferralEntity>>;

    async fn find_link(&self, referrer_id: Uuid, referred_id: Uuid)
    -> Result<Option<ReferralEntity>>;

    /// Fails with [`super::UniqueViolation`] when the pair is already linked.
    async fn create_link(&self, referral: InsertReferralEntity) -> Result<ReferralEntity>;
}
