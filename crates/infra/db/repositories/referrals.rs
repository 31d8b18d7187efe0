use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{PgConnection, RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::{
        postgres::{postgres_connection::PgPoolSquad, schema::referrals},
        repositories::map_unique_violation,
    },
};
use domain::{
    entities::referrals::{InsertReferralEntity, ReferralEntity},
    repositories::referrals::ReferralRepository,
};

pub struct ReferralPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ReferralPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

/// Adds `amount` to the referrer's earnings in place, so concurrent
/// completions for the same referral never overwrite each other.
pub fn increment_total_earned(
    conn: &mut PgConnection,
    referral_id: Uuid,
    amount: i64,
) -> Result<()> {
    let updated = update(referrals::table.find(referral_id))
        .set(referrals::total_earned.eq(referrals::total_earned + amount))
        .execute(conn)?;

    if updated != 1 {
        bail!("referral {referral_id} not found while crediting {amount}");
    }

    Ok(())
}

#[async_trait]
impl ReferralRepository for ReferralPostgres {
    async fn find_active_link(
        &self,
        referrer_id: Uuid,
        referred_id: Uuid,
        as_of: DateTime<Utc>,
    ) -> Result<Option<ReferralEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = referrals::table
            .filter(referrals::referrer_id.eq(referrer_id))
            .filter(referrals::referred_id.eq(referred_id))
            .filter(referrals::is_active.eq(true))
            .filter(referrals::expires_at.gt(as_of))
            .order(referrals::expires_at.desc())
            .select(ReferralEntity::as_select())
            .first::<ReferralEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn find_link(
        &self,
        referrer_id: Uuid,
        referred_id: Uuid,
    ) -> Result<Option<ReferralEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = referrals::table
            .filter(referrals::referrer_id.eq(referrer_id))
            .filter(referrals::referred_id.eq(referred_id))
            .select(ReferralEntity::as_select())
            .first::<ReferralEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn create_link(&self, referral: InsertReferralEntity) -> Result<ReferralEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(referrals::table)
            .values(&referral)
            .returning(ReferralEntity::as_returning())
            .get_result::<ReferralEntity>(&mut conn)
            .map_err(map_unique_violation)?;

        Ok(result)
    }
}
