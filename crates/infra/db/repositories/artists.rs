use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{Connection, RunQueryDsl, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::{
        postgres::{postgres_connection::PgPoolSquad, schema::artists},
        repositories::map_unique_violation,
    },
};
use domain::{
    entities::artists::ArtistEntity, repositories::artists::ArtistRepository,
    value_objects::enums::artist_statuses::ArtistStatus,
};

pub struct ArtistPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ArtistPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ArtistRepository for ArtistPostgres {
    async fn find_by_id(&self, artist_id: Uuid) -> Result<Option<ArtistEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = artists::table
            .find(artist_id)
            .select(ArtistEntity::as_select())
            .first::<ArtistEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn find_by_referral_code(&self, code: String) -> Result<Option<ArtistEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = artists::table
            .filter(artists::referral_code.eq(code))
            .select(ArtistEntity::as_select())
            .first::<ArtistEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn set_stripe_account(&self, artist_id: Uuid, stripe_account_id: String) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(artists::table.find(artist_id))
            .set((
                artists::stripe_account_id.eq(Some(stripe_account_id)),
                artists::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn set_onboarded_by_stripe_account(
        &self,
        stripe_account_id: String,
        onboarded: bool,
    ) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let updated = update(artists::table)
            .filter(artists::stripe_account_id.eq(stripe_account_id))
            .set((
                artists::stripe_onboarded.eq(onboarded),
                artists::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(updated)
    }

    async fn approve(
        &self,
        artist_id: Uuid,
        referral_code: String,
    ) -> Result<Option<ArtistEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        conn.transaction::<_, anyhow::Error, _>(|conn| {
            let existing = artists::table
                .find(artist_id)
                .select(artists::referral_code)
                .for_update()
                .first::<Option<String>>(conn)
                .optional()?;

            let Some(existing_code) = existing else {
                return Ok(None);
            };

            let approved = update(artists::table.find(artist_id))
                .set((
                    artists::status.eq(ArtistStatus::Approved.to_string()),
                    artists::referral_code.eq(existing_code.or(Some(referral_code))),
                    artists::updated_at.eq(Utc::now()),
                ))
                .returning(ArtistEntity::as_returning())
                .get_result::<ArtistEntity>(conn)
                .map_err(map_unique_violation)?;

            Ok(Some(approved))
        })
    }
}
