use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::{
    domain::value_objects::enums::artist_statuses::ArtistStatus,
    infra::db::postgres::schema::artists,
};

/// The slice of an artist profile the booking core reads and writes.
#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = artists)]
pub struct ArtistEntity {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub stage_name: String,
    pub status: String,
    pub referral_code: Option<String>,
    pub stripe_account_id: Option<String>,
    pub stripe_onboarded: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ArtistEntity {
    pub fn artist_status(&self) -> ArtistStatus {
        ArtistStatus::from_str(&self.status)
    }

    /// Connected account id, only once the provider reported it charge-capable.
    pub fn payout_account(&self) -> Option<&str> {
        self.stripe_account_id
            .as_deref()
            .filter(|_| self.stripe_onboarded)
    }
}
