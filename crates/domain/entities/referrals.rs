use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::referrals;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = referrals)]
pub struct ReferralEntity {
    pub id: Uuid,
    pub referrer_id: Uuid,
    pub referred_id: Uuid,
    pub referral_code: String,
    pub is_active: bool,
    pub expires_at: DateTime<Utc>,
    pub total_earned: i64,
    pub created_at: DateTime<Utc>,
}

impl ReferralEntity {
    pub fn is_eligible_at(&self, as_of: DateTime<Utc>) -> bool {
        self.is_active && self.expires_at > as_of
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = referrals)]
pub struct InsertReferralEntity {
    pub referrer_id: Uuid,
    pub referred_id: Uuid,
    pub referral_code: String,
    pub is_active: bool,
    pub expires_at: DateTime<Utc>,
    pub total_earned: i64,
    pub created_at: DateTime<Utc>,
}
