use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::disputes;

pub const DISPUTE_STATUS_OPEN: &str = "open";

#[derive(Debug, Clone, PartialEq, Eq, Insertable)]
#[diesel(table_name = disputes)]
pub struct InsertDisputeEntity {
    pub booking_id: Uuid,
    pub opened_by: Uuid,
    pub reason: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}
