use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::referrals::ReferralEntity;

/// Referral links last twelve months from creation.
pub const REFERRAL_VALIDITY_MONTHS: u32 = 12;

/// Trims and upper-cases a referral code. Blank input means "no code".
pub fn normalize_referral_code(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|code| !code.is_empty())
        .map(str::to_uppercase)
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReferralRejection {
    NoCode,
    UnknownCode,
    ReferrerNotApproved,
    SelfReferral,
    NoActiveLink,
}

impl Display for ReferralRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            ReferralRejection::NoCode => "no referral code supplied",
            ReferralRejection::UnknownCode => "invalid referral code",
            ReferralRejection::ReferrerNotApproved => "referrer is not an approved artist",
            ReferralRejection::SelfReferral => "an artist cannot refer themselves",
            ReferralRejection::NoActiveLink => "no active referral link for this artist",
        };
        f.write_str(message)
    }
}

/// Outcome of checking a referral code against a candidate artist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferralResolution {
    pub active: bool,
    pub referrer_id: Option<Uuid>,
    /// Set only for booking-time resolution, when an eligible link exists.
    pub referral_id: Option<Uuid>,
    pub rejection: Option<ReferralRejection>,
}

impl ReferralResolution {
    pub fn inactive(rejection: ReferralRejection) -> Self {
        Self {
            active: false,
            referrer_id: None,
            referral_id: None,
            rejection: Some(rejection),
        }
    }

    pub fn valid_referrer(referrer_id: Uuid) -> Self {
        Self {
            active: true,
            referrer_id: Some(referrer_id),
            referral_id: None,
            rejection: None,
        }
    }

    pub fn linked(referrer_id: Uuid, referral_id: Uuid) -> Self {
        Self {
            active: true,
            referrer_id: Some(referrer_id),
            referral_id: Some(referral_id),
            rejection: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ValidateReferralModel {
    pub code: Option<String>,
    pub artist_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReferralValidationDto {
    pub valid: bool,
    pub referrer_id: Option<Uuid>,
    pub error: Option<String>,
}

impl From<ReferralResolution> for ReferralValidationDto {
    fn from(value: ReferralResolution) -> Self {
        Self {
            valid: value.active,
            referrer_id: value.referrer_id,
            error: value.rejection.map(|rejection| rejection.to_string()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterReferralModel {
    pub code: String,
    pub referred_artist_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReferralDto {
    pub id: Uuid,
    pub referrer_id: Uuid,
    pub referred_id: Uuid,
    pub referral_code: String,
    pub is_active: bool,
    pub expires_at: DateTime<Utc>,
    pub total_earned: i64,
    pub created_at: DateTime<Utc>,
}

impl From<ReferralEntity> for ReferralDto {
    fn from(value: ReferralEntity) -> Self {
        Self {
            id: value.id,
            referrer_id: value.referrer_id,
            referred_id: value.referred_id,
            referral_code: value.referral_code,
            is_active: value.is_active,
            expires_at: value.expires_at,
            total_earned: value.total_earned,
            created_at: value.created_at,
        }
    }
}
