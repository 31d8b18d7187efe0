use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::artists::ArtistEntity, value_objects::enums::artist_statuses::ArtistStatus,
};

#[derive(Debug, Clone, Deserialize)]
pub struct StripeOnboardingModel {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct OnboardingLinkDto {
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArtistDto {
    pub id: Uuid,
    pub stage_name: String,
    pub status: ArtistStatus,
    pub referral_code: Option<String>,
    pub stripe_onboarded: bool,
}

impl From<ArtistEntity> for ArtistDto {
    fn from(value: ArtistEntity) -> Self {
        Self {
            status: value.artist_status(),
            id: value.id,
            stage_name: value.stage_name,
            referral_code: value.referral_code,
            stripe_onboarded: value.stripe_onboarded,
        }
    }
}

/// Builds a referral code from a stage name: up to four letters, padded
/// with `X`, followed by a four digit suffix.
pub fn referral_code_for(stage_name: &str, suffix: u16) -> String {
    let mut prefix: String = stage_name
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .take(4)
        .map(|c| c.to_ascii_uppercase())
        .collect();
    while prefix.len() < 4 {
        prefix.push('X');
    }
    format!("{prefix}{:04}", suffix % 10_000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn referral_code_uses_stage_name_letters() {
        assert_eq!(referral_code_for("Marie Curie", 42), "MARI0042");
    }

    #[test]
    fn short_or_symbolic_names_are_padded() {
        assert_eq!(referral_code_for("DJ", 7), "DJXX0007");
        assert_eq!(referral_code_for("ÉÉ 2024", 9999), "XXXX9999");
    }
}
