use chrono::{DateTime, Utc};
use crates::domain::{
    repositories::{artists::ArtistRepository, referrals::ReferralRepository},
    value_objects::{
        enums::artist_statuses::ArtistStatus,
        referrals::{ReferralRejection, ReferralResolution, normalize_referral_code},
    },
};
use std::sync::Arc;
use tracing::{debug, error};
use uuid::Uuid;

use super::errors::{UseCaseError, UseCaseResult};

/// Decides whether a referral code grants its owner a share of a candidate
/// artist's bookings. Rules short-circuit in order: code present, known code,
/// approved referrer, not a self-referral, and (booking time only) an
/// unexpired active link.
pub struct ReferralResolver<A, R>
where
    A: ArtistRepository + Send + Sync + 'static,
    R: ReferralRepository + Send + Sync + 'static,
{
    artist_repo: Arc<A>,
    referral_repo: Arc<R>,
}

impl<A, R> ReferralResolver<A, R>
where
    A: ArtistRepository + Send + Sync + 'static,
    R: ReferralRepository + Send + Sync + 'static,
{
    pub fn new(artist_repo: Arc<A>, referral_repo: Arc<R>) -> Self {
        Self {
            artist_repo,
            referral_repo,
        }
    }

    /// Checks the code itself, without requiring an existing link.
    pub async fn resolve_referrer(
        &self,
        code: Option<&str>,
        candidate_artist_id: Uuid,
    ) -> UseCaseResult<ReferralResolution> {
        let Some(code) = normalize_referral_code(code) else {
            return Ok(ReferralResolution::inactive(ReferralRejection::NoCode));
        };

        let referrer = self
            .artist_repo
            .find_by_referral_code(code.clone())
            .await
            .map_err(|err| {
                error!(
                    referral_code = %code,
                    db_error = ?err,
                    "referrals: failed to look up referral code"
                );
                UseCaseError::Internal(err)
            })?;

        let Some(referrer) = referrer else {
            debug!(referral_code = %code, "referrals: unknown code");
            return Ok(ReferralResolution::inactive(ReferralRejection::UnknownCode));
        };

        if referrer.artist_status() != ArtistStatus::Approved {
            debug!(
                referral_code = %code,
                referrer_id = %referrer.id,
                status = %referrer.status,
                "referrals: referrer not approved"
            );
            return Ok(ReferralResolution::inactive(
                ReferralRejection::ReferrerNotApproved,
            ));
        }

        if referrer.id == candidate_artist_id {
            debug!(%candidate_artist_id, "referrals: self-referral rejected");
            return Ok(ReferralResolution::inactive(ReferralRejection::SelfReferral));
        }

        Ok(ReferralResolution::valid_referrer(referrer.id))
    }

    /// Booking-time resolution: the referrer must also hold a link to the
    /// candidate that is active and unexpired at `as_of`.
    pub async fn resolve_for_booking(
        &self,
        code: Option<&str>,
        candidate_artist_id: Uuid,
        as_of: DateTime<Utc>,
    ) -> UseCaseResult<ReferralResolution> {
        let resolution = self.resolve_referrer(code, candidate_artist_id).await?;
        let Some(referrer_id) = resolution.referrer_id.filter(|_| resolution.active) else {
            return Ok(resolution);
        };

        let link = self
            .referral_repo
            .find_active_link(referrer_id, candidate_artist_id, as_of)
            .await
            .map_err(|err| {
                error!(
                    %referrer_id,
                    %candidate_artist_id,
                    db_error = ?err,
                    "referrals: failed to load referral link"
                );
                UseCaseError::Internal(err)
            })?;

        match link.filter(|link| link.is_eligible_at(as_of)) {
            Some(link) => Ok(ReferralResolution::linked(referrer_id, link.id)),
            None => {
                debug!(
                    %referrer_id,
                    %candidate_artist_id,
                    "referrals: no active link at booking time"
                );
                Ok(ReferralResolution::inactive(ReferralRejection::NoActiveLink))
            }
        }
    }
}
