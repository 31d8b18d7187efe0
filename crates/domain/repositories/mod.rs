pub mod artists;
pub mod bookings;
pub mod referrals;

use thiserror::Error;

/// A write rejected by a unique constraint. Repositories return it wrapped in
/// `anyhow::Error`; callers recover it with `downcast_ref`.
#[derive(Debug, Error)]
#[error("unique constraint violated: {constraint}")]
pub struct UniqueViolation {
    pub constraint: String,
}

pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<UniqueViolation>().is_some()
}
