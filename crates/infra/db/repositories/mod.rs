pub mod artists;
pub mod bookings;
pub mod referrals;

use diesel::result::{DatabaseErrorKind, Error as DieselError};

use crate::domain::repositories::UniqueViolation;

/// Surfaces unique-constraint failures as [`UniqueViolation`] so use cases
/// can tell them apart from other store errors.
pub(crate) fn map_unique_violation(err: DieselError) -> anyhow::Error {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            UniqueViolation {
                constraint: info
                    .constraint_name()
                    .unwrap_or_else(|| info.message())
                    .to_string(),
            }
            .into()
        }
        other => other.into(),
    }
}
