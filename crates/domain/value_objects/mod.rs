pub mod artists;
pub mod bookings;
pub mod commission;
pub mod enums;
pub mod payments;
pub mod referrals;
