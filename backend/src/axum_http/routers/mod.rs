pub mod admin;
pub mod artists;
pub mod bookings;
pub mod payments;
pub mod referrals;
