pub mod artists;
pub mod bookings;
pub mod disputes;
pub mod payments;
pub mod referrals;
