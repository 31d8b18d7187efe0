pub mod artists;
pub mod booking_state_machine;
pub mod bookings;
pub mod errors;
pub mod payments;
pub mod referral_resolver;
pub mod referrals;
pub mod stripe_gateway;
