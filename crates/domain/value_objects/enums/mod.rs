pub mod artist_statuses;
pub mod booking_statuses;
pub mod payment_statuses;
pub mod user_roles;
