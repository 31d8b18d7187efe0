pub mod stripe_client;
pub mod webhook_events;
