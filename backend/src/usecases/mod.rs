pub mod accounts;
pub mod billing_webhook;
pub mod generation;
pub mod streaks;
