pub mod accounts;
pub mod billing_events;
pub mod generation;
pub mod generation_job;
pub mod ledger;
pub mod streaks;
