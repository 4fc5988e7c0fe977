pub mod accounts;
pub mod billing_events;
pub mod enums;
pub mod generation;
pub mod streaks;
