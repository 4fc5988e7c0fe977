pub mod account_statuses;
pub mod account_tiers;
pub mod generation_kinds;
pub mod job_statuses;
