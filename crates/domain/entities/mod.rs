pub mod accounts;
pub mod generation_jobs;
pub mod processed_events;
