pub mod billing_client;
