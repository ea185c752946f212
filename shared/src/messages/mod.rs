pub mod client_batch;
pub mod error;
pub mod payload;
pub mod payload_kinds;
pub mod runt_message;
pub mod update_batch;
pub mod update_message;
