mod client_connection;
mod client_update_manager;

pub use client_update_manager::ClientUpdateManager;
