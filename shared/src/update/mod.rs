pub mod handler;
pub mod handlers;
pub mod provider;
pub mod updater;
