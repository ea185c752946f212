mod target_connection;
mod update_source;

pub use update_source::UpdateSource;
