mod buffered_update_provider;
mod history_updater;

pub use buffered_update_provider::BufferedUpdateProvider;
pub use history_updater::HistoryUpdater;
