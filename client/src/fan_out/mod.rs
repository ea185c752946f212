mod server_update_client;

pub use server_update_client::ServerUpdateClient;
