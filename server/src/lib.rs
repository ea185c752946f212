//! # Runt Server
//! The producing side of runt state replication. An `UpdateSource` broadcasts
//! the same updates to every target, while a `ClientUpdateManager` tailors
//! them to each client. Both resend anything a peer hasn't acknowledged yet,
//! so lost packets cost latency rather than state.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod shared {
    pub use runt_shared::{
        AttachError, ClientId, ConnectionKey, FixedClock, Host, Identity, Payload, Protocol,
        RuntCodec, RuntMessage, Sequence, UpdateMessage,
    };
}

mod fan_out;
mod providers;
mod server_config;
mod source;

pub use fan_out::ClientUpdateManager;
pub use providers::{BufferedUpdateProvider, HistoryUpdater};
pub use server_config::ServerConfig;
pub use source::UpdateSource;
